use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum SessionTokenError {
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
    #[error("Session token not found")]
    NotFound,
}

/// Stores the backend session token in the system keychain so a login
/// survives app restarts.
pub struct SessionTokenStore {
    entry: keyring::Entry,
}

// Global instance - created once and reused
static SESSION_TOKEN_STORE: OnceLock<SessionTokenStore> = OnceLock::new();

fn get_store() -> Result<&'static SessionTokenStore, SessionTokenError> {
    match SESSION_TOKEN_STORE.get() {
        Some(store) => Ok(store),
        None => {
            let store = SessionTokenStore::new()?;
            match SESSION_TOKEN_STORE.set(store) {
                Ok(()) => Ok(SESSION_TOKEN_STORE.get().unwrap()),
                Err(_) => {
                    // Someone else initialized it first, use theirs
                    Ok(SESSION_TOKEN_STORE.get().unwrap())
                }
            }
        }
    }
}

impl SessionTokenStore {
    pub fn new() -> Result<Self, SessionTokenError> {
        let entry = keyring::Entry::new("trilha", "session_token")?;
        Ok(Self { entry })
    }

    pub fn store(&self, token: &str) -> Result<(), SessionTokenError> {
        self.entry.set_password(token)?;
        debug!("Stored session token in keychain");
        Ok(())
    }

    pub fn get(&self) -> Result<String, SessionTokenError> {
        match self.entry.get_password() {
            Ok(token) => Ok(token),
            Err(keyring::Error::NoEntry) => Err(SessionTokenError::NotFound),
            Err(e) => Err(SessionTokenError::Keyring(e)),
        }
    }

    pub fn clear(&self) -> Result<(), SessionTokenError> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(SessionTokenError::Keyring(e)),
        }
    }
}

/// Persist a freshly issued session token
pub fn store_session_token(token: &str) -> Result<(), SessionTokenError> {
    get_store()?.store(token)
}

/// Restore the persisted session token, if any
pub fn load_session_token() -> Option<String> {
    get_store().ok().and_then(|store| store.get().ok())
}

/// Forget the persisted session token (logout)
pub fn clear_session_token() -> Result<(), SessionTokenError> {
    get_store()?.clear()
}
