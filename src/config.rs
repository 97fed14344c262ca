use tracing::info;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Application configuration
/// In debug builds: loads from .env file
/// In release builds: loads from ~/.trilha/config.env
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the learning-trails backend
    pub api_base_url: String,
    /// Session token injected for development (skips the login screen)
    pub dev_session_token: Option<String>,
}

impl Config {
    /// Load configuration based on build mode
    pub fn load() -> Self {
        #[cfg(debug_assertions)]
        {
            if dotenvy::dotenv().is_ok() {
                info!("Config: Dev mode activated - loaded .env file");
            } else {
                info!("Config: No .env file found, using defaults");
            }

            Self::from_env()
        }

        #[cfg(not(debug_assertions))]
        {
            Self::from_config_file()
        }
    }

    /// Load configuration from environment variables
    fn from_env() -> Self {
        let api_base_url = std::env::var("TRILHA_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());

        let dev_session_token = std::env::var("TRILHA_DEV_SESSION_TOKEN").ok();

        info!("Config: API base URL: {}", api_base_url);
        if dev_session_token.is_some() {
            info!("Config: Using dev session token");
        }

        Self {
            api_base_url,
            dev_session_token,
        }
    }

    /// Load configuration from ~/.trilha/config.env (production mode)
    #[cfg(not(debug_assertions))]
    fn from_config_file() -> Self {
        if let Some(path) = dirs::home_dir().map(|home| home.join(".trilha").join("config.env")) {
            if dotenvy::from_path(&path).is_ok() {
                info!("Config: Loaded {}", path.display());
            }
        }
        Self::from_env()
    }
}
