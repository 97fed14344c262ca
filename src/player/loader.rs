use crate::player::backend::{PlayerError, SharedPlayerBackend};
use tokio::sync::OnceCell;
use tracing::info;

/// At-most-once loader for the provider's embed API script.
///
/// Every player instance in the application shares one `ScriptLoader` (it
/// lives in the `AppContext`), so the script injection happens a single time
/// per application lifetime no matter how many lessons are opened. Waiters
/// that arrive while the load is in flight all resolve together.
///
/// The loader itself never times out or retries; callers own that policy.
pub struct ScriptLoader {
    loaded: OnceCell<()>,
}

impl ScriptLoader {
    pub fn new() -> Self {
        Self {
            loaded: OnceCell::new(),
        }
    }

    /// Load the embed API through `backend` unless a previous call already
    /// did. Concurrent callers share the same in-flight load.
    pub async fn ensure_loaded(&self, backend: &SharedPlayerBackend) -> Result<(), PlayerError> {
        self.loaded
            .get_or_try_init(|| async {
                info!("Loading embed player API");
                backend.load_api().await
            })
            .await?;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.initialized()
    }
}

impl Default for ScriptLoader {
    fn default() -> Self {
        Self::new()
    }
}
