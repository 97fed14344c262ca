use crate::api::{SharedTrailsApi, TrailsClient};
use crate::config;
use crate::player::ScriptLoader;
use crate::session_token;
use std::sync::Arc;

/// Application-wide services shared through the Dioxus context tree.
///
/// The script loader is the process-wide "load the embed API at most once"
/// resource; every lesson session shares it.
#[derive(Clone)]
pub struct AppContext {
    pub config: config::Config,
    pub client: TrailsClient,
    pub api: SharedTrailsApi,
    pub script_loader: Arc<ScriptLoader>,
}

impl AppContext {
    pub fn new(config: config::Config) -> Self {
        let client = TrailsClient::new(config.api_base_url.clone());

        // A dev token from the environment wins over the keychain.
        let token = config
            .dev_session_token
            .clone()
            .or_else(session_token::load_session_token);
        client.set_session_token(token);

        Self {
            api: Arc::new(client.clone()),
            client,
            script_loader: Arc::new(ScriptLoader::new()),
            config,
        }
    }
}
