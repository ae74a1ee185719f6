use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::Config;
use crate::hub::BroadcastHub;

/// Shared state injected into every route
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<BroadcastHub>,
    pub tokens: Arc<TokenService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let tokens = TokenService::new(
            &config.signing_secret(),
            config.admin_username.clone(),
            config.session_ttl_secs,
        );
        Self {
            hub: Arc::new(BroadcastHub::new()),
            tokens: Arc::new(tokens),
            config: Arc::new(config),
        }
    }
}
