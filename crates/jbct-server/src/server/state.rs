//! Shared application state injected into every handler.

use std::sync::Arc;

use jbct_core::ServerConfig;

use crate::auth::{JwtManager, SESSION_TTL_SECS};
use crate::blacklist::TokenBlacklist;
use crate::oauth::{OAuthBridge, ProviderRegistry};
use crate::storage::UserStore;

/// Everything a request needs; cheap to clone, immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub jwt: Arc<JwtManager>,
    pub users: Arc<dyn UserStore>,
    pub blacklist: Arc<dyn TokenBlacklist>,
    pub providers: Arc<ProviderRegistry>,
    pub bridge: OAuthBridge,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        users: Arc<dyn UserStore>,
        blacklist: Arc<dyn TokenBlacklist>,
        providers: ProviderRegistry,
    ) -> Self {
        let jwt = Arc::new(JwtManager::new(
            config.jwt_secret.as_bytes(),
            SESSION_TTL_SECS,
        ));
        let bridge = OAuthBridge::new(Arc::clone(&users), Arc::clone(&jwt));
        Self {
            config: Arc::new(config),
            jwt,
            users,
            blacklist,
            providers: Arc::new(providers),
            bridge,
        }
    }

    /// Whether cookies must carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.config.environment.is_production()
    }
}
