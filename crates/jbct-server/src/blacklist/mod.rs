//! Token blacklist: revoked session tokens.
//!
//! A token is revoked while an entry keyed `blacklist:<token>` exists. The
//! entry carries no payload; its TTL bounds it to the token's own lifetime.

mod memory;
mod redis_store;

use std::time::Duration;

use async_trait::async_trait;

pub use memory::MemoryBlacklist;
pub use redis_store::RedisBlacklist;

/// Key prefix for revoked tokens.
pub const BLACKLIST_PREFIX: &str = "blacklist:";

/// Blacklist key for a raw token string.
pub fn blacklist_key(token: &str) -> String {
    format!("{BLACKLIST_PREFIX}{token}")
}

#[derive(Debug, thiserror::Error)]
pub enum BlacklistError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Command error: {0}")]
    Command(String),
}

/// Revocation lookup consulted on every authenticated request.
#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// Whether `token` has been revoked.
    async fn is_revoked(&self, token: &str) -> Result<bool, BlacklistError>;

    /// Revoke `token` for `ttl`.
    async fn revoke(&self, token: &str, ttl: Duration) -> Result<(), BlacklistError>;
}
