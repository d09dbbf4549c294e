//! Redis-backed blacklist.

use std::time::Duration;

use async_trait::async_trait;
use jbct_core::config::RedisConfig;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::info;

use super::{BlacklistError, TokenBlacklist, blacklist_key};

/// Blacklist stored in Redis with native key expiry.
#[derive(Clone)]
pub struct RedisBlacklist {
    manager: ConnectionManager,
}

impl RedisBlacklist {
    /// Connect and verify the server answers `PING`.
    pub async fn connect(config: &RedisConfig) -> Result<Self, BlacklistError> {
        let url = config.url();
        info!(url = %url, "Connecting to Redis");

        let client =
            redis::Client::open(url.as_str()).map_err(|e| BlacklistError::Connection(e.to_string()))?;

        let manager = tokio::time::timeout(
            Duration::from_millis(config.connect_timeout_ms),
            ConnectionManager::new(client),
        )
        .await
        .map_err(|_| BlacklistError::Connection("connection timed out".into()))?
        .map_err(|e| BlacklistError::Connection(e.to_string()))?;

        let blacklist = Self { manager };
        blacklist.ping().await?;

        info!("Redis connected");
        Ok(blacklist)
    }

    async fn ping(&self) -> Result<(), BlacklistError> {
        let mut conn = self.manager.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| BlacklistError::Connection(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl TokenBlacklist for RedisBlacklist {
    async fn is_revoked(&self, token: &str) -> Result<bool, BlacklistError> {
        let mut conn = self.manager.clone();
        conn.exists::<_, bool>(blacklist_key(token))
            .await
            .map_err(|e| BlacklistError::Command(e.to_string()))
    }

    async fn revoke(&self, token: &str, ttl: Duration) -> Result<(), BlacklistError> {
        let mut conn = self.manager.clone();
        conn.set_ex::<_, _, ()>(blacklist_key(token), 1, ttl.as_secs().max(1))
            .await
            .map_err(|e| BlacklistError::Command(e.to_string()))
    }
}
