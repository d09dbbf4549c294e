//! In-process blacklist with expiry.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{BlacklistError, TokenBlacklist, blacklist_key};

/// Blacklist held in memory. Entries past their TTL count as absent.
#[derive(Debug, Default)]
pub struct MemoryBlacklist {
    entries: Mutex<HashMap<String, Instant>>,
}

impl MemoryBlacklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub async fn live_entries(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|expires| **expires > now)
            .count()
    }
}

#[async_trait]
impl TokenBlacklist for MemoryBlacklist {
    async fn is_revoked(&self, token: &str) -> Result<bool, BlacklistError> {
        let key = blacklist_key(token);
        let mut entries = self.entries.lock().await;
        match entries.get(&key) {
            Some(expires) if *expires > Instant::now() => Ok(true),
            Some(_) => {
                entries.remove(&key);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn revoke(&self, token: &str, ttl: Duration) -> Result<(), BlacklistError> {
        self.entries
            .lock()
            .await
            .insert(blacklist_key(token), Instant::now() + ttl);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn revoke_then_lookup() {
        let blacklist = MemoryBlacklist::new();
        assert!(!blacklist.is_revoked("tok").await.unwrap());

        blacklist
            .revoke("tok", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(blacklist.is_revoked("tok").await.unwrap());
        assert!(!blacklist.is_revoked("other").await.unwrap());
        assert_eq!(blacklist.live_entries().await, 1);
    }

    #[tokio::test]
    async fn entries_expire() {
        let blacklist = MemoryBlacklist::new();
        blacklist.revoke("tok", Duration::ZERO).await.unwrap();
        assert!(!blacklist.is_revoked("tok").await.unwrap());
        assert_eq!(blacklist.live_entries().await, 0);
    }

    #[test]
    fn key_uses_prefix() {
        assert_eq!(blacklist_key("abc"), "blacklist:abc");
    }
}
