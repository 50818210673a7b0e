//! Reset tokens stored in the cache provider.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use warden_cache::keys;
use warden_core::AppResult;
use warden_core::traits::CacheProvider;

use super::repository::{ResetTokenRecord, TokenLifetime, TokenRepository};

/// Cache-backed token store. Records carry a TTL, so the cache evicts
/// them on its own and [`delete_expired`](TokenRepository::delete_expired)
/// has nothing to do.
#[derive(Debug, Clone)]
pub struct CacheTokenRepository {
    cache: Arc<dyn CacheProvider>,
    lifetime: TokenLifetime,
}

impl CacheTokenRepository {
    /// Creates a repository over `cache`.
    pub fn new(cache: Arc<dyn CacheProvider>, lifetime: TokenLifetime) -> Self {
        Self { cache, lifetime }
    }

    async fn record(&self, email: &str) -> AppResult<Option<ResetTokenRecord>> {
        match self.cache.get(&keys::password_reset(email)).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl TokenRepository for CacheTokenRepository {
    async fn create(&self, email: &str) -> AppResult<String> {
        let key = keys::password_reset(email);
        self.cache.forget(&key).await?;

        let (token, record) = self.lifetime.issue(email);
        let ttl = self
            .lifetime
            .retention()
            .to_std()
            .unwrap_or(std::time::Duration::from_secs(3600));
        self.cache
            .put(&key, &serde_json::to_string(&record)?, ttl)
            .await?;

        debug!("Password reset token stored in cache");
        Ok(token)
    }

    async fn exists(&self, email: &str, token: &str) -> AppResult<bool> {
        Ok(self
            .record(email)
            .await?
            .is_some_and(|record| self.lifetime.is_valid(&record, token)))
    }

    async fn recently_created(&self, email: &str) -> AppResult<bool> {
        Ok(self
            .record(email)
            .await?
            .is_some_and(|record| self.lifetime.is_recent(&record)))
    }

    async fn delete(&self, email: &str) -> AppResult<()> {
        self.cache.forget(&keys::password_reset(email)).await?;
        Ok(())
    }

    async fn delete_expired(&self) -> AppResult<u64> {
        Ok(0)
    }
}
