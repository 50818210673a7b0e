//! Cache manager that dispatches to the configured provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use warden_core::config::cache::CacheConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::cache::CacheProvider;
use warden_core::types::clock::Clock;

/// Cache manager that wraps the configured cache provider.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// The inner cache provider.
    inner: Arc<dyn CacheProvider>,
}

impl CacheManager {
    /// Create a new cache manager from configuration.
    ///
    /// The clock drives logical expiry in the in-memory provider; Redis
    /// enforces TTLs server-side and ignores it.
    pub async fn new(config: &CacheConfig, clock: Arc<dyn Clock>) -> AppResult<Self> {
        let inner: Arc<dyn CacheProvider> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis cache provider");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                let provider =
                    crate::redis::RedisCacheProvider::new(client, config.default_ttl_seconds);
                Arc::new(provider)
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory cache provider");
                let provider = crate::memory::MemoryCacheProvider::new(
                    &config.memory,
                    config.default_ttl_seconds,
                    clock,
                );
                Arc::new(provider)
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown cache provider: '{other}'. Supported: memory, redis"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a cache manager from an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn CacheProvider>) -> Self {
        Self { inner: provider }
    }

    /// Get a reference to the inner provider.
    pub fn provider(&self) -> &dyn CacheProvider {
        self.inner.as_ref()
    }
}

#[async_trait]
impl CacheProvider for CacheManager {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.inner.put(key, value, ttl).await
    }

    async fn put_default(&self, key: &str, value: &str) -> AppResult<()> {
        self.inner.put_default(key, value).await
    }

    async fn add(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        self.inner.add(key, value, ttl).await
    }

    async fn increment(&self, key: &str, by: i64) -> AppResult<i64> {
        self.inner.increment(key, by).await
    }

    async fn forget(&self, key: &str) -> AppResult<bool> {
        self.inner.forget(key).await
    }

    async fn has(&self, key: &str) -> AppResult<bool> {
        self.inner.has(key).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn flush(&self) -> AppResult<()> {
        self.inner.flush().await
    }
}
