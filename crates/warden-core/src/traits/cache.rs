//! Cache provider trait for pluggable key/value backends.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for cache backends (Redis or in-memory).
///
/// Values are strings (JSON for structured data). The rate limiter and the
/// cache-backed reset token repository depend on [`add`](Self::add) and
/// [`increment`](Self::increment) being atomic per key.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Store a value with a TTL, replacing any existing value.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Store a value with the provider's default TTL.
    async fn put_default(&self, key: &str, value: &str) -> AppResult<()>;

    /// Store a value only if the key is absent.
    /// Returns `true` if the value was newly set.
    async fn add(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool>;

    /// Increment an integer value, keeping its existing TTL.
    /// A missing key is created without expiry. Returns the new value.
    async fn increment(&self, key: &str, by: i64) -> AppResult<i64>;

    /// Remove a key. Returns `true` if something was removed.
    async fn forget(&self, key: &str) -> AppResult<bool>;

    /// Check whether a live key exists.
    async fn has(&self, key: &str) -> AppResult<bool>;

    /// Get a typed value by deserializing from JSON.
    async fn get_json<T: serde::de::DeserializeOwned + Send>(
        &self,
        key: &str,
    ) -> AppResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key).await? {
            Some(value) => {
                let parsed = serde_json::from_str(&value)?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Store a typed value by serializing to JSON.
    async fn put_json<T: serde::Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()>
    where
        Self: Sized,
    {
        let json = serde_json::to_string(value)?;
        self.put(key, &json, ttl).await
    }

    /// Check that the cache backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Remove every entry owned by this provider.
    async fn flush(&self) -> AppResult<()>;
}
