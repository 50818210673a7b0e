//! Cache-backed fixed-window rate limiter.
//!
//! Each key owns two cache entries: the attempt counter and a timer entry
//! (in its own key namespace) holding the unix timestamp at which the
//! window ends. Both are
//! written with the decay TTL on the first hit of a window.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use warden_cache::keys;
use warden_core::AppResult;
use warden_core::traits::CacheProvider;
use warden_core::types::Clock;

/// Rate limiter over any cache provider.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    cache: Arc<dyn CacheProvider>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Creates a limiter.
    pub fn new(cache: Arc<dyn CacheProvider>, clock: Arc<dyn Clock>) -> Self {
        Self { cache, clock }
    }

    /// Record one attempt; returns the attempt count in the current window.
    pub async fn hit(&self, key: &str, decay_seconds: u64) -> AppResult<u64> {
        let counter = keys::rate_limit(key);
        let timer = keys::rate_limit_timer(key);
        let decay = Duration::from_secs(decay_seconds.max(1));
        let available_at = self
            .clock
            .timestamp()
            .saturating_add(i64::try_from(decay.as_secs()).unwrap_or(i64::MAX));

        self.cache
            .add(&timer, &available_at.to_string(), decay)
            .await?;

        let added = self.cache.add(&counter, "0", decay).await?;
        let hits = self.cache.increment(&counter, 1).await?;

        // The counter expired between `add` and `increment` and was
        // recreated without a TTL.
        if !added && hits == 1 {
            self.cache.put(&counter, "1", decay).await?;
        }

        Ok(u64::try_from(hits).unwrap_or(0))
    }

    /// Attempts recorded in the current window.
    pub async fn attempts(&self, key: &str) -> AppResult<u64> {
        Ok(self
            .cache
            .get(&keys::rate_limit(key))
            .await?
            .and_then(|raw| raw.parse::<u64>().ok())
            .unwrap_or(0))
    }

    /// True when `key` has used up `max_attempts` and its lockout timer is
    /// still running. A counter at the limit whose timer has lapsed is
    /// reset and reported as not limited.
    pub async fn too_many_attempts(&self, key: &str, max_attempts: u64) -> AppResult<bool> {
        if self.attempts(key).await? >= max_attempts {
            if self.cache.has(&keys::rate_limit_timer(key)).await? {
                return Ok(true);
            }

            debug!(key, "Lockout timer lapsed, resetting attempts");
            self.reset_attempts(key).await?;
        }
        Ok(false)
    }

    /// Attempts left before the limit.
    pub async fn remaining(&self, key: &str, max_attempts: u64) -> AppResult<u64> {
        Ok(max_attempts.saturating_sub(self.attempts(key).await?))
    }

    /// Seconds until the window for `key` ends; zero when it has ended.
    pub async fn available_in(&self, key: &str) -> AppResult<u64> {
        let available_at = self
            .cache
            .get(&keys::rate_limit_timer(key))
            .await?
            .and_then(|raw| raw.parse::<i64>().ok());

        Ok(available_at
            .map(|at| at.saturating_sub(self.clock.timestamp()).max(0) as u64)
            .unwrap_or(0))
    }

    /// Clear the attempt counter.
    pub async fn reset_attempts(&self, key: &str) -> AppResult<()> {
        self.cache.forget(&keys::rate_limit(key)).await?;
        Ok(())
    }

    /// Clear the counter and the lockout timer.
    pub async fn clear(&self, key: &str) -> AppResult<()> {
        self.reset_attempts(key).await?;
        self.cache.forget(&keys::rate_limit_timer(key)).await?;
        Ok(())
    }

    /// Run `work` unless the key is limited, counting it as an attempt.
    /// Returns `None` when limited.
    pub async fn attempt<T, F>(
        &self,
        key: &str,
        max_attempts: u64,
        decay_seconds: u64,
        work: F,
    ) -> AppResult<Option<T>>
    where
        F: Future<Output = T>,
    {
        if self.too_many_attempts(key, max_attempts).await? {
            return Ok(None);
        }

        let result = work.await;
        self.hit(key, decay_seconds).await?;
        Ok(Some(result))
    }
}
