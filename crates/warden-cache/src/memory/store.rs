//! In-memory cache implementation using the moka crate.
//!
//! Every entry carries its own expiry. Logical expiry is evaluated against
//! the injected [`Clock`]; moka's per-entry expiry evicts the same entries
//! physically on real time. Compound operations (`add`, `increment`) run
//! inside `and_compute_with`, which moka serializes per key.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::Expiry;
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use tracing::debug;

use warden_core::config::cache::MemoryCacheConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::cache::CacheProvider;
use warden_core::types::clock::Clock;

/// A cached value and the instant it stops being visible.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    fn new(value: impl Into<String>, ttl: Duration, now: DateTime<Utc>) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        Self {
            value: value.into(),
            expires_at: now.checked_add_signed(ttl),
        }
    }

    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }

    /// Time left on the real clock, used for physical eviction.
    fn remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|at| (at - Utc::now()).to_std().unwrap_or(Duration::ZERO))
    }
}

/// Per-entry expiry policy handed to moka.
struct EntryExpiry;

impl Expiry<String, CacheEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.remaining()
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.remaining()
    }
}

/// In-memory cache provider using moka.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// The underlying moka cache.
    cache: Cache<String, CacheEntry>,
    /// Default TTL for entries.
    default_ttl: Duration,
    /// Clock for logical expiry.
    clock: Arc<dyn Clock>,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig, default_ttl_seconds: u64, clock: Arc<dyn Clock>) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(EntryExpiry)
            .build();

        Self {
            cache,
            default_ttl: Duration::from_secs(default_ttl_seconds),
            clock,
        }
    }

    async fn live_entry(&self, key: &str) -> Option<CacheEntry> {
        let entry = self.cache.get(key).await?;
        if entry.is_live(self.clock.now()) {
            Some(entry)
        } else {
            self.cache.invalidate(key).await;
            None
        }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.live_entry(key).await.map(|entry| entry.value))
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let entry = CacheEntry::new(value, ttl, self.clock.now());
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn put_default(&self, key: &str, value: &str) -> AppResult<()> {
        self.put(key, value, self.default_ttl).await
    }

    async fn add(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let now = self.clock.now();
        let fresh = CacheEntry::new(value, ttl, now);

        let result = self
            .cache
            .entry(key.to_string())
            .and_compute_with(|existing| {
                let op = match existing {
                    Some(entry) if entry.value().is_live(now) => Op::Nop,
                    _ => Op::Put(fresh),
                };
                std::future::ready(op)
            })
            .await;

        Ok(matches!(
            result,
            CompResult::Inserted(_) | CompResult::ReplacedWith(_)
        ))
    }

    async fn increment(&self, key: &str, by: i64) -> AppResult<i64> {
        let now = self.clock.now();

        let result = self
            .cache
            .entry(key.to_string())
            .and_compute_with(|existing| {
                let live = existing
                    .map(|entry| entry.into_value())
                    .filter(|entry| entry.is_live(now));
                let op = match live {
                    Some(entry) => match entry.value.parse::<i64>() {
                        Ok(current) => Op::Put(CacheEntry {
                            value: current.saturating_add(by).to_string(),
                            expires_at: entry.expires_at,
                        }),
                        Err(_) => Op::Nop,
                    },
                    None => Op::Put(CacheEntry {
                        value: by.to_string(),
                        expires_at: None,
                    }),
                };
                std::future::ready(op)
            })
            .await;

        match result {
            CompResult::Inserted(entry) | CompResult::ReplacedWith(entry) => entry
                .value()
                .value
                .parse::<i64>()
                .map_err(|e| AppError::cache(format!("Counter '{key}' is corrupt: {e}"))),
            _ => Err(AppError::cache(format!(
                "Cannot increment non-integer value at '{key}'"
            ))),
        }
    }

    async fn forget(&self, key: &str) -> AppResult<bool> {
        let removed = self.cache.remove(key).await;
        Ok(removed.is_some_and(|entry| entry.is_live(self.clock.now())))
    }

    async fn has(&self, key: &str) -> AppResult<bool> {
        Ok(self.live_entry(key).await.is_some())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn flush(&self) -> AppResult<()> {
        self.cache.invalidate_all();
        debug!("Flushed in-memory cache");
        Ok(())
    }
}
