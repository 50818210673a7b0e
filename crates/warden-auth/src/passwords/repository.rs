//! Reset token storage contract and the rules shared by every store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use warden_core::AppResult;
use warden_core::config::{PasswordResetConfig, bounded_window};
use warden_core::types::Clock;

use crate::crypto::{constant_time_eq, random_hex, sha256_hex};

/// A stored reset token. Only the SHA-256 digest of the token is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetTokenRecord {
    /// Address the token was issued for.
    pub email: String,
    /// Hex SHA-256 of the plaintext token.
    pub hashed_token: String,
    /// Issue time.
    pub created_at: DateTime<Utc>,
}

/// Storage for reset tokens, at most one live record per email.
#[async_trait]
pub trait TokenRepository: Send + Sync + 'static {
    /// Replace any record for `email` with a new one; returns the plaintext.
    async fn create(&self, email: &str) -> AppResult<String>;

    /// True when `token` matches the unexpired record for `email`.
    async fn exists(&self, email: &str, token: &str) -> AppResult<bool>;

    /// True when a record for `email` was issued within the throttle window.
    async fn recently_created(&self, email: &str) -> AppResult<bool>;

    /// Remove the record for `email`.
    async fn delete(&self, email: &str) -> AppResult<()>;

    /// Remove every expired record; returns how many were removed.
    async fn delete_expired(&self) -> AppResult<u64>;
}

/// Token issuing and expiry rules.
#[derive(Debug, Clone)]
pub struct TokenLifetime {
    expires: Duration,
    throttle: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenLifetime {
    /// Rules for the given expiry and throttle windows.
    pub fn new(expires: Duration, throttle: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            expires,
            throttle,
            clock,
        }
    }

    /// Rules from configuration.
    pub fn from_config(config: &PasswordResetConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            bounded_window(config.expire_minutes.saturating_mul(60)),
            bounded_window(config.throttle_seconds),
            clock,
        )
    }

    /// Expiry window.
    pub fn expires(&self) -> Duration {
        self.expires
    }

    /// How long a store must retain a record.
    pub fn retention(&self) -> Duration {
        self.expires.max(self.throttle)
    }

    /// A fresh plaintext token and the record to store for it.
    pub fn issue(&self, email: &str) -> (String, ResetTokenRecord) {
        let token = random_hex(32);
        let record = ResetTokenRecord {
            email: email.to_string(),
            hashed_token: sha256_hex(&token),
            created_at: self.clock.now(),
        };
        (token, record)
    }

    /// True once the record is past its expiry.
    pub fn is_expired(&self, record: &ResetTokenRecord) -> bool {
        record.created_at + self.expires < self.clock.now()
    }

    /// True when `token` matches an unexpired record.
    pub fn is_valid(&self, record: &ResetTokenRecord, token: &str) -> bool {
        !self.is_expired(record)
            && constant_time_eq(sha256_hex(token).as_bytes(), record.hashed_token.as_bytes())
    }

    /// True while the record is inside the throttle window.
    pub fn is_recent(&self, record: &ResetTokenRecord) -> bool {
        self.throttle > Duration::zero() && record.created_at + self.throttle > self.clock.now()
    }
}
