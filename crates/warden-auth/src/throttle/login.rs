//! Login attempt throttling keyed by identifier and client address.

use tracing::warn;

use warden_core::AppResult;
use warden_core::config::ThrottleConfig;
use warden_core::events::{AuthEvent, EventBus};
use warden_core::traits::Principal;
use warden_core::types::Credentials;

use super::rate_limiter::RateLimiter;
use crate::guard::SessionGuard;

/// Result of a throttled login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Logged in; the attempt counter was cleared.
    Authenticated,
    /// Credentials rejected; the attempt was counted.
    Failed,
    /// Too many attempts; credentials were not checked.
    LockedOut {
        /// Seconds until another attempt is allowed.
        retry_after: u64,
    },
}

/// Applies [`ThrottleConfig`] to login attempts.
#[derive(Debug, Clone)]
pub struct LoginThrottle {
    limiter: RateLimiter,
    config: ThrottleConfig,
    events: EventBus,
}

impl LoginThrottle {
    /// Creates a throttle over `limiter`.
    pub fn new(limiter: RateLimiter, config: ThrottleConfig) -> Self {
        Self {
            limiter,
            config,
            events: EventBus::default(),
        }
    }

    /// Publishes lockouts on `events`.
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    /// Throttle key for an identifier and client address.
    pub fn key(identifier: &str, ip: &str) -> String {
        format!("login:{}|{ip}", identifier.trim().to_lowercase())
    }

    /// True when the pair is locked out. Publishes a lockout event when so.
    pub async fn too_many_attempts(&self, identifier: &str, ip: &str) -> AppResult<bool> {
        let key = Self::key(identifier, ip);
        if !self
            .limiter
            .too_many_attempts(&key, self.config.max_attempts)
            .await?
        {
            return Ok(false);
        }

        let retry_after = self.limiter.available_in(&key).await?;
        warn!(ip, retry_after, "Login locked out");
        self.events.publish(AuthEvent::Lockout { key, retry_after });
        Ok(true)
    }

    /// Count a failed attempt.
    pub async fn increment(&self, identifier: &str, ip: &str) -> AppResult<u64> {
        self.limiter
            .hit(&Self::key(identifier, ip), self.config.decay_seconds)
            .await
    }

    /// Seconds until the pair may try again.
    pub async fn available_in(&self, identifier: &str, ip: &str) -> AppResult<u64> {
        self.limiter.available_in(&Self::key(identifier, ip)).await
    }

    /// Forget all attempts for the pair.
    pub async fn clear(&self, identifier: &str, ip: &str) -> AppResult<()> {
        self.limiter.clear(&Self::key(identifier, ip)).await
    }

    /// Runs a login through the throttle. `identifier_field` names the
    /// credential used as the throttle identity (typically `email`).
    pub async fn attempt<U: Principal>(
        &self,
        guard: &mut SessionGuard<U>,
        credentials: &Credentials,
        remember: bool,
        identifier_field: &str,
        ip: &str,
    ) -> AppResult<LoginOutcome> {
        let identifier = credentials.get(identifier_field).unwrap_or_default();

        if self.too_many_attempts(identifier, ip).await? {
            return Ok(LoginOutcome::LockedOut {
                retry_after: self.available_in(identifier, ip).await?,
            });
        }

        if guard.attempt(credentials, remember).await? {
            self.clear(identifier, ip).await?;
            return Ok(LoginOutcome::Authenticated);
        }

        self.increment(identifier, ip).await?;
        Ok(LoginOutcome::Failed)
    }
}
