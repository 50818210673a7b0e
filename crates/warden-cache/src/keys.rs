//! Cache key builders for every entry the auth engine writes.
//!
//! Backends add their own deployment prefix (see `RedisCacheConfig::key_prefix`).

/// Namespace for auth engine keys.
const NAMESPACE: &str = "auth";

// ── Rate limiting keys ─────────────────────────────────────

/// Cache key for a rate limiter attempt counter.
pub fn rate_limit(key: &str) -> String {
    format!("{NAMESPACE}:throttle:{key}")
}

/// Cache key for a rate limiter lockout timer.
pub fn rate_limit_timer(key: &str) -> String {
    format!("{NAMESPACE}:throttle-timer:{key}")
}

// ── Password reset keys ────────────────────────────────────

/// Cache key for the live reset token record of an email address.
pub fn password_reset(email: &str) -> String {
    format!("{NAMESPACE}:password_reset:{}", email.to_lowercase())
}
