//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate.
//! Each sub-module represents a logical configuration section, and every
//! field carries a serde default so an empty source yields a usable setup.

pub mod auth;
pub mod cache;
pub mod hashing;
pub mod logging;
pub mod passwords;
pub mod session;
pub mod throttle;
pub mod totp;

use serde::{Deserialize, Serialize};

pub use self::auth::{AuthConfig, GuardConfig, GuardDriver};
pub use self::cache::{CacheConfig, MemoryCacheConfig, RedisCacheConfig};
pub use self::hashing::{ArgonConfig, BcryptConfig, HashingConfig};
pub use self::logging::LoggingConfig;
pub use self::passwords::{PasswordPolicyConfig, PasswordResetConfig, TokenStoreKind};
pub use self::session::{SameSite, SessionConfig};
pub use self::throttle::ThrottleConfig;
pub use self::totp::TotpConfig;

use crate::error::AppError;

/// Longest window any duration setting may describe (one hundred years).
pub const MAX_WINDOW_SECONDS: i64 = 100 * 365 * 24 * 60 * 60;

/// `seconds` as a duration, capped at [`MAX_WINDOW_SECONDS`].
pub fn bounded_window(seconds: impl TryInto<i64>) -> chrono::Duration {
    let seconds = seconds.try_into().unwrap_or(MAX_WINDOW_SECONDS);
    chrono::Duration::seconds(seconds.clamp(0, MAX_WINDOW_SECONDS))
}

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Guard and provider settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Password hashing settings.
    #[serde(default)]
    pub hashing: HashingConfig,
    /// Cache provider settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Session key and cookie settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Password reset broker settings.
    #[serde(default)]
    pub passwords: PasswordResetConfig,
    /// Two-factor settings.
    #[serde(default)]
    pub totp: TotpConfig,
    /// Login throttling settings.
    #[serde(default)]
    pub throttle: ThrottleConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default`, an environment-specific overlay
    /// `config/{env}`, and environment variables prefixed with `WARDEN__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("WARDEN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;
        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects duration settings outside `0..=MAX_WINDOW_SECONDS`.
    pub fn validate(&self) -> Result<(), AppError> {
        let windows = [
            ("session.remember_minutes", i128::from(self.session.remember_minutes) * 60),
            ("passwords.expire_minutes", i128::from(self.passwords.expire_minutes) * 60),
            ("passwords.throttle_seconds", i128::from(self.passwords.throttle_seconds)),
            (
                "passwords.prune_interval_minutes",
                i128::from(self.passwords.prune_interval_minutes) * 60,
            ),
            (
                "auth.password_timeout_seconds",
                i128::from(self.auth.password_timeout_seconds),
            ),
            ("throttle.decay_seconds", i128::from(self.throttle.decay_seconds)),
        ];

        for (key, seconds) in windows {
            if !(0..=i128::from(MAX_WINDOW_SECONDS)).contains(&seconds) {
                return Err(AppError::configuration(format!(
                    "{key} is out of range (0 to {MAX_WINDOW_SECONDS} seconds)"
                )));
            }
        }
        Ok(())
    }
}
