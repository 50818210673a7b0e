//! Password reset broker configuration.

use serde::{Deserialize, Serialize};

/// Password reset token settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetConfig {
    /// Name of the user provider the broker looks principals up in.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Where reset tokens are kept.
    #[serde(default)]
    pub store: TokenStoreKind,
    /// Minutes a reset token stays valid.
    #[serde(default = "default_expire")]
    pub expire_minutes: u64,
    /// Seconds that must pass before another token can be issued for the same email.
    #[serde(default = "default_throttle")]
    pub throttle_seconds: u64,
    /// Minutes between expired-token sweeps.
    #[serde(default = "default_prune_interval")]
    pub prune_interval_minutes: u64,
    /// Strength policy applied to new passwords during a reset.
    #[serde(default)]
    pub policy: PasswordPolicyConfig,
}

impl Default for PasswordResetConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            store: TokenStoreKind::default(),
            expire_minutes: default_expire(),
            throttle_seconds: default_throttle(),
            prune_interval_minutes: default_prune_interval(),
            policy: PasswordPolicyConfig::default(),
        }
    }
}

/// Password strength rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordPolicyConfig {
    /// Whether resets enforce the policy.
    #[serde(default)]
    pub enabled: bool,
    /// Minimum length in characters.
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    /// Minimum zxcvbn score (0-4).
    #[serde(default = "default_min_score")]
    pub min_score: u8,
}

impl Default for PasswordPolicyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_length: default_min_length(),
            min_score: default_min_score(),
        }
    }
}

/// Reset token storage backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStoreKind {
    /// Records live in the configured cache provider.
    #[default]
    Cache,
    /// Records live in process memory.
    Memory,
}

fn default_provider() -> String {
    "users".to_string()
}

fn default_expire() -> u64 {
    60
}

fn default_throttle() -> u64 {
    60
}

fn default_prune_interval() -> u64 {
    60
}

fn default_min_length() -> usize {
    8
}

fn default_min_score() -> u8 {
    3
}
