//! Login throttling configuration.

use serde::{Deserialize, Serialize};

/// Brute-force protection for login attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Failed attempts allowed inside one window.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u64,
    /// Window length (and lockout duration) in seconds.
    #[serde(default = "default_decay")]
    pub decay_seconds: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            decay_seconds: default_decay(),
        }
    }
}

fn default_max_attempts() -> u64 {
    5
}

fn default_decay() -> u64 {
    60
}
