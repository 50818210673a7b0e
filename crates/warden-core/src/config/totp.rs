//! Two-factor (TOTP) configuration.

use serde::{Deserialize, Serialize};

/// Time-based one-time password settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotpConfig {
    /// Issuer shown by authenticator apps.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Step length in seconds.
    #[serde(default = "default_period")]
    pub period: u64,
    /// Code length.
    #[serde(default = "default_digits")]
    pub digits: u32,
    /// Steps accepted on either side of the current one.
    #[serde(default = "default_window")]
    pub window: u64,
    /// Number of recovery codes generated per enrolment.
    #[serde(default = "default_recovery_codes")]
    pub recovery_codes: usize,
}

impl Default for TotpConfig {
    fn default() -> Self {
        Self {
            issuer: default_issuer(),
            period: default_period(),
            digits: default_digits(),
            window: default_window(),
            recovery_codes: default_recovery_codes(),
        }
    }
}

fn default_issuer() -> String {
    "Warden".to_string()
}

fn default_period() -> u64 {
    30
}

fn default_digits() -> u32 {
    6
}

fn default_window() -> u64 {
    1
}

fn default_recovery_codes() -> usize {
    8
}
