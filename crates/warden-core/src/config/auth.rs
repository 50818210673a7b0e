//! Guard configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Authentication guard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Guard used when the caller does not name one.
    #[serde(default = "default_guard")]
    pub default_guard: String,
    /// Named guards. Key is the guard name.
    #[serde(default = "default_guards")]
    pub guards: HashMap<String, GuardConfig>,
    /// Seconds a password confirmation stays valid.
    #[serde(default = "default_password_timeout")]
    pub password_timeout_seconds: u64,
    /// Minimum duration of a failed login attempt, in milliseconds.
    #[serde(default = "default_timebox_ms")]
    pub login_timebox_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            default_guard: default_guard(),
            guards: default_guards(),
            password_timeout_seconds: default_password_timeout(),
            login_timebox_ms: default_timebox_ms(),
        }
    }
}

/// A single named guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// How the guard resolves the current principal.
    pub driver: GuardDriver,
    /// Name of the registered user provider backing this guard.
    pub provider: String,
    /// Request input field carrying the API token (token driver only).
    #[serde(default = "default_input_key")]
    pub input_key: String,
    /// Credential field the API token is matched against (token driver only).
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Whether stored API tokens are SHA-256 hashed (token driver only).
    #[serde(default)]
    pub hash: bool,
}

/// Guard driver kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardDriver {
    /// Session-backed authentication with remember-me cookies.
    Session,
    /// Bearer/API token authentication.
    Token,
}

impl std::fmt::Display for GuardDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GuardDriver::Session => write!(f, "session"),
            GuardDriver::Token => write!(f, "token"),
        }
    }
}

fn default_guard() -> String {
    "web".to_string()
}

fn default_guards() -> HashMap<String, GuardConfig> {
    let mut guards = HashMap::new();
    guards.insert(
        "web".to_string(),
        GuardConfig {
            driver: GuardDriver::Session,
            provider: "users".to_string(),
            input_key: default_input_key(),
            storage_key: default_storage_key(),
            hash: false,
        },
    );
    guards.insert(
        "api".to_string(),
        GuardConfig {
            driver: GuardDriver::Token,
            provider: "users".to_string(),
            input_key: default_input_key(),
            storage_key: default_storage_key(),
            hash: true,
        },
    );
    guards
}

fn default_input_key() -> String {
    "api_token".to_string()
}

fn default_storage_key() -> String {
    "api_token".to_string()
}

fn default_password_timeout() -> u64 {
    10800
}

fn default_timebox_ms() -> u64 {
    200
}
