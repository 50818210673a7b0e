//! Session key and cookie configuration.

use serde::{Deserialize, Serialize};

/// Settings for the session-backed guard's transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session key holding the authenticated principal's identifier.
    #[serde(default = "default_auth_key")]
    pub auth_key: String,
    /// Lifetime of the remember-me cookie in minutes (about one year).
    #[serde(default = "default_remember_minutes")]
    pub remember_minutes: i64,
    /// Cookie path.
    #[serde(default = "default_path")]
    pub cookie_path: String,
    /// Cookie domain, if any.
    #[serde(default)]
    pub cookie_domain: Option<String>,
    /// Emit the `Secure` attribute.
    #[serde(default = "default_true")]
    pub secure: bool,
    /// Emit the `HttpOnly` attribute.
    #[serde(default = "default_true")]
    pub http_only: bool,
    /// `SameSite` attribute.
    #[serde(default)]
    pub same_site: SameSite,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auth_key: default_auth_key(),
            remember_minutes: default_remember_minutes(),
            cookie_path: default_path(),
            cookie_domain: None,
            secure: true,
            http_only: true,
            same_site: SameSite::default(),
        }
    }
}

/// Cookie `SameSite` policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SameSite {
    /// `SameSite=Strict`
    Strict,
    /// `SameSite=Lax`
    #[default]
    Lax,
    /// `SameSite=None`
    None,
}

impl std::fmt::Display for SameSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SameSite::Strict => write!(f, "Strict"),
            SameSite::Lax => write!(f, "Lax"),
            SameSite::None => write!(f, "None"),
        }
    }
}

fn default_auth_key() -> String {
    "auth_id".to_string()
}

fn default_remember_minutes() -> i64 {
    525_600
}

fn default_path() -> String {
    "/".to_string()
}

fn default_true() -> bool {
    true
}
