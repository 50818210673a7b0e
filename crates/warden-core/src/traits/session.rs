//! Session, cookie, and request-token transport contracts.
//!
//! Guards never touch ambient request state; the host HTTP layer injects
//! these per request and reads queued cookies back when building the
//! response.

use async_trait::async_trait;
use chrono::Duration;

use crate::config::session::{SameSite, SessionConfig};
use crate::result::AppResult;

/// Server-side session storage for one client.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Current session identifier.
    fn id(&self) -> String;

    /// Read a value.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Write a value.
    async fn put(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove a value, returning what was stored.
    async fn remove(&self, key: &str) -> AppResult<Option<String>>;

    /// Issue a new session identifier, keeping the data.
    /// With `destroy`, the record stored under the old identifier is deleted.
    async fn regenerate(&self, destroy: bool) -> AppResult<()>;
}

/// Incoming cookies plus the queue of cookies to send back.
pub trait CookieJar: Send + Sync + 'static {
    /// Value of an incoming cookie.
    fn get(&self, name: &str) -> Option<String>;

    /// Queue a cookie for the response.
    fn queue(&self, cookie: Cookie);

    /// Queue an expiring cookie that removes `name` from the client.
    fn forget(&self, name: &str, config: &SessionConfig) {
        self.queue(Cookie::expired(name, config));
    }
}

/// Source of a bearer/API token presented with a request.
pub trait TokenSource: Send + Sync + 'static {
    /// `Authorization: Bearer ...` value.
    fn bearer_token(&self) -> Option<String>;

    /// Query string or body field.
    fn input(&self, key: &str) -> Option<String>;
}

/// An outgoing cookie with its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// `Path` attribute.
    pub path: String,
    /// `Domain` attribute.
    pub domain: Option<String>,
    /// `Max-Age`; `None` makes a session cookie, zero or negative expires it.
    pub max_age: Option<Duration>,
    /// `Secure` attribute.
    pub secure: bool,
    /// `HttpOnly` attribute.
    pub http_only: bool,
    /// `SameSite` attribute.
    pub same_site: SameSite,
}

impl Cookie {
    /// Builds a cookie with the configured attributes and lifetime.
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        max_age: Option<Duration>,
        config: &SessionConfig,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: config.cookie_path.clone(),
            domain: config.cookie_domain.clone(),
            max_age,
            secure: config.secure,
            http_only: config.http_only,
            same_site: config.same_site,
        }
    }

    /// Builds a cookie that deletes `name` on the client.
    pub fn expired(name: impl Into<String>, config: &SessionConfig) -> Self {
        Self::new(name, "", Some(Duration::zero()), config)
    }

    /// True when this cookie removes itself from the client.
    pub fn is_expired(&self) -> bool {
        self.max_age.is_some_and(|age| age <= Duration::zero())
    }

    /// Renders the `Set-Cookie` header value.
    pub fn to_header_value(&self) -> String {
        let mut out = format!("{}={}; Path={}", self.name, self.value, self.path);
        if let Some(domain) = &self.domain {
            out.push_str(&format!("; Domain={domain}"));
        }
        if let Some(age) = self.max_age {
            out.push_str(&format!("; Max-Age={}", age.num_seconds().max(0)));
        }
        if self.secure {
            out.push_str("; Secure");
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        out.push_str(&format!("; SameSite={}", self.same_site));
        out
    }
}
