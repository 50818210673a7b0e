//! Authorization decisions.

use thiserror::Error;

use warden_core::AppError;

/// Message used when a denial carries none of its own.
pub const DEFAULT_DENIAL_MESSAGE: &str = "This action is unauthorized.";

const FORBIDDEN: u16 = 403;

/// An allow/deny decision with an optional message and status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    allowed: bool,
    message: Option<String>,
    status: Option<u16>,
}

impl Response {
    /// An allowing decision.
    pub fn allow() -> Self {
        Self {
            allowed: true,
            message: None,
            status: None,
        }
    }

    /// A denial with the default message.
    pub fn deny() -> Self {
        Self {
            allowed: false,
            message: None,
            status: None,
        }
    }

    /// A denial with a custom message.
    pub fn deny_with(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::deny()
        }
    }

    /// A denial that should surface as 404 to hide the subject's existence.
    pub fn deny_as_not_found() -> Self {
        Self::deny().with_status(404)
    }

    /// Overrides the status code carried by a denial.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// True when allowed.
    pub fn allowed(&self) -> bool {
        self.allowed
    }

    /// True when denied.
    pub fn denied(&self) -> bool {
        !self.allowed
    }

    /// Custom message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Custom status, if any.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Converts a denial into an error.
    pub fn authorize(self) -> Result<Response, AuthorizationDenied> {
        if self.allowed {
            return Ok(self);
        }
        Err(AuthorizationDenied {
            message: self
                .message
                .unwrap_or_else(|| DEFAULT_DENIAL_MESSAGE.to_string()),
            status: self.status.unwrap_or(FORBIDDEN),
        })
    }
}

/// Raised by `authorize` when the decision is a denial.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct AuthorizationDenied {
    message: String,
    status: u16,
}

impl AuthorizationDenied {
    /// The denial message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status to report, 403 unless the denial chose another.
    pub fn status(&self) -> u16 {
        self.status
    }
}

impl From<AuthorizationDenied> for AppError {
    fn from(denied: AuthorizationDenied) -> Self {
        AppError::authorization(denied.message).with_status(denied.status)
    }
}

/// Values an ability, policy, or hook may return.
///
/// `None` means "no opinion" and lets evaluation continue; `bool` allows
/// only on `true`.
pub trait IntoDecision {
    /// The decision, or `None` for no opinion.
    fn into_decision(self) -> Option<Response>;
}

impl IntoDecision for bool {
    fn into_decision(self) -> Option<Response> {
        Some(if self { Response::allow() } else { Response::deny() })
    }
}

impl IntoDecision for Response {
    fn into_decision(self) -> Option<Response> {
        Some(self)
    }
}

impl IntoDecision for () {
    fn into_decision(self) -> Option<Response> {
        None
    }
}

impl<T: IntoDecision> IntoDecision for Option<T> {
    fn into_decision(self) -> Option<Response> {
        self.and_then(IntoDecision::into_decision)
    }
}
