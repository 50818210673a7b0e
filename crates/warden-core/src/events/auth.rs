//! Authentication lifecycle events.

use serde::{Deserialize, Serialize};

/// Events emitted during authentication ceremonies.
///
/// Principal identifiers are carried in their `Display` form so the event
/// type stays independent of the host's principal type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AuthEvent {
    /// Credentials are about to be checked.
    Attempting {
        /// Guard name.
        guard: String,
        /// Whether remember-me was requested.
        remember: bool,
    },
    /// Credentials were valid.
    Validated {
        /// Guard name.
        guard: String,
        /// The principal.
        user_id: String,
    },
    /// Credentials were rejected. `user_id` is set when the identity existed.
    Failed {
        /// Guard name.
        guard: String,
        /// The principal, if one matched the identifier.
        user_id: Option<String>,
    },
    /// A principal logged in.
    Login {
        /// Guard name.
        guard: String,
        /// The principal.
        user_id: String,
        /// Whether a remember-me token was issued.
        remember: bool,
    },
    /// A principal was resolved for the current context.
    Authenticated {
        /// Guard name.
        guard: String,
        /// The principal.
        user_id: String,
    },
    /// A principal logged out.
    Logout {
        /// Guard name.
        guard: String,
        /// The principal, if one was resolved.
        user_id: Option<String>,
    },
    /// A throttle key was locked out.
    Lockout {
        /// The throttle key.
        key: String,
        /// Seconds until the lockout lifts.
        retry_after: u64,
    },
    /// A reset link was handed to the notifier.
    PasswordResetLinkSent {
        /// Recipient.
        email: String,
    },
    /// A password was reset.
    PasswordReset {
        /// The principal.
        user_id: String,
    },
    /// The current principal confirmed its password.
    PasswordConfirmed {
        /// The principal.
        user_id: String,
    },
    /// A login was parked pending a two-factor code.
    TwoFactorChallenged {
        /// The principal.
        user_id: String,
    },
    /// A two-factor code was rejected.
    TwoFactorFailed {
        /// The principal.
        user_id: String,
    },
    /// A recovery code was consumed.
    RecoveryCodeUsed {
        /// The principal.
        user_id: String,
    },
}

impl AuthEvent {
    /// Short name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Attempting { .. } => "attempting",
            Self::Validated { .. } => "validated",
            Self::Failed { .. } => "failed",
            Self::Login { .. } => "login",
            Self::Authenticated { .. } => "authenticated",
            Self::Logout { .. } => "logout",
            Self::Lockout { .. } => "lockout",
            Self::PasswordResetLinkSent { .. } => "password_reset_link_sent",
            Self::PasswordReset { .. } => "password_reset",
            Self::PasswordConfirmed { .. } => "password_confirmed",
            Self::TwoFactorChallenged { .. } => "two_factor_challenged",
            Self::TwoFactorFailed { .. } => "two_factor_failed",
            Self::RecoveryCodeUsed { .. } => "recovery_code_used",
        }
    }
}
