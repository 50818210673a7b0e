//! The password reset broker.

use std::future::Future;
use std::sync::Arc;

use tracing::{info, warn};

use warden_core::AppResult;
use warden_core::events::{AuthEvent, EventBus};
use warden_core::traits::{CanResetPassword, ResetNotifier, UserProvider};
use warden_core::types::Credentials;

use super::repository::TokenRepository;
use crate::password::PasswordValidator;

/// Credential field carrying the reset token.
pub const TOKEN_FIELD: &str = "token";

/// Credential field carrying the password confirmation.
pub const CONFIRMATION_FIELD: &str = "password_confirmation";

/// Outcome of requesting a reset link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetLinkStatus {
    /// A token was issued and handed to the notifier.
    LinkSent,
    /// No principal matched the credentials.
    InvalidUser,
    /// A token was issued too recently.
    Throttled,
}

/// Outcome of resetting a password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetStatus {
    /// The password was changed and the token consumed.
    PasswordReset,
    /// No principal matched the credentials.
    InvalidUser,
    /// The token was missing, wrong, or expired.
    InvalidToken,
    /// The new password failed the configured strength policy.
    InvalidPassword(String),
}

/// Issues reset tokens and applies password resets.
pub struct PasswordBroker<U: CanResetPassword> {
    provider: Arc<dyn UserProvider<User = U>>,
    tokens: Arc<dyn TokenRepository>,
    notifier: Arc<dyn ResetNotifier>,
    validator: Option<PasswordValidator>,
    events: EventBus,
}

impl<U: CanResetPassword> PasswordBroker<U> {
    /// Creates a broker.
    pub fn new(
        provider: Arc<dyn UserProvider<User = U>>,
        tokens: Arc<dyn TokenRepository>,
        notifier: Arc<dyn ResetNotifier>,
    ) -> Self {
        Self {
            provider,
            tokens,
            notifier,
            validator: None,
            events: EventBus::default(),
        }
    }

    /// Enforces `validator` on new passwords.
    pub fn with_validator(mut self, validator: PasswordValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Publishes lifecycle events on `events`.
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    /// The token repository.
    pub fn tokens(&self) -> &Arc<dyn TokenRepository> {
        &self.tokens
    }

    /// Issue a token for the matching principal and send it.
    pub async fn send_reset_link(&self, credentials: &Credentials) -> AppResult<ResetLinkStatus> {
        let Some(user) = self.get_user(credentials).await? else {
            return Ok(ResetLinkStatus::InvalidUser);
        };

        let email = user.email_for_password_reset();
        if self.tokens.recently_created(&email).await? {
            warn!("Password reset link requested inside the throttle window");
            return Ok(ResetLinkStatus::Throttled);
        }

        let token = self.tokens.create(&email).await?;
        self.notifier.send_reset_link(&email, &token).await?;

        info!(user_id = %user.identifier(), "Password reset link sent");
        self.events
            .publish(AuthEvent::PasswordResetLinkSent { email });
        Ok(ResetLinkStatus::LinkSent)
    }

    /// Validate the token in `credentials` and, when it matches, hand the
    /// principal and new password to `apply`. The token is consumed only
    /// after `apply` succeeds.
    pub async fn reset<F, Fut>(&self, credentials: &Credentials, apply: F) -> AppResult<ResetStatus>
    where
        F: FnOnce(U, String) -> Fut,
        Fut: Future<Output = AppResult<()>>,
    {
        let Some(user) = self.get_user(credentials).await? else {
            return Ok(ResetStatus::InvalidUser);
        };

        let email = user.email_for_password_reset();
        let token = credentials.get(TOKEN_FIELD).unwrap_or_default();
        if token.is_empty() || !self.tokens.exists(&email, token).await? {
            return Ok(ResetStatus::InvalidToken);
        }

        let password = credentials.password().unwrap_or_default().to_string();
        if let Some(validator) = &self.validator {
            if let Err(e) = validator.validate(&password) {
                return Ok(ResetStatus::InvalidPassword(e.message));
            }
        }

        let user_id = user.identifier().to_string();
        apply(user, password).await?;
        self.tokens.delete(&email).await?;

        info!(user_id = %user_id, "Password reset");
        self.events.publish(AuthEvent::PasswordReset { user_id });
        Ok(ResetStatus::PasswordReset)
    }

    /// Issue a token without sending it.
    pub async fn create_token(&self, user: &U) -> AppResult<String> {
        self.tokens.create(&user.email_for_password_reset()).await
    }

    /// True when `token` is live for `user`.
    pub async fn token_exists(&self, user: &U, token: &str) -> AppResult<bool> {
        self.tokens
            .exists(&user.email_for_password_reset(), token)
            .await
    }

    /// Remove every token issued for `user`.
    pub async fn delete_token(&self, user: &U) -> AppResult<()> {
        self.tokens.delete(&user.email_for_password_reset()).await
    }

    /// Sweep expired tokens from the repository.
    pub async fn delete_expired(&self) -> AppResult<u64> {
        self.tokens.delete_expired().await
    }

    async fn get_user(&self, credentials: &Credentials) -> AppResult<Option<U>> {
        let lookup = credentials.without(&[TOKEN_FIELD, CONFIRMATION_FIELD]);
        self.provider.retrieve_by_credentials(&lookup).await
    }
}
