//! Two-step login: password first, then a TOTP or recovery code.

use std::sync::Arc;

use tracing::{info, warn};

use warden_core::AppResult;
use warden_core::events::AuthEvent;
use warden_core::traits::{IdOf, RecoveryCodeStore, SessionStore, TwoFactorPrincipal};
use warden_core::types::Credentials;

use crate::guard::{Guard, SessionGuard};
use crate::totp::{RecoveryCodes, TotpProvider};

/// Session key holding the identifier of the principal being challenged.
pub const LOGIN_ID_KEY: &str = "login.id";

/// Session key holding the remember-me choice made at the password step.
pub const LOGIN_REMEMBER_KEY: &str = "login.remember";

/// Second-factor input.
#[derive(Debug, Clone, Copy)]
pub enum TwoFactorCode<'a> {
    /// A code from the authenticator app.
    Totp(&'a str),
    /// One of the principal's recovery codes.
    Recovery(&'a str),
}

/// Result of the password step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeOutcome {
    /// Two-factor is off for this principal; it is now logged in.
    Authenticated,
    /// Credentials were valid; a second factor is required.
    ChallengeRequired,
    /// Credentials were rejected.
    Failed,
}

/// Drives the two-step login.
pub struct TwoFactorChallenge<U: TwoFactorPrincipal> {
    totp: TotpProvider,
    recovery: Arc<dyn RecoveryCodeStore<U>>,
}

impl<U: TwoFactorPrincipal> TwoFactorChallenge<U> {
    /// Creates the challenge flow.
    pub fn new(totp: TotpProvider, recovery: Arc<dyn RecoveryCodeStore<U>>) -> Self {
        Self { totp, recovery }
    }

    /// Password step. Principals with two-factor enabled are parked in the
    /// session instead of being logged in.
    pub async fn begin(
        &self,
        guard: &mut SessionGuard<U>,
        credentials: &Credentials,
        remember: bool,
    ) -> AppResult<ChallengeOutcome> {
        guard.events().publish(AuthEvent::Attempting {
            guard: guard.name().to_string(),
            remember,
        });

        let Some(user) = guard.verify_credentials(credentials).await? else {
            return Ok(ChallengeOutcome::Failed);
        };

        if !user.has_two_factor_enabled() {
            guard.login(user, remember).await?;
            return Ok(ChallengeOutcome::Authenticated);
        }

        let user_id = user.identifier().to_string();
        let session = guard.session();
        session.put(LOGIN_ID_KEY, &user_id).await?;
        session
            .put(LOGIN_REMEMBER_KEY, if remember { "1" } else { "0" })
            .await?;

        info!(user_id = %user_id, "Two-factor challenge issued");
        guard
            .events()
            .publish(AuthEvent::TwoFactorChallenged { user_id });
        Ok(ChallengeOutcome::ChallengeRequired)
    }

    /// The principal parked by [`begin`](Self::begin), if any.
    pub async fn challenged_user(&self, guard: &SessionGuard<U>) -> AppResult<Option<U>> {
        let Some(raw) = guard.session().get(LOGIN_ID_KEY).await? else {
            return Ok(None);
        };
        let Some(id) = raw.parse::<IdOf<U>>().ok() else {
            return Ok(None);
        };
        guard.provider().retrieve_by_id(&id).await
    }

    /// Code step. On success the parked principal is logged in with the
    /// remember-me choice from the password step.
    pub async fn complete(
        &self,
        guard: &mut SessionGuard<U>,
        code: TwoFactorCode<'_>,
    ) -> AppResult<bool> {
        let Some(mut user) = self.challenged_user(guard).await? else {
            return Ok(false);
        };
        let user_id = user.identifier().to_string();

        let valid = match code {
            TwoFactorCode::Totp(code) => user
                .two_factor_secret()
                .is_some_and(|secret| self.totp.verify(secret, code)),
            TwoFactorCode::Recovery(code) => {
                match RecoveryCodes::position(user.recovery_codes(), code) {
                    Some(index) => {
                        let used = user.recovery_codes()[index].clone();
                        self.recovery
                            .replace_recovery_code(&mut user, &used, &RecoveryCodes::generate_one())
                            .await?;
                        guard.events().publish(AuthEvent::RecoveryCodeUsed {
                            user_id: user_id.clone(),
                        });
                        true
                    }
                    None => false,
                }
            }
        };

        if !valid {
            warn!(user_id = %user_id, "Two-factor code rejected");
            guard
                .events()
                .publish(AuthEvent::TwoFactorFailed { user_id });
            return Ok(false);
        }

        let session = guard.session().clone();
        let remember = session.remove(LOGIN_REMEMBER_KEY).await?.as_deref() == Some("1");
        session.remove(LOGIN_ID_KEY).await?;

        guard.login(user, remember).await?;
        Ok(true)
    }
}
