//! Re-confirming the current password before sensitive actions.

use std::sync::Arc;

use chrono::Duration;
use tracing::info;

use warden_core::AppResult;
use warden_core::config::bounded_window;
use warden_core::events::AuthEvent;
use warden_core::traits::{Principal, SessionStore};
use warden_core::types::{Clock, Credentials};

use crate::guard::{Guard, SessionGuard};

/// Session key holding the unix time of the last confirmation.
pub const CONFIRMED_AT_KEY: &str = "auth.password_confirmed_at";

/// Tracks recent password confirmation in the session.
#[derive(Debug, Clone)]
pub struct PasswordConfirmation {
    timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl PasswordConfirmation {
    /// Confirmation stays valid for `timeout_seconds`.
    pub fn new(timeout_seconds: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            timeout: bounded_window(timeout_seconds),
            clock,
        }
    }

    /// Check `password` for the guard's current principal and record the
    /// confirmation time on success.
    pub async fn confirm<U: Principal>(
        &self,
        guard: &mut SessionGuard<U>,
        password: &str,
    ) -> AppResult<bool> {
        let Some(user) = guard.user().await? else {
            return Ok(false);
        };

        let credentials = Credentials::new().with("password", password);
        if !guard
            .provider()
            .validate_credentials(&user, &credentials)
            .await?
        {
            return Ok(false);
        }

        guard
            .session()
            .put(CONFIRMED_AT_KEY, &self.clock.timestamp().to_string())
            .await?;

        let user_id = user.identifier().to_string();
        info!(user_id = %user_id, "Password confirmed");
        guard
            .events()
            .publish(AuthEvent::PasswordConfirmed { user_id });
        Ok(true)
    }

    /// True while the last confirmation is within the timeout.
    pub async fn is_recently_confirmed(&self, session: &dyn SessionStore) -> AppResult<bool> {
        let confirmed_at = session
            .get(CONFIRMED_AT_KEY)
            .await?
            .and_then(|raw| raw.parse::<i64>().ok());

        Ok(confirmed_at
            .is_some_and(|at| self.clock.timestamp() - at < self.timeout.num_seconds()))
    }

    /// Forget the confirmation.
    pub async fn reset(&self, session: &dyn SessionStore) -> AppResult<()> {
        session.remove(CONFIRMED_AT_KEY).await?;
        Ok(())
    }
}
