//! Stateful guard backed by the server-side session and a remember-me cookie.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use warden_core::AppResult;
use warden_core::config::{SessionConfig, bounded_window};
use warden_core::events::{AuthEvent, EventBus};
use warden_core::traits::{Cookie, CookieJar, IdOf, Principal, SessionStore, UserProvider};
use warden_core::types::Credentials;

use super::{Guard, GuardState, Recaller};
use crate::crypto::random_hex;
use crate::timebox::Timebox;

/// Length of a remember token before hex encoding.
const REMEMBER_TOKEN_BYTES: usize = 32;

/// Session-backed guard for one request context.
pub struct SessionGuard<U: Principal> {
    name: String,
    provider: Arc<dyn UserProvider<User = U>>,
    session: Arc<dyn SessionStore>,
    cookies: Arc<dyn CookieJar>,
    config: SessionConfig,
    events: EventBus,
    timebox: Timebox,
    rehash_on_login: bool,
    state: GuardState<U>,
    logged_out: bool,
    via_remember: bool,
}

impl<U: Principal> SessionGuard<U> {
    /// Creates a guard over the given session and cookie jar.
    pub fn new(
        name: impl Into<String>,
        provider: Arc<dyn UserProvider<User = U>>,
        session: Arc<dyn SessionStore>,
        cookies: Arc<dyn CookieJar>,
        config: SessionConfig,
    ) -> Self {
        Self {
            name: name.into(),
            provider,
            session,
            cookies,
            config,
            events: EventBus::default(),
            timebox: Timebox::default(),
            rehash_on_login: true,
            state: GuardState::Unresolved,
            logged_out: false,
            via_remember: false,
        }
    }

    /// Publishes lifecycle events on `events`.
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    /// Pads failed attempts to `timebox`.
    pub fn with_timebox(mut self, timebox: Timebox) -> Self {
        self.timebox = timebox;
        self
    }

    /// Whether a successful attempt upgrades a stale password hash.
    pub fn with_rehash_on_login(mut self, enabled: bool) -> Self {
        self.rehash_on_login = enabled;
        self
    }

    /// The user provider.
    pub fn provider(&self) -> &Arc<dyn UserProvider<User = U>> {
        &self.provider
    }

    /// The session store.
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// The event bus.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Name of the remember-me cookie.
    pub fn recaller_name(&self) -> String {
        format!("remember_{}", self.name)
    }

    /// True when the current principal came from the remember-me cookie.
    pub fn via_remember(&self) -> bool {
        self.via_remember
    }

    /// Attempt to authenticate with credentials, logging in on success.
    pub async fn attempt(&mut self, credentials: &Credentials, remember: bool) -> AppResult<bool> {
        self.events.publish(AuthEvent::Attempting {
            guard: self.name.clone(),
            remember,
        });

        match self.verify_credentials(credentials).await? {
            Some(user) => {
                self.login(user, remember).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Looks up and checks credentials without logging in.
    ///
    /// Failures are padded to the guard's timebox so a missing identity and
    /// a wrong password take the same time. A valid principal gets its
    /// password rehashed when the hash is stale and rehashing is enabled.
    pub async fn verify_credentials(&self, credentials: &Credentials) -> AppResult<Option<U>> {
        let timebox = self.timebox;
        timebox
            .call(self.verify_within_timebox(credentials))
            .await
    }

    async fn verify_within_timebox(
        &self,
        credentials: &Credentials,
    ) -> AppResult<(Option<U>, bool)> {
        let Some(mut user) = self.provider.retrieve_by_credentials(credentials).await? else {
            self.fire_failed(None);
            return Ok((None, false));
        };

        if !self.provider.validate_credentials(&user, credentials).await? {
            self.fire_failed(Some(&user));
            return Ok((None, false));
        }

        self.fire_validated(&user);
        if self.rehash_on_login {
            self.provider
                .rehash_password_if_required(&mut user, credentials, false)
                .await?;
        }
        Ok((Some(user), true))
    }

    /// Authenticate for this context only; nothing is written to the session
    /// or cookies.
    pub async fn once(&mut self, credentials: &Credentials) -> AppResult<bool> {
        self.events.publish(AuthEvent::Attempting {
            guard: self.name.clone(),
            remember: false,
        });

        let Some(user) = self.provider.retrieve_by_credentials(credentials).await? else {
            self.fire_failed(None);
            return Ok(false);
        };
        if !self.provider.validate_credentials(&user, credentials).await? {
            self.fire_failed(Some(&user));
            return Ok(false);
        }

        self.fire_validated(&user);
        self.set_user(user);
        Ok(true)
    }

    /// Log a principal in: store its identifier in the session, regenerate
    /// the session id, and with `remember` issue a fresh remember token.
    pub async fn login(&mut self, mut user: U, remember: bool) -> AppResult<()> {
        let id = user.identifier();
        self.update_session(&id).await?;

        if remember {
            let token = self.cycle_remember_token(&mut user).await?;
            self.queue_recaller(&id, &token);
        }

        info!(guard = %self.name, user_id = %id, remember, "Principal logged in");
        self.events.publish(AuthEvent::Login {
            guard: self.name.clone(),
            user_id: id.to_string(),
            remember,
        });

        self.set_user(user);
        Ok(())
    }

    /// Look up a principal by identifier and log it in.
    pub async fn login_using_id(&mut self, id: &IdOf<U>, remember: bool) -> AppResult<Option<U>> {
        let Some(user) = self.provider.retrieve_by_id(id).await? else {
            return Ok(None);
        };
        self.login(user.clone(), remember).await?;
        Ok(Some(user))
    }

    /// Look up a principal by identifier and set it for this context only.
    pub async fn once_using_id(&mut self, id: &IdOf<U>) -> AppResult<Option<U>> {
        let Some(user) = self.provider.retrieve_by_id(id).await? else {
            return Ok(None);
        };
        self.set_user(user.clone());
        Ok(Some(user))
    }

    /// Log the current principal out.
    ///
    /// Clears the session entry and the remember-me cookie, regenerates the
    /// session id, and rotates the principal's remember token. Afterwards
    /// the guard reports no principal for the rest of this context.
    pub async fn logout(&mut self) -> AppResult<()> {
        let user = self.user().await?;

        self.session.remove(&self.config.auth_key).await?;
        self.cookies.forget(&self.recaller_name(), &self.config);
        self.session.regenerate(true).await?;

        if let Some(mut user) = user.clone() {
            if user.remember_token().is_some_and(|token| !token.is_empty()) {
                self.cycle_remember_token(&mut user).await?;
            }
        }

        let user_id = user.map(|u| u.identifier().to_string());
        info!(guard = %self.name, user_id = ?user_id, "Principal logged out");
        self.events.publish(AuthEvent::Logout {
            guard: self.name.clone(),
            user_id,
        });

        self.state = GuardState::Anonymous;
        self.logged_out = true;
        self.via_remember = false;
        Ok(())
    }

    /// Drops the memoized principal so the next call resolves again.
    pub fn forget_user(&mut self) {
        self.state = GuardState::Unresolved;
    }

    async fn update_session(&self, id: &IdOf<U>) -> AppResult<()> {
        self.session
            .put(&self.config.auth_key, &id.to_string())
            .await?;
        self.session.regenerate(true).await
    }

    async fn id_from_session(&self) -> AppResult<Option<IdOf<U>>> {
        let Some(raw) = self.session.get(&self.config.auth_key).await? else {
            return Ok(None);
        };
        let id = raw.parse::<IdOf<U>>().ok();
        if id.is_none() {
            warn!(guard = %self.name, "Unparseable principal identifier in session");
        }
        Ok(id)
    }

    async fn user_from_recaller(&self, raw: &str) -> AppResult<Option<U>> {
        let parsed = Recaller::parse(raw)
            .and_then(|recaller| Some((recaller.id.parse::<IdOf<U>>().ok()?, recaller.token)));
        let Some((id, token)) = parsed else {
            warn!(guard = %self.name, "Malformed remember-me cookie");
            self.cookies.forget(&self.recaller_name(), &self.config);
            return Ok(None);
        };

        match self.provider.retrieve_by_token(&id, &token).await? {
            Some(mut user) => {
                let fresh = self.cycle_remember_token(&mut user).await?;
                self.queue_recaller(&id, &fresh);
                Ok(Some(user))
            }
            None => {
                warn!(guard = %self.name, user_id = %id, "Remember-me token rejected");
                if let Some(mut owner) = self.provider.retrieve_by_id(&id).await? {
                    self.cycle_remember_token(&mut owner).await?;
                }
                self.cookies.forget(&self.recaller_name(), &self.config);
                Ok(None)
            }
        }
    }

    async fn cycle_remember_token(&self, user: &mut U) -> AppResult<String> {
        let token = random_hex(REMEMBER_TOKEN_BYTES);
        self.provider.update_remember_token(user, &token).await?;
        user.set_remember_token(token.clone());
        debug!(guard = %self.name, "Remember token rotated");
        Ok(token)
    }

    fn queue_recaller(&self, id: &IdOf<U>, token: &str) {
        self.cookies.queue(Cookie::new(
            self.recaller_name(),
            Recaller::encode(id, token),
            Some(bounded_window(self.config.remember_minutes.saturating_mul(60))),
            &self.config,
        ));
    }

    fn fire_validated(&self, user: &U) {
        self.events.publish(AuthEvent::Validated {
            guard: self.name.clone(),
            user_id: user.identifier().to_string(),
        });
    }

    fn fire_failed(&self, user: Option<&U>) {
        debug!(guard = %self.name, "Authentication attempt failed");
        self.events.publish(AuthEvent::Failed {
            guard: self.name.clone(),
            user_id: user.map(|u| u.identifier().to_string()),
        });
    }
}

#[async_trait]
impl<U: Principal> Guard for SessionGuard<U> {
    type User = U;

    fn name(&self) -> &str {
        &self.name
    }

    async fn user(&mut self) -> AppResult<Option<U>> {
        if self.logged_out {
            return Ok(None);
        }
        match &self.state {
            GuardState::Authenticated(user) => return Ok(Some(user.clone())),
            GuardState::Anonymous => return Ok(None),
            GuardState::Unresolved => {}
        }

        let mut user = None;
        if let Some(id) = self.id_from_session().await? {
            user = self.provider.retrieve_by_id(&id).await?;
            if user.is_some() {
                self.events.publish(AuthEvent::Authenticated {
                    guard: self.name.clone(),
                    user_id: id.to_string(),
                });
            }
        }

        if user.is_none() {
            if let Some(raw) = self.cookies.get(&self.recaller_name()) {
                user = self.user_from_recaller(&raw).await?;
                if let Some(found) = &user {
                    let id = found.identifier();
                    self.update_session(&id).await?;
                    self.via_remember = true;
                    self.events.publish(AuthEvent::Login {
                        guard: self.name.clone(),
                        user_id: id.to_string(),
                        remember: true,
                    });
                }
            }
        }

        self.state = match &user {
            Some(found) => GuardState::Authenticated(found.clone()),
            None => GuardState::Anonymous,
        };
        Ok(user)
    }

    async fn validate(&mut self, credentials: &Credentials) -> AppResult<bool> {
        let Some(user) = self.provider.retrieve_by_credentials(credentials).await? else {
            return Ok(false);
        };
        let valid = self.provider.validate_credentials(&user, credentials).await?;
        if valid {
            self.fire_validated(&user);
        }
        Ok(valid)
    }

    fn has_user(&self) -> bool {
        self.state.user().is_some()
    }

    fn set_user(&mut self, user: U) {
        self.events.publish(AuthEvent::Authenticated {
            guard: self.name.clone(),
            user_id: user.identifier().to_string(),
        });
        self.state = GuardState::Authenticated(user);
        self.logged_out = false;
    }
}
