//! Named guard construction from configuration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use warden_core::config::{
    AppConfig, AuthConfig, GuardConfig, GuardDriver, PasswordResetConfig, SessionConfig,
    TokenStoreKind,
};
use warden_core::events::EventBus;
use warden_core::traits::{
    CacheProvider, CanResetPassword, CookieJar, Principal, ResetNotifier, SessionStore,
    TokenSource, UserProvider,
};
use warden_core::types::Clock;
use warden_core::{AppError, AppResult};

use crate::flows::PasswordConfirmation;
use crate::guard::{SessionGuard, TokenGuard};
use crate::password::PasswordValidator;
use crate::passwords::{
    CacheTokenRepository, MemoryTokenRepository, PasswordBroker, ResetTokenPruner, TokenLifetime,
    TokenRepository,
};
use crate::timebox::Timebox;

/// Builds per-request guards from the configured guard table.
pub struct AuthManager<U: Principal> {
    auth: AuthConfig,
    session: SessionConfig,
    passwords: PasswordResetConfig,
    providers: HashMap<String, Arc<dyn UserProvider<User = U>>>,
    events: EventBus,
    timebox: Timebox,
    rehash_on_login: bool,
}

impl<U: Principal> AuthManager<U> {
    /// Creates a manager with no providers registered.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            auth: config.auth.clone(),
            session: config.session.clone(),
            passwords: config.passwords.clone(),
            providers: HashMap::new(),
            events: EventBus::default(),
            timebox: Timebox::new(Duration::from_millis(config.auth.login_timebox_ms)),
            rehash_on_login: config.hashing.rehash_on_login,
        }
    }

    /// Shares `events` with every guard built from now on.
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    /// The event bus handed to guards.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Registers a user provider under `name`.
    pub fn register_provider(
        &mut self,
        name: impl Into<String>,
        provider: Arc<dyn UserProvider<User = U>>,
    ) -> &mut Self {
        let name = name.into();
        debug!(provider = %name, "User provider registered");
        self.providers.insert(name, provider);
        self
    }

    /// The provider registered under `name`.
    pub fn provider(&self, name: &str) -> AppResult<Arc<dyn UserProvider<User = U>>> {
        self.providers.get(name).cloned().ok_or_else(|| {
            AppError::configuration(format!("User provider [{name}] is not registered"))
        })
    }

    /// Name of the default guard.
    pub fn default_guard(&self) -> &str {
        &self.auth.default_guard
    }

    fn guard_config<'a>(
        &'a self,
        name: Option<&'a str>,
        driver: GuardDriver,
    ) -> AppResult<(&'a str, &'a GuardConfig)> {
        let name = name.unwrap_or(&self.auth.default_guard);
        let config = self
            .auth
            .guards
            .get(name)
            .ok_or_else(|| AppError::configuration(format!("Auth guard [{name}] is not defined")))?;

        if config.driver != driver {
            return Err(AppError::configuration(format!(
                "Auth guard [{name}] uses the {} driver, not {driver}",
                config.driver
            )));
        }
        Ok((name, config))
    }

    /// A session guard for one request.
    pub fn session_guard(
        &self,
        name: Option<&str>,
        session: Arc<dyn SessionStore>,
        cookies: Arc<dyn CookieJar>,
    ) -> AppResult<SessionGuard<U>> {
        let (name, config) = self.guard_config(name, GuardDriver::Session)?;
        let provider = self.provider(&config.provider)?;

        Ok(
            SessionGuard::new(name, provider, session, cookies, self.session.clone())
                .with_events(self.events.clone())
                .with_timebox(self.timebox)
                .with_rehash_on_login(self.rehash_on_login),
        )
    }

    /// A token guard for one request.
    pub fn token_guard(
        &self,
        name: Option<&str>,
        source: Arc<dyn TokenSource>,
    ) -> AppResult<TokenGuard<U>> {
        let (name, config) = self.guard_config(name, GuardDriver::Token)?;
        let provider = self.provider(&config.provider)?;

        Ok(TokenGuard::new(name, provider, source, config).with_events(self.events.clone()))
    }

    /// Password re-confirmation using the configured timeout.
    pub fn password_confirmation(&self, clock: Arc<dyn Clock>) -> PasswordConfirmation {
        PasswordConfirmation::new(self.auth.password_timeout_seconds, clock)
    }

    /// The reset token repository selected by `passwords.store`. The result
    /// must be shared between brokers; a memory store is process-local.
    pub fn reset_tokens(
        &self,
        cache: Arc<dyn CacheProvider>,
        clock: Arc<dyn Clock>,
    ) -> Arc<dyn TokenRepository> {
        let lifetime = TokenLifetime::from_config(&self.passwords, clock);
        match self.passwords.store {
            TokenStoreKind::Cache => Arc::new(CacheTokenRepository::new(cache, lifetime)),
            TokenStoreKind::Memory => Arc::new(MemoryTokenRepository::new(lifetime)),
        }
    }

    /// A pruner sweeping `tokens` at the configured interval.
    pub fn reset_token_pruner(&self, tokens: Arc<dyn TokenRepository>) -> ResetTokenPruner {
        ResetTokenPruner::new(
            tokens,
            Duration::from_secs(self.passwords.prune_interval_minutes.saturating_mul(60)),
        )
    }
}

impl<U: CanResetPassword> AuthManager<U> {
    /// A reset broker over the configured provider. The strength policy is
    /// applied to new passwords when enabled.
    pub fn password_broker(
        &self,
        tokens: Arc<dyn TokenRepository>,
        notifier: Arc<dyn ResetNotifier>,
    ) -> AppResult<PasswordBroker<U>> {
        let provider = self.provider(&self.passwords.provider)?;
        let mut broker = PasswordBroker::new(provider, tokens, notifier).with_events(self.events.clone());
        if self.passwords.policy.enabled {
            broker = broker.with_validator(PasswordValidator::new(&self.passwords.policy));
        }
        Ok(broker)
    }
}
