//! Shared test helpers for integration tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use warden::auth::crypto::constant_time_eq;
use warden::auth::hashing::HashOptions;
use warden::auth::transport::{MemoryCookieJar, MemorySession};
use warden::auth::{AuthManager, HashManager, Hasher, SessionGuard};
use warden::cache::memory::MemoryCacheProvider;
use warden::core::config::AppConfig;
use warden::core::events::EventBus;
use warden::core::traits::{
    CacheProvider, CanResetPassword, Principal, RecoveryCodeStore, TwoFactorPrincipal,
    UserProvider,
};
use warden::core::types::{Clock, Credentials, ManualClock};
use warden::core::AppResult;

/// A stored account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: u64,
    pub email: String,
    pub password_hash: String,
    pub remember_token: Option<String>,
    pub api_token: Option<String>,
    pub two_factor_secret: Option<String>,
    pub recovery_codes: Vec<String>,
    pub is_admin: bool,
}

impl Principal for Account {
    type Id = u64;

    fn identifier(&self) -> u64 {
        self.id
    }

    fn password_hash(&self) -> Option<&str> {
        Some(&self.password_hash)
    }

    fn remember_token(&self) -> Option<&str> {
        self.remember_token.as_deref()
    }

    fn set_remember_token(&mut self, token: String) {
        self.remember_token = Some(token);
    }
}

impl CanResetPassword for Account {
    fn email_for_password_reset(&self) -> String {
        self.email.clone()
    }
}

impl TwoFactorPrincipal for Account {
    fn two_factor_secret(&self) -> Option<&str> {
        self.two_factor_secret.as_deref()
    }

    fn recovery_codes(&self) -> &[String] {
        &self.recovery_codes
    }
}

/// Account store backed by a map, hashing with the configured driver.
pub struct AccountStore {
    accounts: Mutex<HashMap<u64, Account>>,
    hasher: HashManager,
}

impl AccountStore {
    pub fn new(hasher: HashManager) -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            hasher,
        }
    }

    pub async fn create(&self, email: &str, password: &str) -> Account {
        let mut accounts = self.accounts.lock().await;
        let account = Account {
            id: accounts.len() as u64 + 1,
            email: email.to_string(),
            password_hash: self
                .hasher
                .make(password, &HashOptions::default())
                .expect("Failed to hash password"),
            remember_token: None,
            api_token: None,
            two_factor_secret: None,
            recovery_codes: Vec::new(),
            is_admin: false,
        };
        accounts.insert(account.id, account.clone());
        account
    }

    pub async fn save(&self, account: Account) {
        self.accounts.lock().await.insert(account.id, account);
    }

    pub async fn find(&self, id: u64) -> Account {
        self.accounts
            .lock()
            .await
            .get(&id)
            .cloned()
            .expect("Account not found")
    }

    pub async fn has_password(&self, id: u64, password: &str) -> bool {
        let account = self.find(id).await;
        self.hasher.check(password, &account.password_hash)
    }

    pub async fn set_password(&self, id: u64, password: &str) {
        let hash = self
            .hasher
            .make(password, &HashOptions::default())
            .expect("Failed to hash password");
        if let Some(account) = self.accounts.lock().await.get_mut(&id) {
            account.password_hash = hash;
        }
    }
}

#[async_trait]
impl UserProvider for AccountStore {
    type User = Account;

    async fn retrieve_by_id(&self, id: &u64) -> AppResult<Option<Account>> {
        Ok(self.accounts.lock().await.get(id).cloned())
    }

    async fn retrieve_by_token(&self, id: &u64, token: &str) -> AppResult<Option<Account>> {
        Ok(self
            .accounts
            .lock()
            .await
            .get(id)
            .filter(|a| {
                a.remember_token
                    .as_deref()
                    .is_some_and(|t| constant_time_eq(t.as_bytes(), token.as_bytes()))
            })
            .cloned())
    }

    async fn update_remember_token(&self, user: &mut Account, token: &str) -> AppResult<()> {
        user.remember_token = Some(token.to_string());
        if let Some(account) = self.accounts.lock().await.get_mut(&user.id) {
            account.remember_token = Some(token.to_string());
        }
        Ok(())
    }

    async fn retrieve_by_credentials(&self, credentials: &Credentials) -> AppResult<Option<Account>> {
        if credentials.has_only_password() {
            return Ok(None);
        }
        Ok(self
            .accounts
            .lock()
            .await
            .values()
            .find(|a| {
                credentials.without_password().all(|(field, value)| match field {
                    "id" => a.id.to_string() == value,
                    "email" => a.email == value,
                    "api_token" => a.api_token.as_deref() == Some(value),
                    _ => false,
                })
            })
            .cloned())
    }

    async fn validate_credentials(&self, user: &Account, credentials: &Credentials) -> AppResult<bool> {
        Ok(credentials
            .password()
            .is_some_and(|p| self.hasher.check(p, &user.password_hash)))
    }
}

#[async_trait]
impl RecoveryCodeStore<Account> for AccountStore {
    async fn replace_recovery_code(
        &self,
        user: &mut Account,
        used: &str,
        replacement: &str,
    ) -> AppResult<()> {
        for code in user.recovery_codes.iter_mut().filter(|c| c.as_str() == used) {
            *code = replacement.to_string();
        }
        self.save(user.clone()).await;
        Ok(())
    }
}

/// Test application context
pub struct TestApp {
    pub config: AppConfig,
    pub clock: ManualClock,
    pub cache: Arc<dyn CacheProvider>,
    pub accounts: Arc<AccountStore>,
    pub events: EventBus,
    pub manager: AuthManager<Account>,
}

impl TestApp {
    /// Create a new test application with fast hashing and no login timebox.
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.hashing.bcrypt.rounds = 4;
        config.auth.login_timebox_ms = 0;
        Self::with_config(config)
    }

    pub fn with_config(config: AppConfig) -> Self {
        let clock = ManualClock::new();
        let shared_clock: Arc<dyn Clock> = Arc::new(clock.clone());
        let cache: Arc<dyn CacheProvider> = Arc::new(MemoryCacheProvider::new(
            &config.cache.memory,
            config.cache.default_ttl_seconds,
            shared_clock,
        ));

        let hasher = HashManager::new(&config.hashing).expect("Failed to init hasher");
        let accounts = Arc::new(AccountStore::new(hasher));
        let events = EventBus::default();

        let mut manager = AuthManager::new(&config).with_events(events.clone());
        let provider: Arc<dyn UserProvider<User = Account>> = accounts.clone();
        manager.register_provider("users", provider);

        Self {
            config,
            clock,
            cache,
            accounts,
            events,
            manager,
        }
    }

    pub fn shared_clock(&self) -> Arc<dyn Clock> {
        Arc::new(self.clock.clone())
    }

    /// A request context with its own session and cookie jar.
    pub fn request(&self) -> RequestContext {
        self.request_with_cookies(MemoryCookieJar::new())
    }

    pub fn request_with_cookies(&self, cookies: MemoryCookieJar) -> RequestContext {
        let session = Arc::new(MemorySession::new());
        let cookies = Arc::new(cookies);
        let guard = self
            .manager
            .session_guard(None, session.clone(), cookies.clone())
            .expect("Failed to build guard");
        RequestContext {
            session,
            cookies,
            guard,
        }
    }
}

/// One request's transport plus its guard.
pub struct RequestContext {
    pub session: Arc<MemorySession>,
    pub cookies: Arc<MemoryCookieJar>,
    pub guard: SessionGuard<Account>,
}

pub fn credentials(email: &str, password: &str) -> Credentials {
    Credentials::new()
        .with("email", email)
        .with("password", password)
}
