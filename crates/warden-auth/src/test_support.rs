//! In-memory principal and provider shared by unit tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use warden_core::AppResult;
use warden_core::config::{BcryptConfig, HashingConfig};
use warden_core::traits::{
    CanResetPassword, Principal, RecoveryCodeStore, TwoFactorPrincipal, UserProvider,
};
use warden_core::types::Credentials;

use crate::crypto::constant_time_eq;
use crate::hashing::{BcryptHasher, HashManager, HashOptions, Hasher};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestUser {
    pub id: u64,
    pub email: String,
    pub password_hash: String,
    pub remember_token: Option<String>,
    pub api_token: Option<String>,
    pub two_factor_secret: Option<String>,
    pub recovery_codes: Vec<String>,
}

impl Principal for TestUser {
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

impl CanResetPassword for TestUser {
    fn email_for_password_reset(&self) -> String {
        self.email.clone()
    }
}

impl TwoFactorPrincipal for TestUser {
    fn two_factor_secret(&self) -> Option<&str> {
        self.two_factor_secret.as_deref()
    }

    fn recovery_codes(&self) -> &[String] {
        &self.recovery_codes
    }
}

pub struct TestProvider {
    users: Mutex<HashMap<u64, TestUser>>,
    hasher: HashManager,
}

impl TestProvider {
    pub fn new() -> Self {
        let mut config = HashingConfig::default();
        config.bcrypt.rounds = 4;
        Self {
            users: Mutex::new(HashMap::new()),
            hasher: HashManager::new(&config).unwrap(),
        }
    }

    pub fn hasher(&self) -> &HashManager {
        &self.hasher
    }

    pub async fn add_user(&self, email: &str, password: &str) -> TestUser {
        self.add_user_with_rounds(email, password, 4).await
    }

    pub async fn add_user_with_rounds(&self, email: &str, password: &str, rounds: u32) -> TestUser {
        let hasher = BcryptHasher::new(&BcryptConfig {
            rounds,
            verify: true,
        })
        .unwrap();
        let mut users = self.users.lock().await;
        let user = TestUser {
            id: users.len() as u64 + 1,
            email: email.to_string(),
            password_hash: hasher.make(password, &HashOptions::default()).unwrap(),
            remember_token: None,
            api_token: None,
            two_factor_secret: None,
            recovery_codes: Vec::new(),
        };
        users.insert(user.id, user.clone());
        user
    }

    pub async fn update(&self, user: TestUser) {
        self.users.lock().await.insert(user.id, user);
    }

    pub async fn set_remember_token(&self, id: u64, token: &str) {
        if let Some(user) = self.users.lock().await.get_mut(&id) {
            user.remember_token = Some(token.to_string());
        }
    }

    pub async fn stored(&self, id: u64) -> TestUser {
        self.users.lock().await.get(&id).cloned().unwrap()
    }
}

#[async_trait]
impl UserProvider for TestProvider {
    type User = TestUser;

    async fn retrieve_by_id(&self, id: &u64) -> AppResult<Option<TestUser>> {
        Ok(self.users.lock().await.get(id).cloned())
    }

    async fn retrieve_by_token(&self, id: &u64, token: &str) -> AppResult<Option<TestUser>> {
        let users = self.users.lock().await;
        Ok(users
            .get(id)
            .filter(|u| {
                u.remember_token
                    .as_deref()
                    .is_some_and(|t| constant_time_eq(t.as_bytes(), token.as_bytes()))
            })
            .cloned())
    }

    async fn update_remember_token(&self, user: &mut TestUser, token: &str) -> AppResult<()> {
        user.remember_token = Some(token.to_string());
        self.set_remember_token(user.id, token).await;
        Ok(())
    }

    async fn retrieve_by_credentials(&self, credentials: &Credentials) -> AppResult<Option<TestUser>> {
        if credentials.has_only_password() {
            return Ok(None);
        }
        let users = self.users.lock().await;
        Ok(users
            .values()
            .find(|u| {
                credentials.without_password().all(|(field, value)| match field {
                    "email" => u.email == value,
                    "api_token" => u.api_token.as_deref() == Some(value),
                    _ => false,
                })
            })
            .cloned())
    }

    async fn validate_credentials(&self, user: &TestUser, credentials: &Credentials) -> AppResult<bool> {
        Ok(credentials
            .password()
            .is_some_and(|p| self.hasher.check(p, &user.password_hash)))
    }

    async fn rehash_password_if_required(
        &self,
        user: &mut TestUser,
        credentials: &Credentials,
        force: bool,
    ) -> AppResult<()> {
        if !force && !self.hasher.needs_rehash(&user.password_hash, &HashOptions::default()) {
            return Ok(());
        }
        if let Some(password) = credentials.password() {
            user.password_hash = self.hasher.make(password, &HashOptions::default())?;
            self.update(user.clone()).await;
        }
        Ok(())
    }
}

#[async_trait]
impl RecoveryCodeStore<TestUser> for TestProvider {
    async fn replace_recovery_code(
        &self,
        user: &mut TestUser,
        used: &str,
        replacement: &str,
    ) -> AppResult<()> {
        for code in user.recovery_codes.iter_mut() {
            if code == used {
                *code = replacement.to_string();
            }
        }
        self.update(user.clone()).await;
        Ok(())
    }
}

pub fn credentials(email: &str, password: &str) -> Credentials {
    Credentials::new()
        .with("email", email)
        .with("password", password)
}
