//! Stateless guard that resolves the principal from an API token.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use warden_core::AppResult;
use warden_core::config::GuardConfig;
use warden_core::events::{AuthEvent, EventBus};
use warden_core::traits::{Principal, TokenSource, UserProvider};
use warden_core::types::Credentials;

use super::{Guard, GuardState};
use crate::crypto::sha256_hex;

/// Token guard for one request context.
///
/// The token is read from the `input_key` request field, falling back to
/// the bearer token, and matched against the provider's `storage_key`
/// field. With `hash` enabled the stored value is the SHA-256 hex digest.
pub struct TokenGuard<U: Principal> {
    name: String,
    provider: Arc<dyn UserProvider<User = U>>,
    source: Arc<dyn TokenSource>,
    input_key: String,
    storage_key: String,
    hash: bool,
    events: EventBus,
    state: GuardState<U>,
}

impl<U: Principal> TokenGuard<U> {
    /// Creates a guard from its configuration.
    pub fn new(
        name: impl Into<String>,
        provider: Arc<dyn UserProvider<User = U>>,
        source: Arc<dyn TokenSource>,
        config: &GuardConfig,
    ) -> Self {
        Self {
            name: name.into(),
            provider,
            source,
            input_key: config.input_key.clone(),
            storage_key: config.storage_key.clone(),
            hash: config.hash,
            events: EventBus::default(),
            state: GuardState::Unresolved,
        }
    }

    /// Publishes lifecycle events on `events`.
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    /// Switches to a new request; the memoized principal is dropped.
    pub fn set_request(&mut self, source: Arc<dyn TokenSource>) {
        self.source = source;
        self.state = GuardState::Unresolved;
    }

    /// The token presented with the current request.
    pub fn token_for_request(&self) -> Option<String> {
        self.source
            .input(&self.input_key)
            .filter(|token| !token.is_empty())
            .or_else(|| self.source.bearer_token().filter(|token| !token.is_empty()))
    }

    async fn retrieve_by_token(&self, token: &str) -> AppResult<Option<U>> {
        let stored = if self.hash {
            sha256_hex(token)
        } else {
            token.to_string()
        };
        let lookup = Credentials::new().with(self.storage_key.clone(), stored);
        self.provider.retrieve_by_credentials(&lookup).await
    }
}

#[async_trait]
impl<U: Principal> Guard for TokenGuard<U> {
    type User = U;

    fn name(&self) -> &str {
        &self.name
    }

    async fn user(&mut self) -> AppResult<Option<U>> {
        match &self.state {
            GuardState::Authenticated(user) => return Ok(Some(user.clone())),
            GuardState::Anonymous => return Ok(None),
            GuardState::Unresolved => {}
        }

        let user = match self.token_for_request() {
            Some(token) => self.retrieve_by_token(&token).await?,
            None => None,
        };

        match &user {
            Some(found) => {
                self.events.publish(AuthEvent::Authenticated {
                    guard: self.name.clone(),
                    user_id: found.identifier().to_string(),
                });
                self.state = GuardState::Authenticated(found.clone());
            }
            None => {
                debug!(guard = %self.name, "No principal for request token");
                self.state = GuardState::Anonymous;
            }
        }
        Ok(user)
    }

    async fn validate(&mut self, credentials: &Credentials) -> AppResult<bool> {
        let Some(token) = credentials.get(&self.input_key).filter(|t| !t.is_empty()) else {
            return Ok(false);
        };
        Ok(self.retrieve_by_token(token).await?.is_some())
    }

    fn has_user(&self) -> bool {
        self.state.user().is_some()
    }

    fn set_user(&mut self, user: U) {
        self.state = GuardState::Authenticated(user);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestProvider, TestUser};
    use crate::transport::StaticTokenSource;

    fn config(hash: bool) -> GuardConfig {
        GuardConfig {
            driver: warden_core::config::GuardDriver::Token,
            provider: "users".to_string(),
            input_key: "api_token".to_string(),
            storage_key: "api_token".to_string(),
            hash,
        }
    }

    async fn provider_with_token(stored: &str) -> (Arc<TestProvider>, TestUser) {
        let provider = Arc::new(TestProvider::new());
        let mut user = provider.add_user("ada@example.com", "secret123").await;
        user.api_token = Some(stored.to_string());
        provider.update(user.clone()).await;
        (provider, user)
    }

    #[tokio::test]
    async fn test_resolves_from_bearer_token() {
        let (provider, user) = provider_with_token("plain-token").await;
        let source = Arc::new(StaticTokenSource::new().with_bearer("plain-token"));
        let mut guard: TokenGuard<TestUser> = TokenGuard::new("api", provider, source, &config(false));

        assert_eq!(guard.id().await.unwrap(), Some(user.id));
    }

    #[tokio::test]
    async fn test_input_takes_precedence_over_bearer() {
        let (provider, user) = provider_with_token("from-input").await;
        let source = Arc::new(
            StaticTokenSource::new()
                .with_input("api_token", "from-input")
                .with_bearer("from-header"),
        );
        let mut guard: TokenGuard<TestUser> = TokenGuard::new("api", provider, source, &config(false));

        assert_eq!(guard.id().await.unwrap(), Some(user.id));
    }

    #[tokio::test]
    async fn test_hashed_storage() {
        let (provider, user) = provider_with_token(&sha256_hex("secret-token")).await;
        let source = Arc::new(StaticTokenSource::new().with_bearer("secret-token"));
        let mut guard: TokenGuard<TestUser> = TokenGuard::new("api", provider.clone(), source, &config(true));
        assert_eq!(guard.id().await.unwrap(), Some(user.id));

        let raw = Arc::new(StaticTokenSource::new().with_bearer(sha256_hex("secret-token")));
        let mut guard: TokenGuard<TestUser> = TokenGuard::new("api", provider, raw, &config(true));
        assert!(guard.guest().await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_token_is_guest() {
        let (provider, _) = provider_with_token("tok").await;
        let mut guard: TokenGuard<TestUser> = TokenGuard::new(
            "api",
            provider,
            Arc::new(StaticTokenSource::new()),
            &config(false),
        );
        assert!(guard.user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_request_resets_memo() {
        let (provider, user) = provider_with_token("tok").await;
        let mut guard: TokenGuard<TestUser> = TokenGuard::new(
            "api",
            provider,
            Arc::new(StaticTokenSource::new()),
            &config(false),
        );
        assert!(guard.guest().await.unwrap());

        guard.set_request(Arc::new(StaticTokenSource::new().with_bearer("tok")));
        assert_eq!(guard.id().await.unwrap(), Some(user.id));
    }

    #[tokio::test]
    async fn test_validate() {
        let (provider, _) = provider_with_token("tok").await;
        let mut guard: TokenGuard<TestUser> = TokenGuard::new(
            "api",
            provider,
            Arc::new(StaticTokenSource::new()),
            &config(false),
        );

        assert!(guard.validate(&Credentials::new().with("api_token", "tok")).await.unwrap());
        assert!(!guard.validate(&Credentials::new().with("api_token", "nope")).await.unwrap());
        assert!(!guard.validate(&Credentials::new()).await.unwrap());
        assert!(!guard.has_user());
    }
}
