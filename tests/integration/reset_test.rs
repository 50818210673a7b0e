//! Integration tests for the password reset flow.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;

use warden::auth::passwords::{ResetLinkStatus, ResetStatus, TokenRepository};
use warden::auth::{Guard, PasswordBroker};
use warden::core::config::TokenStoreKind;
use warden::core::traits::ResetNotifier;
use warden::core::types::Credentials;
use warden::core::{AppError, AppResult};

use crate::helpers::{Account, TestApp, credentials};

/// Notifier that keeps every token it was asked to deliver.
#[derive(Default)]
struct Outbox {
    sent: Mutex<Vec<(String, String)>>,
}

impl Outbox {
    fn last_token(&self) -> String {
        self.sent
            .lock()
            .unwrap()
            .last()
            .map(|(_, token)| token.clone())
            .expect("No reset link sent")
    }

    fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl ResetNotifier for Outbox {
    async fn send_reset_link(&self, email: &str, token: &str) -> AppResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), token.to_string()));
        Ok(())
    }
}

struct Fixture {
    app: TestApp,
    outbox: Arc<Outbox>,
    tokens: Arc<dyn TokenRepository>,
    broker: PasswordBroker<Account>,
}

fn fixture(app: TestApp) -> Fixture {
    let outbox = Arc::new(Outbox::default());
    let tokens = app.manager.reset_tokens(app.cache.clone(), app.shared_clock());
    let broker = app
        .manager
        .password_broker(tokens.clone(), outbox.clone())
        .expect("Failed to build broker");
    Fixture {
        app,
        outbox,
        tokens,
        broker,
    }
}

fn reset_credentials(email: &str, token: &str, password: &str) -> Credentials {
    credentials(email, password)
        .with("token", token)
        .with("password_confirmation", password)
}

async fn apply_password(fx: &Fixture, credentials: &Credentials) -> ResetStatus {
    let accounts = fx.app.accounts.clone();
    fx.broker
        .reset(credentials, |account, password| async move {
            accounts.set_password(account.id, &password).await;
            Ok::<_, AppError>(())
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn test_reset_token_is_single_use() {
    let fx = fixture(TestApp::new());
    fx.app.accounts.create("ada@example.com", "old-password").await;

    let status = fx.broker.send_reset_link(&Credentials::new().with("email", "ada@example.com")).await.unwrap();
    assert_eq!(status, ResetLinkStatus::LinkSent);
    let token = fx.outbox.last_token();

    let request = reset_credentials("ada@example.com", &token, "new-password");
    assert_eq!(apply_password(&fx, &request).await, ResetStatus::PasswordReset);
    assert_eq!(apply_password(&fx, &request).await, ResetStatus::InvalidToken);

    let mut ctx = fx.app.request();
    assert!(ctx.guard.attempt(&credentials("ada@example.com", "new-password"), false).await.unwrap());
    assert!(ctx.guard.check().await.unwrap());
}

#[tokio::test]
async fn test_unknown_email_and_bad_token() {
    let fx = fixture(TestApp::new());
    fx.app.accounts.create("ada@example.com", "old-password").await;

    let status = fx.broker.send_reset_link(&Credentials::new().with("email", "nobody@example.com")).await.unwrap();
    assert_eq!(status, ResetLinkStatus::InvalidUser);
    assert_eq!(fx.outbox.count(), 0);

    let request = reset_credentials("ada@example.com", "forged", "new-password");
    assert_eq!(apply_password(&fx, &request).await, ResetStatus::InvalidToken);

    assert!(fx.app.accounts.has_password(1, "old-password").await);
}

#[tokio::test]
async fn test_link_requests_are_throttled() {
    let fx = fixture(TestApp::new());
    fx.app.accounts.create("ada@example.com", "old-password").await;
    let lookup = Credentials::new().with("email", "ada@example.com");

    assert_eq!(fx.broker.send_reset_link(&lookup).await.unwrap(), ResetLinkStatus::LinkSent);
    assert_eq!(fx.broker.send_reset_link(&lookup).await.unwrap(), ResetLinkStatus::Throttled);

    fx.app.clock.advance_secs(61);
    assert_eq!(fx.broker.send_reset_link(&lookup).await.unwrap(), ResetLinkStatus::LinkSent);
    assert_eq!(fx.outbox.count(), 2);
}

#[tokio::test]
async fn test_newer_token_replaces_older_one() {
    let fx = fixture(TestApp::new());
    fx.app.accounts.create("ada@example.com", "old-password").await;
    let lookup = Credentials::new().with("email", "ada@example.com");

    fx.broker.send_reset_link(&lookup).await.unwrap();
    let first = fx.outbox.last_token();
    fx.app.clock.advance_secs(61);
    fx.broker.send_reset_link(&lookup).await.unwrap();

    let request = reset_credentials("ada@example.com", &first, "new-password");
    assert_eq!(apply_password(&fx, &request).await, ResetStatus::InvalidToken);
}

#[tokio::test]
async fn test_token_expires_after_configured_minutes() {
    let fx = fixture(TestApp::new());
    fx.app.accounts.create("ada@example.com", "old-password").await;

    fx.broker.send_reset_link(&Credentials::new().with("email", "ada@example.com")).await.unwrap();
    let token = fx.outbox.last_token();

    fx.app.clock.advance_secs(61 * 60);
    let request = reset_credentials("ada@example.com", &token, "new-password");
    assert_eq!(apply_password(&fx, &request).await, ResetStatus::InvalidToken);
}

#[tokio::test]
async fn test_weak_password_rejected_when_policy_enabled() {
    let mut app = TestApp::new();
    app.config.passwords.policy.enabled = true;
    let app = TestApp::with_config(app.config);
    let fx = fixture(app);
    fx.app.accounts.create("ada@example.com", "old-password").await;

    fx.broker.send_reset_link(&Credentials::new().with("email", "ada@example.com")).await.unwrap();
    let token = fx.outbox.last_token();

    let weak = reset_credentials("ada@example.com", &token, "password");
    assert!(matches!(apply_password(&fx, &weak).await, ResetStatus::InvalidPassword(_)));

    let strong = reset_credentials("ada@example.com", &token, "plum-Vortex-88-quietly-Glass");
    assert_eq!(apply_password(&fx, &strong).await, ResetStatus::PasswordReset);
}

#[tokio::test]
async fn test_memory_store_pruner_sweeps_expired_tokens() {
    let mut config = TestApp::new().config;
    config.passwords.store = TokenStoreKind::Memory;
    let fx = fixture(TestApp::with_config(config));
    fx.app.accounts.create("ada@example.com", "old-password").await;

    fx.broker.send_reset_link(&Credentials::new().with("email", "ada@example.com")).await.unwrap();
    fx.app.clock.advance_secs(61 * 60);

    let pruner = fx.app.manager.reset_token_pruner(fx.tokens.clone());
    assert_eq!(pruner.run_once().await.unwrap(), 1);
    assert_eq!(fx.broker.delete_expired().await.unwrap(), 0);

    let (shutdown, rx) = watch::channel(false);
    let handle = pruner.spawn(rx);
    shutdown.send(true).unwrap();
    handle.await.unwrap();
}
