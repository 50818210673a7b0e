//! Integration tests for the session and token guards.

use std::sync::Arc;

use chrono::Duration;

use warden::auth::crypto::sha256_hex;
use warden::auth::flows::{ChallengeOutcome, TwoFactorCode};
use warden::auth::transport::{MemoryCookieJar, StaticTokenSource};
use warden::auth::{Guard, TokenGuard, TotpProvider, TwoFactorChallenge};
use warden::core::ErrorKind;
use warden::core::events::AuthEvent;
use warden::core::traits::{SessionStore, UserProvider};
use warden::core::types::Credentials;

use crate::helpers::{Account, TestApp, credentials};

#[tokio::test]
async fn test_attempt_login_check_and_fresh_context_failure() {
    let app = TestApp::new();
    let account = app.accounts.create("ada@example.com", "secret123").await;
    assert_eq!(account.id, 1);

    let mut ctx = app.request();
    let by_id = Credentials::new().with("id", "1").with("password", "secret123");
    assert!(ctx.guard.attempt(&by_id, false).await.unwrap());
    assert!(ctx.guard.check().await.unwrap());
    assert_eq!(ctx.guard.user().await.unwrap().unwrap().id, 1);
    assert_eq!(ctx.guard.id().await.unwrap(), Some(1));

    let mut fresh = app.request();
    let wrong = Credentials::new().with("id", "1").with("password", "wrong");
    assert!(!fresh.guard.attempt(&wrong, false).await.unwrap());
    assert!(fresh.guard.guest().await.unwrap());
}

#[tokio::test]
async fn test_unknown_identity_and_wrong_password_look_the_same() {
    let app = TestApp::new();
    app.accounts.create("ada@example.com", "secret123").await;
    let mut events = app.events.subscribe();

    let mut ctx = app.request();
    assert!(!ctx.guard.attempt(&credentials("nobody@example.com", "secret123"), false).await.unwrap());
    assert!(!ctx.guard.attempt(&credentials("ada@example.com", "nope"), false).await.unwrap());

    let mut failures = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event.payload, AuthEvent::Failed { .. }) {
            failures += 1;
        }
    }
    assert_eq!(failures, 2);
}

#[tokio::test]
async fn test_login_regenerates_session_id() {
    let app = TestApp::new();
    app.accounts.create("ada@example.com", "secret123").await;

    let mut ctx = app.request();
    let before = ctx.session.id();
    assert!(ctx.guard.attempt(&credentials("ada@example.com", "secret123"), false).await.unwrap());
    let after_login = ctx.session.id();
    assert_ne!(before, after_login);

    ctx.guard.logout().await.unwrap();
    assert_ne!(after_login, ctx.session.id());
}

#[tokio::test]
async fn test_session_carries_identity_to_next_request() {
    let app = TestApp::new();
    app.accounts.create("ada@example.com", "secret123").await;

    let mut first = app.request();
    assert!(first.guard.attempt(&credentials("ada@example.com", "secret123"), false).await.unwrap());
    let stored = first.session.get("auth_id").await.unwrap();
    assert_eq!(stored.as_deref(), Some("1"));

    let second = app.request();
    second.session.put("auth_id", "1").await.unwrap();
    let mut guard = second.guard;
    assert_eq!(guard.user().await.unwrap().map(|a| a.id), Some(1));
}

#[tokio::test]
async fn test_remember_token_rotation_and_logout_invalidation() {
    let app = TestApp::new();
    let account = app.accounts.create("ada@example.com", "secret123").await;

    let mut ctx = app.request();
    ctx.guard.login(account.clone(), true).await.unwrap();
    let first = app.accounts.find(1).await.remember_token.unwrap();
    assert_eq!(first.len(), 64);

    let mut again = app.request();
    again.guard.login(account, true).await.unwrap();
    let second = app.accounts.find(1).await.remember_token.unwrap();
    assert_ne!(first, second);

    again.guard.logout().await.unwrap();
    let found = app.accounts.retrieve_by_token(&1, &second).await.unwrap();
    assert!(found.is_none());
    assert!(!again.guard.check().await.unwrap());
}

#[tokio::test]
async fn test_remember_cookie_attributes() {
    let app = TestApp::new();
    app.accounts.create("ada@example.com", "secret123").await;

    let mut ctx = app.request();
    assert!(ctx.guard.attempt(&credentials("ada@example.com", "secret123"), true).await.unwrap());

    let cookie = ctx.cookies.queued_cookie("remember_web").unwrap();
    let token = app.accounts.find(1).await.remember_token.unwrap();
    assert_eq!(cookie.value, format!("1|{token}"));
    assert!(cookie.secure);
    assert!(cookie.http_only);
    assert_eq!(cookie.path, "/");
    assert_eq!(cookie.max_age, Some(Duration::minutes(525_600)));
    assert!(cookie.to_header_value().contains("SameSite=Lax"));
}

#[tokio::test]
async fn test_recaller_authenticates_and_rotates() {
    let app = TestApp::new();
    let account = app.accounts.create("ada@example.com", "secret123").await;

    let mut first = app.request();
    first.guard.login(account, true).await.unwrap();
    let cookie = first.cookies.queued_cookie("remember_web").unwrap();

    let mut returning =
        app.request_with_cookies(MemoryCookieJar::new().with_cookie("remember_web", cookie.value.clone()));
    let user = returning.guard.user().await.unwrap().unwrap();
    assert_eq!(user.id, 1);
    assert!(returning.guard.via_remember());

    let rotated = returning.cookies.queued_cookie("remember_web").unwrap();
    assert_ne!(rotated.value, cookie.value);

    let mut replay =
        app.request_with_cookies(MemoryCookieJar::new().with_cookie("remember_web", cookie.value));
    assert!(replay.guard.user().await.unwrap().is_none());
    assert!(replay.cookies.queued_cookie("remember_web").unwrap().is_expired());
}

#[tokio::test]
async fn test_logout_is_sticky_within_context() {
    let app = TestApp::new();
    app.accounts.create("ada@example.com", "secret123").await;

    let mut ctx = app.request();
    assert!(ctx.guard.attempt(&credentials("ada@example.com", "secret123"), false).await.unwrap());
    ctx.guard.logout().await.unwrap();

    ctx.session.put("auth_id", "1").await.unwrap();
    assert!(ctx.guard.user().await.unwrap().is_none());
}

#[tokio::test]
async fn test_token_guard_resolves_hashed_api_token() {
    let mut config = warden::AppConfig::default();
    config.hashing.bcrypt.rounds = 4;
    if let Some(api) = config.auth.guards.get_mut("api") {
        api.hash = true;
    }
    let app = TestApp::with_config(config);

    let mut account = app.accounts.create("ada@example.com", "secret123").await;
    account.api_token = Some(sha256_hex("plain-token"));
    app.accounts.save(account).await;

    let source = Arc::new(StaticTokenSource::new().with_bearer("plain-token"));
    let mut guard: TokenGuard<Account> = app.manager.token_guard(Some("api"), source).unwrap();
    assert_eq!(guard.user().await.unwrap().map(|a| a.id), Some(1));

    let wrong = Arc::new(StaticTokenSource::new().with_bearer("other"));
    let mut guard: TokenGuard<Account> = app.manager.token_guard(Some("api"), wrong).unwrap();
    assert!(!guard.check().await.unwrap());
}

#[tokio::test]
async fn test_unknown_guard_is_configuration_error() {
    let app = TestApp::new();
    let ctx = app.request();
    let err = app
        .manager
        .session_guard(Some("admin"), ctx.session.clone(), ctx.cookies.clone())
        .err()
        .expect("guard should not resolve");
    assert_eq!(err.kind, ErrorKind::Configuration);
}

#[tokio::test]
async fn test_password_confirmation_expires() {
    let app = TestApp::new();
    app.accounts.create("ada@example.com", "secret123").await;
    let confirmation = app.manager.password_confirmation(app.shared_clock());

    let mut ctx = app.request();
    assert!(ctx.guard.attempt(&credentials("ada@example.com", "secret123"), false).await.unwrap());

    assert!(!confirmation.confirm(&mut ctx.guard, "wrong").await.unwrap());
    assert!(confirmation.confirm(&mut ctx.guard, "secret123").await.unwrap());
    assert!(confirmation.is_recently_confirmed(&*ctx.session).await.unwrap());

    app.clock.advance_secs(app.config.auth.password_timeout_seconds as i64 + 1);
    assert!(!confirmation.is_recently_confirmed(&*ctx.session).await.unwrap());
}

#[tokio::test]
async fn test_two_factor_login_with_totp_then_recovery_code() {
    let app = TestApp::new();
    let totp = TotpProvider::new(app.config.totp.clone(), app.shared_clock());

    let mut account = app.accounts.create("ada@example.com", "secret123").await;
    let secret = totp.generate_secret();
    account.two_factor_secret = Some(secret.clone());
    account.recovery_codes = totp.generate_recovery_codes();
    app.accounts.save(account.clone()).await;

    let challenge = TwoFactorChallenge::new(
        TotpProvider::new(app.config.totp.clone(), app.shared_clock()),
        app.accounts.clone(),
    );

    let mut ctx = app.request();
    let outcome = challenge
        .begin(&mut ctx.guard, &credentials("ada@example.com", "secret123"), false)
        .await
        .unwrap();
    assert_eq!(outcome, ChallengeOutcome::ChallengeRequired);
    assert!(!ctx.guard.check().await.unwrap());

    let code = totp.current_code(&secret).unwrap();
    assert!(challenge.complete(&mut ctx.guard, TwoFactorCode::Totp(&code)).await.unwrap());
    assert_eq!(ctx.guard.id().await.unwrap(), Some(1));

    let mut other = app.request();
    challenge
        .begin(&mut other.guard, &credentials("ada@example.com", "secret123"), false)
        .await
        .unwrap();
    let recovery = account.recovery_codes[0].clone();
    assert!(challenge.complete(&mut other.guard, TwoFactorCode::Recovery(&recovery)).await.unwrap());
    assert!(!app.accounts.find(1).await.recovery_codes.contains(&recovery));
}
