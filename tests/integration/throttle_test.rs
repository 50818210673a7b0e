//! Integration tests for rate limiting and login lockouts.

use warden::auth::throttle::LoginOutcome;
use warden::auth::{Guard, LoginThrottle, RateLimiter};
use warden::core::events::AuthEvent;

use crate::helpers::{TestApp, credentials};

fn limiter(app: &TestApp) -> RateLimiter {
    RateLimiter::new(app.cache.clone(), app.shared_clock())
}

#[tokio::test]
async fn test_window_locks_then_resets_after_decay() {
    let app = TestApp::new();
    let limiter = limiter(&app);

    for expected in 1..=3 {
        assert_eq!(limiter.hit("send-sms", 10).await.unwrap(), expected);
    }
    assert!(limiter.too_many_attempts("send-sms", 3).await.unwrap());
    assert_eq!(limiter.available_in("send-sms").await.unwrap(), 10);
    assert_eq!(limiter.remaining("send-sms", 3).await.unwrap(), 0);

    app.clock.advance_secs(4);
    assert!(limiter.too_many_attempts("send-sms", 3).await.unwrap());
    assert_eq!(limiter.available_in("send-sms").await.unwrap(), 6);

    app.clock.advance_secs(6);
    assert!(!limiter.too_many_attempts("send-sms", 3).await.unwrap());
    assert_eq!(limiter.hit("send-sms", 10).await.unwrap(), 1);
}

#[tokio::test]
async fn test_keys_are_independent() {
    let app = TestApp::new();
    let limiter = limiter(&app);

    limiter.hit("a", 60).await.unwrap();
    limiter.hit("a", 60).await.unwrap();
    limiter.hit("b", 60).await.unwrap();

    assert_eq!(limiter.attempts("a").await.unwrap(), 2);
    assert_eq!(limiter.attempts("b").await.unwrap(), 1);

    limiter.clear("a").await.unwrap();
    assert_eq!(limiter.attempts("a").await.unwrap(), 0);
    assert_eq!(limiter.available_in("a").await.unwrap(), 0);
    assert_eq!(limiter.attempts("b").await.unwrap(), 1);
}

#[tokio::test]
async fn test_attempt_runs_work_until_limited() {
    let app = TestApp::new();
    let limiter = limiter(&app);

    let first = limiter.attempt("export", 1, 30, async { "done" }).await.unwrap();
    assert_eq!(first, Some("done"));

    let second = limiter.attempt("export", 1, 30, async { "done" }).await.unwrap();
    assert_eq!(second, None);
}

#[tokio::test]
async fn test_login_lockout_and_recovery() {
    let mut config = TestApp::new().config;
    config.throttle.max_attempts = 3;
    config.throttle.decay_seconds = 60;
    let app = TestApp::with_config(config);
    app.accounts.create("ada@example.com", "secret123").await;

    let throttle = LoginThrottle::new(limiter(&app), app.config.throttle.clone())
        .with_events(app.events.clone());
    let mut events = app.events.subscribe();

    for _ in 0..3 {
        let mut ctx = app.request();
        let outcome = throttle
            .attempt(&mut ctx.guard, &credentials("ada@example.com", "wrong"), false, "email", "10.0.0.1")
            .await
            .unwrap();
        assert_eq!(outcome, LoginOutcome::Failed);
    }

    let mut ctx = app.request();
    let outcome = throttle
        .attempt(&mut ctx.guard, &credentials("ADA@example.com ", "secret123"), false, "email", "10.0.0.1")
        .await
        .unwrap();
    assert_eq!(outcome, LoginOutcome::LockedOut { retry_after: 60 });
    assert!(!ctx.guard.check().await.unwrap());

    let mut lockouts = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event.payload, AuthEvent::Lockout { .. }) {
            lockouts += 1;
        }
    }
    assert_eq!(lockouts, 1);

    let mut elsewhere = app.request();
    let outcome = throttle
        .attempt(&mut elsewhere.guard, &credentials("ada@example.com", "secret123"), false, "email", "10.0.0.2")
        .await
        .unwrap();
    assert_eq!(outcome, LoginOutcome::Authenticated);

    app.clock.advance_secs(60);
    let mut later = app.request();
    let outcome = throttle
        .attempt(&mut later.guard, &credentials("ada@example.com", "secret123"), false, "email", "10.0.0.1")
        .await
        .unwrap();
    assert_eq!(outcome, LoginOutcome::Authenticated);
    assert_eq!(throttle.available_in("ada@example.com", "10.0.0.1").await.unwrap(), 0);
}
