//! Integration tests for abilities, policies, and gate hooks.

use std::sync::Arc;

use warden::auth::gate::{Arguments, Policy, PolicyMap};
use warden::auth::{Gate, GateRegistry, Guard, Response};
use warden::core::AppError;

use crate::helpers::{Account, TestApp, credentials};

#[derive(Debug)]
struct Post {
    author_id: u64,
    published: bool,
}

#[derive(Debug)]
struct Comment;

struct PostPolicy;

impl Policy<Account> for PostPolicy {
    fn call(&self, ability: &str, user: Option<&Account>, arguments: &Arguments<'_>) -> Option<Response> {
        let post = arguments.first::<Post>();
        match ability {
            "view" => Some(match (user, post) {
                (_, Some(post)) if post.published => Response::allow(),
                (Some(user), Some(post)) if post.author_id == user.id => Response::allow(),
                _ => Response::deny_as_not_found(),
            }),
            "update" => Some(match (user, post) {
                (Some(user), Some(post)) if post.author_id == user.id => Response::allow(),
                _ => Response::deny_with("You do not own this post."),
            }),
            "create" => Some(if user.is_some() {
                Response::allow()
            } else {
                Response::deny()
            }),
            _ => None,
        }
    }
}

fn registry() -> GateRegistry<Account> {
    let mut registry = GateRegistry::new();
    registry
        .define("view-dashboard", |user: Option<&Account>, _: &Arguments<'_>| user.is_some())
        .policy::<Post, _>(PostPolicy)
        .policy::<Comment, _>(
            PolicyMap::new()
                .with_before(|user: Option<&Account>, _: &str| {
                    user.filter(|u| u.email.ends_with("@moderators.test")).map(|_| true)
                })
                .method("delete", |_: Option<&Account>, _: &Arguments<'_>| false),
        )
        .before(|user: Option<&Account>, _: &str, _: &Arguments<'_>| {
            user.filter(|u| u.is_admin).map(|_| true)
        });
    registry
}

fn member(id: u64) -> Arc<Account> {
    Arc::new(Account {
        id,
        email: format!("user{id}@example.com"),
        password_hash: String::new(),
        remember_token: None,
        api_token: None,
        two_factor_secret: None,
        recovery_codes: Vec::new(),
        is_admin: false,
    })
}

#[tokio::test]
async fn test_undefined_ability_fails_closed() {
    let gate = Gate::new(registry()).for_user(member(1));
    assert!(!gate.allows("nonexistent.ability", &Arguments::none()));
    assert!(gate.denies("nonexistent.ability", &Arguments::none()));
}

#[tokio::test]
async fn test_admin_before_hook_short_circuits() {
    let mut admin = (*member(1)).clone();
    admin.is_admin = true;
    let gate = Gate::new(registry()).for_user(Arc::new(admin));

    assert!(gate.allows("nonexistent.ability", &Arguments::none()));
    let foreign = Post {
        author_id: 99,
        published: false,
    };
    assert!(gate.allows("update", &Arguments::subject(&foreign)));
}

#[tokio::test]
async fn test_policy_resolved_by_subject_type() {
    let gate = Gate::new(registry());
    let author = gate.for_user(member(7));
    let stranger = gate.for_user(member(8));
    let draft = Post {
        author_id: 7,
        published: false,
    };

    assert!(author.allows("update", &Arguments::subject(&draft)));
    assert!(stranger.denies("update", &Arguments::subject(&draft)));

    let denied = stranger.inspect("view", &Arguments::subject(&draft));
    assert_eq!(denied.status(), Some(404));

    assert!(author.allows("create", &Arguments::of_type::<Post>()));
    assert!(gate.denies("create", &Arguments::of_type::<Post>()));
}

#[tokio::test]
async fn test_policy_before_capability() {
    let gate = Gate::new(registry());
    let mut moderator = (*member(3)).clone();
    moderator.email = "mod@moderators.test".to_string();

    let comment = Comment;
    assert!(gate.for_user(Arc::new(moderator)).allows("delete", &Arguments::subject(&comment)));
    assert!(gate.for_user(member(4)).denies("delete", &Arguments::subject(&comment)));
}

#[tokio::test]
async fn test_authorize_carries_message_and_status() {
    let gate = Gate::new(registry()).for_user(member(8));
    let post = Post {
        author_id: 7,
        published: true,
    };

    let denied = gate.authorize("update", &Arguments::subject(&post)).unwrap_err();
    assert_eq!(denied.message(), "You do not own this post.");
    assert_eq!(denied.status(), 403);

    let generic = gate.authorize("nonexistent.ability", &Arguments::none()).unwrap_err();
    assert_eq!(generic.message(), "This action is unauthorized.");

    let err: AppError = generic.into();
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn test_after_hook_overrides_decision() {
    let mut registry = registry();
    registry.after(
        |user: Option<&Account>, ability: &str, _: &Arguments<'_>, _: Option<&Response>| {
            (ability == "view-dashboard" && user.is_some_and(|u| u.id == 13)).then_some(false)
        },
    );
    let gate = Gate::new(registry);

    assert!(gate.for_user(member(1)).allows("view-dashboard", &Arguments::none()));
    assert!(gate.for_user(member(13)).denies("view-dashboard", &Arguments::none()));
}

#[tokio::test]
async fn test_gate_bound_to_authenticated_user() {
    let app = TestApp::new();
    app.accounts.create("ada@example.com", "secret123").await;

    let mut ctx = app.request();
    assert!(ctx.guard.attempt(&credentials("ada@example.com", "secret123"), false).await.unwrap());
    let user = ctx.guard.user().await.unwrap().map(Arc::new);

    let gate = Gate::new(registry());
    assert!(gate.for_user(user).allows("view-dashboard", &Arguments::none()));
    assert!(gate.denies("view-dashboard", &Arguments::none()));
    assert!(!gate.check(&["view-dashboard"], &Arguments::none()));
}
