//! Guards resolve "who is the current principal" for one request context.
//!
//! A guard instance is per-request state: it memoizes the resolved
//! principal, so it is driven through `&mut self` and never shared.

pub mod recaller;
pub mod session_guard;
pub mod token_guard;

use async_trait::async_trait;

use warden_core::AppResult;
use warden_core::traits::{IdOf, Principal};
use warden_core::types::Credentials;

pub use self::recaller::Recaller;
pub use self::session_guard::SessionGuard;
pub use self::token_guard::TokenGuard;

/// Resolution state of a guard's principal.
#[derive(Debug, Clone)]
pub enum GuardState<U> {
    /// Not looked up yet.
    Unresolved,
    /// A principal was resolved or set.
    Authenticated(U),
    /// Lookup ran and found nobody.
    Anonymous,
}

impl<U> GuardState<U> {
    /// The resolved principal, if any.
    pub fn user(&self) -> Option<&U> {
        match self {
            GuardState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// Common guard surface.
#[async_trait]
pub trait Guard: Send {
    /// The principal type.
    type User: Principal;

    /// Configured guard name.
    fn name(&self) -> &str;

    /// The current principal, resolving it on first use.
    async fn user(&mut self) -> AppResult<Option<Self::User>>;

    /// Validate credentials without changing any state.
    async fn validate(&mut self, credentials: &Credentials) -> AppResult<bool>;

    /// True once a principal has been resolved or set.
    fn has_user(&self) -> bool;

    /// Sets the current principal for this context only.
    fn set_user(&mut self, user: Self::User);

    /// True when a principal is authenticated.
    async fn check(&mut self) -> AppResult<bool> {
        Ok(self.user().await?.is_some())
    }

    /// True when no principal is authenticated.
    async fn guest(&mut self) -> AppResult<bool> {
        Ok(!self.check().await?)
    }

    /// Identifier of the current principal.
    async fn id(&mut self) -> AppResult<Option<IdOf<Self::User>>> {
        Ok(self.user().await?.map(|user| user.identifier()))
    }
}
