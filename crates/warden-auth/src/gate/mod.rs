//! Ability and policy based authorization.
//!
//! A [`GateRegistry`] holds ability callbacks, per-subject-type policies,
//! and before/after hooks. A [`Gate`] pairs a shared registry with the
//! principal being authorized.
//!
//! Decision order for an ability:
//!
//! 1. `before` hooks, in registration order; the first decision wins.
//! 2. Otherwise the ability callback, or the policy registered for the
//!    first argument's type (its own `before` first, then the method).
//! 3. `after` hooks always run, in order, and any decision they return
//!    replaces the current one.
//!
//! No decision at all is a denial.

pub mod arguments;
pub mod policy;
pub mod registry;
pub mod response;

#[allow(clippy::module_inception)]
mod gate;

pub use self::arguments::{Argument, Arguments, SubjectType};
pub use self::gate::Gate;
pub use self::policy::{Policy, PolicyMap};
pub use self::registry::GateRegistry;
pub use self::response::{AuthorizationDenied, DEFAULT_DENIAL_MESSAGE, IntoDecision, Response};
