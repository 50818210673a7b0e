//! The authorization gate for one principal.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::arguments::Arguments;
use super::registry::GateRegistry;
use super::response::{AuthorizationDenied, Response};

/// A shared registry bound to the principal being authorized.
///
/// `None` as the principal means a guest; callbacks decide what guests may do.
pub struct Gate<U> {
    registry: Arc<GateRegistry<U>>,
    user: Option<Arc<U>>,
}

impl<U: Send + Sync + 'static> Gate<U> {
    /// A guest gate over `registry`.
    pub fn new(registry: GateRegistry<U>) -> Self {
        Self::from_shared(Arc::new(registry))
    }

    /// A guest gate over an already shared registry.
    pub fn from_shared(registry: Arc<GateRegistry<U>>) -> Self {
        Self {
            registry,
            user: None,
        }
    }

    /// A gate over the same registry for another principal.
    pub fn for_user(&self, user: impl Into<Option<Arc<U>>>) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            user: user.into(),
        }
    }

    /// The principal this gate authorizes.
    pub fn user(&self) -> Option<&U> {
        self.user.as_deref()
    }

    /// The shared registry.
    pub fn registry(&self) -> &Arc<GateRegistry<U>> {
        &self.registry
    }

    /// True when an ability callback named `ability` exists.
    pub fn has(&self, ability: &str) -> bool {
        self.registry.has(ability)
    }

    /// Full decision for `ability`; no decision from any source is a denial.
    pub fn inspect(&self, ability: &str, arguments: &Arguments<'_>) -> Response {
        let response = self.raw(ability, arguments).unwrap_or_else(Response::deny);
        debug!(ability, allowed = response.allowed(), "Gate decision");
        response
    }

    /// The decision before the fail-closed default is applied.
    pub fn raw(&self, ability: &str, arguments: &Arguments<'_>) -> Option<Response> {
        let user = self.user();

        let mut result = self
            .registry
            .before
            .iter()
            .find_map(|hook| hook(user, ability, arguments));

        if result.is_none() {
            result = self.call_auth_callback(user, ability, arguments);
        }

        for hook in &self.registry.after {
            if let Some(replacement) = hook(user, ability, arguments, result.as_ref()) {
                result = Some(replacement);
            }
        }

        result
    }

    fn call_auth_callback(
        &self,
        user: Option<&U>,
        ability: &str,
        arguments: &Arguments<'_>,
    ) -> Option<Response> {
        if let Some(callback) = self.registry.abilities.get(ability) {
            return callback(user, arguments);
        }

        let policy = self.registry.policy_for_type(arguments.subject_type_id()?)?;
        policy
            .before(user, ability)
            .or_else(|| policy.call(ability, user, arguments))
    }

    /// True when `ability` is allowed.
    pub fn allows(&self, ability: &str, arguments: &Arguments<'_>) -> bool {
        self.inspect(ability, arguments).allowed()
    }

    /// True when `ability` is denied.
    pub fn denies(&self, ability: &str, arguments: &Arguments<'_>) -> bool {
        !self.allows(ability, arguments)
    }

    /// True when every ability is allowed.
    pub fn check(&self, abilities: &[&str], arguments: &Arguments<'_>) -> bool {
        abilities
            .iter()
            .all(|ability| self.allows(ability, arguments))
    }

    /// True when at least one ability is allowed.
    pub fn any(&self, abilities: &[&str], arguments: &Arguments<'_>) -> bool {
        abilities
            .iter()
            .any(|ability| self.allows(ability, arguments))
    }

    /// True when no ability is allowed.
    pub fn none(&self, abilities: &[&str], arguments: &Arguments<'_>) -> bool {
        !self.any(abilities, arguments)
    }

    /// The allowing response, or [`AuthorizationDenied`].
    pub fn authorize(
        &self,
        ability: &str,
        arguments: &Arguments<'_>,
    ) -> Result<Response, AuthorizationDenied> {
        self.inspect(ability, arguments).authorize()
    }
}

impl<U> Clone for Gate<U> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            user: self.user.clone(),
        }
    }
}

impl<U> fmt::Debug for Gate<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate")
            .field("registry", &self.registry)
            .field("guest", &self.user.is_none())
            .finish()
    }
}
