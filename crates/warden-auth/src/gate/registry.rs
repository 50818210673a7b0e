//! Ability, policy, and hook registrations.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::arguments::{Arguments, SubjectType};
use super::policy::{AbilityFn, Policy};
use super::response::{IntoDecision, Response};

pub(crate) type BeforeFn<U> =
    Arc<dyn Fn(Option<&U>, &str, &Arguments<'_>) -> Option<Response> + Send + Sync>;

pub(crate) type AfterFn<U> = Arc<
    dyn Fn(Option<&U>, &str, &Arguments<'_>, Option<&Response>) -> Option<Response> + Send + Sync,
>;

pub(crate) struct PolicyEntry<U> {
    pub(crate) subject: SubjectType,
    pub(crate) policy: Arc<dyn Policy<U>>,
}

/// Everything the gate consults. Built at startup, then shared read-only
/// by every [`Gate`](super::Gate) derived from it.
pub struct GateRegistry<U> {
    pub(crate) abilities: HashMap<String, AbilityFn<U>>,
    pub(crate) policies: HashMap<TypeId, PolicyEntry<U>>,
    pub(crate) before: Vec<BeforeFn<U>>,
    pub(crate) after: Vec<AfterFn<U>>,
}

impl<U: Send + Sync + 'static> GateRegistry<U> {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            abilities: HashMap::new(),
            policies: HashMap::new(),
            before: Vec::new(),
            after: Vec::new(),
        }
    }

    /// Defines (or replaces) an ability callback.
    pub fn define<F, R>(&mut self, ability: impl Into<String>, callback: F) -> &mut Self
    where
        F: Fn(Option<&U>, &Arguments<'_>) -> R + Send + Sync + 'static,
        R: IntoDecision,
    {
        let ability = ability.into();
        debug!(ability = %ability, "Ability defined");
        self.abilities.insert(
            ability,
            Arc::new(move |user: Option<&U>, arguments: &Arguments<'_>| {
                callback(user, arguments).into_decision()
            }),
        );
        self
    }

    /// Registers the policy for subject type `T`.
    pub fn policy<T: Any, P: Policy<U>>(&mut self, policy: P) -> &mut Self {
        let subject = SubjectType::of::<T>();
        debug!(subject = subject.name(), "Policy registered");
        self.policies.insert(
            subject.id(),
            PolicyEntry {
                subject,
                policy: Arc::new(policy),
            },
        );
        self
    }

    /// Adds a hook that runs before every check.
    pub fn before<F, R>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(Option<&U>, &str, &Arguments<'_>) -> R + Send + Sync + 'static,
        R: IntoDecision,
    {
        self.before.push(Arc::new(
            move |user: Option<&U>, ability: &str, arguments: &Arguments<'_>| {
                hook(user, ability, arguments).into_decision()
            },
        ));
        self
    }

    /// Adds a hook that runs after every check and may override it.
    pub fn after<F, R>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(Option<&U>, &str, &Arguments<'_>, Option<&Response>) -> R + Send + Sync + 'static,
        R: IntoDecision,
    {
        self.after.push(Arc::new(
            move |user: Option<&U>,
                  ability: &str,
                  arguments: &Arguments<'_>,
                  current: Option<&Response>| {
                hook(user, ability, arguments, current).into_decision()
            },
        ));
        self
    }

    /// True when an ability callback named `ability` exists.
    pub fn has(&self, ability: &str) -> bool {
        self.abilities.contains_key(ability)
    }

    /// Names of all defined abilities, sorted.
    pub fn abilities(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.abilities.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The policy registered for subject type `T`.
    pub fn policy_for<T: Any>(&self) -> Option<Arc<dyn Policy<U>>> {
        self.policy_for_type(TypeId::of::<T>())
    }

    pub(crate) fn policy_for_type(&self, id: TypeId) -> Option<Arc<dyn Policy<U>>> {
        self.policies.get(&id).map(|entry| entry.policy.clone())
    }
}

impl<U: Send + Sync + 'static> Default for GateRegistry<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> fmt::Debug for GateRegistry<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut abilities: Vec<&String> = self.abilities.keys().collect();
        abilities.sort_unstable();
        f.debug_struct("GateRegistry")
            .field("abilities", &abilities)
            .field(
                "policies",
                &self.policies.values().map(|e| e.subject).collect::<Vec<_>>(),
            )
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .finish()
    }
}
