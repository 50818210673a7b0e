//! Per-subject-type policies.

use std::collections::HashMap;
use std::sync::Arc;

use super::arguments::Arguments;
use super::response::{IntoDecision, Response};

pub(crate) type AbilityFn<U> =
    Arc<dyn Fn(Option<&U>, &Arguments<'_>) -> Option<Response> + Send + Sync>;

type PolicyBeforeFn<U> = Arc<dyn Fn(Option<&U>, &str) -> Option<Response> + Send + Sync>;

/// Authorization rules for one subject type.
pub trait Policy<U>: Send + Sync + 'static {
    /// Runs ahead of every method; a decision here short-circuits.
    fn before(&self, _user: Option<&U>, _ability: &str) -> Option<Response> {
        None
    }

    /// Evaluates `ability`. `None` when the policy has no such method or
    /// no opinion.
    fn call(&self, ability: &str, user: Option<&U>, arguments: &Arguments<'_>) -> Option<Response>;
}

/// A policy assembled from closures, one per ability.
pub struct PolicyMap<U> {
    before: Option<PolicyBeforeFn<U>>,
    methods: HashMap<String, AbilityFn<U>>,
}

impl<U: Send + Sync + 'static> PolicyMap<U> {
    /// An empty policy.
    pub fn new() -> Self {
        Self {
            before: None,
            methods: HashMap::new(),
        }
    }

    /// Sets the policy-level `before` hook.
    pub fn with_before<F, R>(mut self, hook: F) -> Self
    where
        F: Fn(Option<&U>, &str) -> R + Send + Sync + 'static,
        R: IntoDecision,
    {
        self.before = Some(Arc::new(move |user: Option<&U>, ability: &str| {
            hook(user, ability).into_decision()
        }));
        self
    }

    /// Adds the method for `ability`.
    pub fn method<F, R>(mut self, ability: impl Into<String>, method: F) -> Self
    where
        F: Fn(Option<&U>, &Arguments<'_>) -> R + Send + Sync + 'static,
        R: IntoDecision,
    {
        self.methods.insert(
            ability.into(),
            Arc::new(move |user: Option<&U>, arguments: &Arguments<'_>| {
                method(user, arguments).into_decision()
            }),
        );
        self
    }

    /// True when a method exists for `ability`.
    pub fn has_method(&self, ability: &str) -> bool {
        self.methods.contains_key(ability)
    }
}

impl<U: Send + Sync + 'static> Default for PolicyMap<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U: Send + Sync + 'static> Policy<U> for PolicyMap<U> {
    fn before(&self, user: Option<&U>, ability: &str) -> Option<Response> {
        self.before.as_ref().and_then(|hook| hook(user, ability))
    }

    fn call(&self, ability: &str, user: Option<&U>, arguments: &Arguments<'_>) -> Option<Response> {
        self.methods
            .get(ability)
            .and_then(|method| method(user, arguments))
    }
}
