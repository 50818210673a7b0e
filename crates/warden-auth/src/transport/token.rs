//! Fixed request token source.

use std::collections::HashMap;

use warden_core::traits::TokenSource;

/// Request token inputs captured up front.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenSource {
    bearer: Option<String>,
    inputs: HashMap<String, String>,
}

impl StaticTokenSource {
    /// A source with nothing presented.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bearer token.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Sets a query/body input.
    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inputs.insert(key.into(), value.into());
        self
    }
}

impl TokenSource for StaticTokenSource {
    fn bearer_token(&self) -> Option<String> {
        self.bearer.clone()
    }

    fn input(&self, key: &str) -> Option<String> {
        self.inputs.get(key).cloned()
    }
}
