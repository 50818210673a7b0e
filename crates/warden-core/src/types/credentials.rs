//! Credential maps presented by callers.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the field holding the plaintext password.
pub const PASSWORD_FIELD: &str = "password";

/// A set of named credential fields, e.g. `{email, password}`.
///
/// The password field never participates in principal lookups; providers
/// match on [`without_password`](Self::without_password) and verify the
/// secret separately.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials(BTreeMap<String, String>);

impl Credentials {
    /// Creates an empty credential set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, builder style.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Sets a field.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    /// Returns a field value.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Returns the plaintext password, if presented.
    pub fn password(&self) -> Option<&str> {
        self.get(PASSWORD_FIELD)
    }

    /// Iterates over every field except the password.
    pub fn without_password(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter(|(k, _)| k.as_str() != PASSWORD_FIELD)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copy of the set with the named fields dropped.
    pub fn without(&self, fields: &[&str]) -> Self {
        self.0
            .iter()
            .filter(|(k, _)| !fields.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// True when no field other than the password was presented.
    pub fn has_only_password(&self) -> bool {
        self.without_password().next().is_none()
    }

    /// True when the set holds no fields at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Credentials {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in &self.0 {
            if k == PASSWORD_FIELD {
                map.entry(k, &"********");
            } else {
                map.entry(k, v);
            }
        }
        map.finish()
    }
}
