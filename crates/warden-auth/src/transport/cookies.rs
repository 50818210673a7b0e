//! Cookie jar held in process memory.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use warden_core::traits::{Cookie, CookieJar};

/// Incoming request cookies plus the cookies queued for the response.
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    incoming: HashMap<String, String>,
    queued: Mutex<Vec<Cookie>>,
}

impl MemoryCookieJar {
    /// An empty jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an incoming cookie, builder style.
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.incoming.insert(name.into(), value.into());
        self
    }

    /// Every cookie queued so far.
    pub fn queued(&self) -> Vec<Cookie> {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recently queued cookie named `name`.
    pub fn queued_cookie(&self, name: &str) -> Option<Cookie> {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .find(|c| c.name == name)
            .cloned()
    }
}

impl CookieJar for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.incoming.get(name).cloned()
    }

    fn queue(&self, cookie: Cookie) {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(cookie);
    }
}
