//! Session storage held in process memory.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use warden_core::AppResult;
use warden_core::traits::SessionStore;

use crate::crypto::random_hex;

/// One client's session.
#[derive(Debug)]
pub struct MemorySession {
    id: Mutex<String>,
    data: RwLock<HashMap<String, String>>,
}

impl MemorySession {
    /// Starts an empty session with a random identifier.
    pub fn new() -> Self {
        Self {
            id: Mutex::new(random_hex(20)),
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Snapshot of every stored key.
    pub async fn keys(&self) -> Vec<String> {
        self.data.read().await.keys().cloned().collect()
    }
}

impl Default for MemorySession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySession {
    fn id(&self) -> String {
        self.id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> AppResult<()> {
        self.data
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.data.write().await.remove(key))
    }

    async fn regenerate(&self, destroy: bool) -> AppResult<()> {
        let mut id = self.id.lock().unwrap_or_else(PoisonError::into_inner);
        *id = random_hex(20);
        debug!(destroy, "Session identifier regenerated");
        Ok(())
    }
}
