//! Reset tokens held in process memory.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use warden_core::AppResult;

use super::repository::{ResetTokenRecord, TokenLifetime, TokenRepository};

/// In-memory token store. Expired records stay until
/// [`delete_expired`](TokenRepository::delete_expired) sweeps them.
#[derive(Debug)]
pub struct MemoryTokenRepository {
    records: Mutex<HashMap<String, ResetTokenRecord>>,
    lifetime: TokenLifetime,
}

impl MemoryTokenRepository {
    /// An empty store.
    pub fn new(lifetime: TokenLifetime) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            lifetime,
        }
    }

    /// Number of stored records, expired ones included.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// True when nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

fn key(email: &str) -> String {
    email.to_lowercase()
}

#[async_trait]
impl TokenRepository for MemoryTokenRepository {
    async fn create(&self, email: &str) -> AppResult<String> {
        let (token, record) = self.lifetime.issue(email);
        self.records.lock().await.insert(key(email), record);
        Ok(token)
    }

    async fn exists(&self, email: &str, token: &str) -> AppResult<bool> {
        let records = self.records.lock().await;
        Ok(records
            .get(&key(email))
            .is_some_and(|record| self.lifetime.is_valid(record, token)))
    }

    async fn recently_created(&self, email: &str) -> AppResult<bool> {
        let records = self.records.lock().await;
        Ok(records
            .get(&key(email))
            .is_some_and(|record| self.lifetime.is_recent(record)))
    }

    async fn delete(&self, email: &str) -> AppResult<()> {
        self.records.lock().await.remove(&key(email));
        Ok(())
    }

    async fn delete_expired(&self) -> AppResult<u64> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, record| !self.lifetime.is_expired(record));
        let removed = (before - records.len()) as u64;
        if removed > 0 {
            debug!(removed, "Expired password reset tokens removed");
        }
        Ok(removed)
    }
}
