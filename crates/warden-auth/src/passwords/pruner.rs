//! Periodic removal of expired reset tokens.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

use warden_core::AppResult;

use super::repository::TokenRepository;

/// Background sweeper for a token repository.
#[derive(Clone)]
pub struct ResetTokenPruner {
    tokens: Arc<dyn TokenRepository>,
    every: Duration,
}

impl std::fmt::Debug for ResetTokenPruner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetTokenPruner")
            .field("every", &self.every)
            .finish()
    }
}

impl ResetTokenPruner {
    /// Creates a pruner that sweeps `tokens` every `every`.
    pub fn new(tokens: Arc<dyn TokenRepository>, every: Duration) -> Self {
        Self {
            tokens,
            every: every.max(Duration::from_secs(1)),
        }
    }

    /// Time between sweeps.
    pub fn every(&self) -> Duration {
        self.every
    }

    /// Runs one sweep; returns how many tokens were removed.
    pub async fn run_once(&self) -> AppResult<u64> {
        let removed = self.tokens.delete_expired().await?;
        if removed > 0 {
            info!(removed, "Pruned expired password reset tokens");
        }
        Ok(removed)
    }

    /// Spawns the sweep loop. It stops when `shutdown` flips to `true` or
    /// its sender is dropped.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_once().await {
                            error!(error = %e, "Password reset token pruning failed");
                        }
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            info!("Password reset token pruner stopped");
                            break;
                        }
                    }
                }
            }
        })
    }
}
