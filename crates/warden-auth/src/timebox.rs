//! Minimum-duration execution for credential checks.
//!
//! A failed login returns only after a fixed minimum duration, so response
//! time does not reveal whether the identity existed or the password was
//! wrong. Successful logins may return early.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};

/// Runs work for at least a minimum duration unless it opts out.
#[derive(Debug, Clone, Copy)]
pub struct Timebox {
    minimum: Duration,
}

impl Timebox {
    /// Creates a timebox of `minimum` length.
    pub fn new(minimum: Duration) -> Self {
        Self { minimum }
    }

    /// Runs `work`. The future yields its value and whether it may return
    /// early; otherwise (and on error) the call is padded to the minimum.
    pub async fn call<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: Future<Output = Result<(T, bool), E>>,
    {
        let deadline = Instant::now() + self.minimum;
        match work.await {
            Ok((value, true)) => Ok(value),
            Ok((value, false)) => {
                sleep_until(deadline).await;
                Ok(value)
            }
            Err(e) => {
                sleep_until(deadline).await;
                Err(e)
            }
        }
    }
}

impl Default for Timebox {
    fn default() -> Self {
        Self::new(Duration::from_millis(200))
    }
}
