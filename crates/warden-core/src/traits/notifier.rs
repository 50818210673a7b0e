//! Out-of-band delivery of password reset tokens.

use async_trait::async_trait;

use crate::result::AppResult;

/// Delivers a plaintext reset token to its owner (mail, SMS, ...).
#[async_trait]
pub trait ResetNotifier: Send + Sync + 'static {
    /// Send `token` to `email`.
    async fn send_reset_link(&self, email: &str, token: &str) -> AppResult<()>;
}
