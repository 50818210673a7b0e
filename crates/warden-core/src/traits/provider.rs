//! User provider (user store) contract.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::Credentials;

use super::principal::{IdOf, Principal, TwoFactorPrincipal};

/// Storage-backed lookup of principals.
///
/// "Not found" is `Ok(None)`. Any `Err` is a store failure and is propagated
/// by the engine untouched.
#[async_trait]
pub trait UserProvider: Send + Sync + 'static {
    /// The principal type this provider returns.
    type User: Principal;

    /// Retrieve a principal by identifier.
    async fn retrieve_by_id(&self, id: &IdOf<Self::User>) -> AppResult<Option<Self::User>>;

    /// Retrieve a principal by identifier and remember-me token.
    async fn retrieve_by_token(
        &self,
        id: &IdOf<Self::User>,
        token: &str,
    ) -> AppResult<Option<Self::User>>;

    /// Persist a new remember-me token for the principal.
    async fn update_remember_token(&self, user: &mut Self::User, token: &str) -> AppResult<()>;

    /// Retrieve a principal matching the non-password credential fields.
    async fn retrieve_by_credentials(
        &self,
        credentials: &Credentials,
    ) -> AppResult<Option<Self::User>>;

    /// Check the presented password against the principal's hash.
    async fn validate_credentials(
        &self,
        user: &Self::User,
        credentials: &Credentials,
    ) -> AppResult<bool>;

    /// Re-hash and persist the password when the hashing parameters have
    /// drifted (or unconditionally when `force` is set).
    async fn rehash_password_if_required(
        &self,
        _user: &mut Self::User,
        _credentials: &Credentials,
        _force: bool,
    ) -> AppResult<()> {
        Ok(())
    }
}

/// Persistence for consumed two-factor recovery codes.
#[async_trait]
pub trait RecoveryCodeStore<U: TwoFactorPrincipal>: Send + Sync + 'static {
    /// Swap a used recovery code for a fresh one.
    async fn replace_recovery_code(
        &self,
        user: &mut U,
        used: &str,
        replacement: &str,
    ) -> AppResult<()>;
}
