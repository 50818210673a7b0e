//! The authenticatable principal contract.

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

/// Identifier type of a principal.
pub type IdOf<U> = <U as Principal>::Id;

/// An identity the engine can authenticate.
///
/// The engine never persists principals itself; every mutation it needs
/// (remember tokens, rehashed passwords) goes through the
/// [`UserProvider`](crate::traits::UserProvider) that owns storage.
pub trait Principal: Clone + Send + Sync + 'static {
    /// Unique identifier. Must round-trip through `Display`/`FromStr`
    /// because it is stored in the session and the remember cookie.
    type Id: Clone + Eq + Hash + fmt::Display + FromStr + Send + Sync + 'static;

    /// The principal's identifier.
    fn identifier(&self) -> Self::Id;

    /// Stored password hash, `None` when the principal cannot password-auth.
    fn password_hash(&self) -> Option<&str>;

    /// Current remember-me token, if any.
    fn remember_token(&self) -> Option<&str>;

    /// Replaces the in-memory remember-me token.
    fn set_remember_token(&mut self, token: String);
}

/// A principal that can receive password reset links.
pub trait CanResetPassword: Principal {
    /// Address the reset token is delivered to and keyed by.
    fn email_for_password_reset(&self) -> String;
}

/// A principal that may have two-factor authentication enrolled.
pub trait TwoFactorPrincipal: Principal {
    /// Base32 TOTP secret, `None` when two-factor is not enrolled.
    fn two_factor_secret(&self) -> Option<&str>;

    /// Unused recovery codes.
    fn recovery_codes(&self) -> &[String];

    /// Whether a login must pass the two-factor challenge.
    fn has_two_factor_enabled(&self) -> bool {
        self.two_factor_secret().is_some()
    }
}
