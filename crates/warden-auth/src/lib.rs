//! # warden-auth
//!
//! Authentication and authorization engine for Warden.
//!
//! - `hashing`: bcrypt and argon2 password hashing behind one trait
//! - `guard`: session and token guards
//! - `gate`: abilities, policies, and before/after hooks
//! - `passwords`: reset tokens and the reset broker
//! - `throttle`: cache-backed rate limiting and login lockouts
//! - `totp`: one-time passwords and recovery codes
//! - `flows`: password confirmation and two-factor login

pub mod crypto;
pub mod flows;
pub mod gate;
pub mod guard;
pub mod hashing;
pub mod manager;
pub mod password;
pub mod passwords;
pub mod throttle;
pub mod timebox;
pub mod totp;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use flows::{PasswordConfirmation, TwoFactorChallenge};
pub use gate::{AuthorizationDenied, Gate, GateRegistry, Response};
pub use guard::{Guard, SessionGuard, TokenGuard};
pub use hashing::{HashManager, Hasher};
pub use manager::AuthManager;
pub use passwords::PasswordBroker;
pub use throttle::{LoginThrottle, RateLimiter};
pub use totp::TotpProvider;
