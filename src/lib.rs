//! # Warden
//!
//! Guard/provider authentication and ability/policy authorization.
//!
//! This crate bundles the workspace members behind one dependency:
//!
//! - [`core`]: collaborator traits, configuration, events, errors
//! - [`cache`]: in-memory and Redis cache providers
//! - [`auth`]: hashing, guards, the gate, password resets, throttling, TOTP
//!
//! Hosts call [`telemetry::init_logging`] once at startup.

pub mod telemetry;

pub use warden_auth as auth;
pub use warden_cache as cache;
pub use warden_core as core;

pub use warden_auth::{
    AuthManager, Gate, GateRegistry, Guard, HashManager, Hasher, LoginThrottle, PasswordBroker,
    PasswordConfirmation, RateLimiter, Response, SessionGuard, TokenGuard, TotpProvider,
    TwoFactorChallenge,
};
pub use warden_core::config::AppConfig;
pub use warden_core::{AppError, AppResult, ErrorKind};
