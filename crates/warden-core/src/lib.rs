//! # warden-core
//!
//! Core crate for Warden. Contains the collaborator traits the
//! authentication engine consumes (user providers, cache, session and
//! cookie transport, notifications), configuration schemas, the clock
//! abstraction, authentication events, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Warden crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
