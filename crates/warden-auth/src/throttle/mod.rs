//! Attempt counting and lockouts.

pub mod login;
pub mod rate_limiter;

pub use self::login::{LoginOutcome, LoginThrottle};
pub use self::rate_limiter::RateLimiter;
