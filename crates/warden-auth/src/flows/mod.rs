//! Multi-step ceremonies built on the session guard.

pub mod confirmation;
pub mod two_factor;

pub use self::confirmation::PasswordConfirmation;
pub use self::two_factor::{ChallengeOutcome, TwoFactorChallenge, TwoFactorCode};
