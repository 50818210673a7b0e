//! Time-based one-time passwords (RFC 6238) and recovery codes.

pub mod base32;
pub mod provider;
pub mod recovery;

pub use self::base32::Base32Error;
pub use self::provider::TotpProvider;
pub use self::recovery::RecoveryCodes;
