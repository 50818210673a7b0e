//! Password hashing strategies.
//!
//! Every strategy implements [`Hasher`]; [`HashManager`] selects the
//! configured one and is what the rest of the engine holds.

pub mod argon;
pub mod bcrypt;
pub mod manager;

use std::fmt;

use warden_core::AppResult;

pub use self::argon::ArgonHasher;
pub use self::bcrypt::BcryptHasher;
pub use self::manager::HashManager;

/// Algorithm family of a stored hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// `$2y$` / `$2b$` / `$2a$` bcrypt hashes.
    Bcrypt,
    /// `$argon2i$` hashes.
    Argon2i,
    /// `$argon2id$` hashes.
    Argon2id,
    /// Anything else, including plaintext.
    Unknown,
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Bcrypt => write!(f, "bcrypt"),
            HashAlgorithm::Argon2i => write!(f, "argon2i"),
            HashAlgorithm::Argon2id => write!(f, "argon2id"),
            HashAlgorithm::Unknown => write!(f, "unknown"),
        }
    }
}

/// Per-call cost overrides. Unset fields fall back to the hasher's
/// configured values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HashOptions {
    /// Bcrypt cost factor.
    pub rounds: Option<u32>,
    /// Argon2 memory cost in KiB.
    pub memory: Option<u32>,
    /// Argon2 iterations.
    pub time: Option<u32>,
    /// Argon2 parallelism.
    pub threads: Option<u32>,
}

impl HashOptions {
    /// Bcrypt cost override.
    pub fn rounds(rounds: u32) -> Self {
        Self {
            rounds: Some(rounds),
            ..Self::default()
        }
    }

    /// Argon2 cost override.
    pub fn argon(memory: u32, time: u32, threads: u32) -> Self {
        Self {
            memory: Some(memory),
            time: Some(time),
            threads: Some(threads),
            ..Self::default()
        }
    }
}

/// Algorithm and cost parameters recovered from a stored hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashInfo {
    /// Detected algorithm.
    pub algorithm: HashAlgorithm,
    /// Cost parameters encoded in the hash.
    pub options: HashOptions,
}

/// A one-way password hashing strategy.
pub trait Hasher: Send + Sync + fmt::Debug + 'static {
    /// Algorithm produced by [`make`](Self::make).
    fn algorithm(&self) -> HashAlgorithm;

    /// Hash `value` with a fresh random salt.
    fn make(&self, value: &str, options: &HashOptions) -> AppResult<String>;

    /// Verify `value` against `hashed`. Empty or malformed hashes never match.
    fn check(&self, value: &str, hashed: &str) -> bool;

    /// True when `hashed` was produced with another algorithm or different
    /// cost parameters than the effective ones.
    fn needs_rehash(&self, hashed: &str, options: &HashOptions) -> bool;

    /// Inspect a stored hash.
    fn info(&self, hashed: &str) -> HashInfo {
        identify(hashed)
    }
}

/// Detects the algorithm and parameters of a stored hash.
pub fn identify(hashed: &str) -> HashInfo {
    if let Some(rounds) = bcrypt::cost_of(hashed) {
        return HashInfo {
            algorithm: HashAlgorithm::Bcrypt,
            options: HashOptions::rounds(rounds),
        };
    }
    if let Some(info) = argon::info_of(hashed) {
        return info;
    }
    HashInfo {
        algorithm: HashAlgorithm::Unknown,
        options: HashOptions::default(),
    }
}
