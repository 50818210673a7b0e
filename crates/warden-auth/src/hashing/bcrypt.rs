//! Bcrypt password hashing.

use tracing::warn;

use warden_core::config::BcryptConfig;
use warden_core::{AppError, AppResult};

use super::{HashAlgorithm, HashOptions, Hasher, identify};

const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

/// Bcrypt hasher with a configured default cost.
#[derive(Debug, Clone)]
pub struct BcryptHasher {
    rounds: u32,
    verify_algorithm: bool,
}

impl BcryptHasher {
    /// Creates a hasher from configuration, rejecting out-of-range costs.
    pub fn new(config: &BcryptConfig) -> AppResult<Self> {
        validate_cost(config.rounds)?;
        Ok(Self {
            rounds: config.rounds,
            verify_algorithm: config.verify,
        })
    }

    /// Default cost factor.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }
}

impl Hasher for BcryptHasher {
    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Bcrypt
    }

    fn make(&self, value: &str, options: &HashOptions) -> AppResult<String> {
        let rounds = options.rounds.unwrap_or(self.rounds);
        validate_cost(rounds)?;

        bcrypt::hash(value, rounds)
            .map_err(|e| AppError::hashing(format!("Bcrypt hashing failed: {e}")))
    }

    fn check(&self, value: &str, hashed: &str) -> bool {
        if hashed.is_empty() {
            return false;
        }

        if self.verify_algorithm && identify(hashed).algorithm != HashAlgorithm::Bcrypt {
            warn!("Refusing to verify a non-bcrypt hash with the bcrypt hasher");
            return false;
        }

        bcrypt::verify(value, hashed).unwrap_or(false)
    }

    fn needs_rehash(&self, hashed: &str, options: &HashOptions) -> bool {
        let rounds = options.rounds.unwrap_or(self.rounds);
        cost_of(hashed) != Some(rounds)
    }
}

fn validate_cost(rounds: u32) -> AppResult<()> {
    if !(MIN_COST..=MAX_COST).contains(&rounds) {
        return Err(AppError::invalid_parameter(format!(
            "Bcrypt cost must be between {MIN_COST} and {MAX_COST}, got {rounds}"
        )));
    }
    Ok(())
}

/// Cost factor of a modular-crypt bcrypt hash (`$2y$10$...`).
pub(crate) fn cost_of(hashed: &str) -> Option<u32> {
    let mut parts = hashed.split('$');
    if !parts.next()?.is_empty() {
        return None;
    }
    if !matches!(parts.next()?, "2a" | "2b" | "2x" | "2y") {
        return None;
    }
    let cost = parts.next()?;
    let body = parts.next()?;
    if cost.len() != 2 || body.len() != 53 {
        return None;
    }
    cost.parse().ok()
}
