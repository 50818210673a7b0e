//! Argon2i / Argon2id password hashing.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use tracing::warn;

use warden_core::config::ArgonConfig;
use warden_core::{AppError, AppResult};

use super::{HashAlgorithm, HashInfo, HashOptions, Hasher};

/// Argon2 hasher for one variant with configured cost parameters.
#[derive(Debug, Clone)]
pub struct ArgonHasher {
    variant: Algorithm,
    memory: u32,
    time: u32,
    threads: u32,
    verify_algorithm: bool,
}

impl ArgonHasher {
    /// Argon2i hasher (driver `argon`).
    pub fn argon2i(config: &ArgonConfig) -> AppResult<Self> {
        Self::new(Algorithm::Argon2i, config)
    }

    /// Argon2id hasher (driver `argon2id`).
    pub fn argon2id(config: &ArgonConfig) -> AppResult<Self> {
        Self::new(Algorithm::Argon2id, config)
    }

    fn new(variant: Algorithm, config: &ArgonConfig) -> AppResult<Self> {
        params(config.memory, config.time, config.threads)?;
        Ok(Self {
            variant,
            memory: config.memory,
            time: config.time,
            threads: config.threads,
            verify_algorithm: config.verify,
        })
    }

    fn effective(&self, options: &HashOptions) -> (u32, u32, u32) {
        (
            options.memory.unwrap_or(self.memory),
            options.time.unwrap_or(self.time),
            options.threads.unwrap_or(self.threads),
        )
    }
}

impl Hasher for ArgonHasher {
    fn algorithm(&self) -> HashAlgorithm {
        variant_algorithm(self.variant)
    }

    fn make(&self, value: &str, options: &HashOptions) -> AppResult<String> {
        let (memory, time, threads) = self.effective(options);
        let argon2 = Argon2::new(self.variant, Version::V0x13, params(memory, time, threads)?);
        let salt = SaltString::generate(&mut OsRng);

        let hash = argon2
            .hash_password(value.as_bytes(), &salt)
            .map_err(|e| AppError::hashing(format!("Argon2 hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    fn check(&self, value: &str, hashed: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hashed) else {
            return false;
        };

        if self.verify_algorithm && parsed.algorithm.as_str() != self.variant.as_str() {
            warn!(
                expected = self.variant.as_str(),
                found = parsed.algorithm.as_str(),
                "Refusing to verify a hash of a different algorithm"
            );
            return false;
        }

        // Cost parameters and variant are taken from the parsed hash.
        Argon2::default()
            .verify_password(value.as_bytes(), &parsed)
            .is_ok()
    }

    fn needs_rehash(&self, hashed: &str, options: &HashOptions) -> bool {
        let Some(info) = info_of(hashed) else {
            return true;
        };
        if info.algorithm != self.algorithm() {
            return true;
        }

        let (memory, time, threads) = self.effective(options);
        info.options != HashOptions::argon(memory, time, threads)
    }
}

fn params(memory: u32, time: u32, threads: u32) -> AppResult<Params> {
    Params::new(memory, time, threads, None)
        .map_err(|e| AppError::invalid_parameter(format!("Invalid Argon2 parameters: {e}")))
}

fn variant_algorithm(variant: Algorithm) -> HashAlgorithm {
    match variant {
        Algorithm::Argon2i => HashAlgorithm::Argon2i,
        Algorithm::Argon2id => HashAlgorithm::Argon2id,
        _ => HashAlgorithm::Unknown,
    }
}

/// Variant and cost parameters of a PHC-format argon2 hash.
pub(crate) fn info_of(hashed: &str) -> Option<HashInfo> {
    let parsed = PasswordHash::new(hashed).ok()?;
    let variant = Algorithm::new(parsed.algorithm.as_str()).ok()?;
    let params = Params::try_from(&parsed).ok()?;

    Some(HashInfo {
        algorithm: variant_algorithm(variant),
        options: HashOptions::argon(params.m_cost(), params.t_cost(), params.p_cost()),
    })
}
