//! Driver selection for password hashing.

use std::sync::Arc;

use tracing::info;

use warden_core::config::HashingConfig;
use warden_core::{AppError, AppResult};

use super::{ArgonHasher, BcryptHasher, HashAlgorithm, HashInfo, HashOptions, Hasher};

/// Holds the configured default hasher plus every named driver.
#[derive(Debug, Clone)]
pub struct HashManager {
    default: Arc<dyn Hasher>,
    config: HashingConfig,
}

impl HashManager {
    /// Builds the manager for `config.driver` (`bcrypt`, `argon`, `argon2id`).
    pub fn new(config: &HashingConfig) -> AppResult<Self> {
        let default = Self::build(&config.driver, config)?;
        info!(driver = %config.driver, "Password hasher initialized");

        Ok(Self {
            default,
            config: config.clone(),
        })
    }

    fn build(driver: &str, config: &HashingConfig) -> AppResult<Arc<dyn Hasher>> {
        let hasher: Arc<dyn Hasher> = match driver {
            "bcrypt" => Arc::new(BcryptHasher::new(&config.bcrypt)?),
            "argon" => Arc::new(ArgonHasher::argon2i(&config.argon)?),
            "argon2id" => Arc::new(ArgonHasher::argon2id(&config.argon)?),
            other => {
                return Err(AppError::configuration(format!(
                    "Unsupported hash driver: {other}"
                )));
            }
        };
        Ok(hasher)
    }

    /// A specific driver built from the same configuration.
    pub fn driver(&self, name: &str) -> AppResult<Arc<dyn Hasher>> {
        Self::build(name, &self.config)
    }

    /// Whether successful logins should upgrade stale hashes.
    pub fn rehash_on_login(&self) -> bool {
        self.config.rehash_on_login
    }

    /// True when `value` looks like a hash of any supported algorithm.
    pub fn is_hashed(&self, value: &str) -> bool {
        self.info(value).algorithm != HashAlgorithm::Unknown
    }
}

impl Hasher for HashManager {
    fn algorithm(&self) -> HashAlgorithm {
        self.default.algorithm()
    }

    fn make(&self, value: &str, options: &HashOptions) -> AppResult<String> {
        self.default.make(value, options)
    }

    fn check(&self, value: &str, hashed: &str) -> bool {
        self.default.check(value, hashed)
    }

    fn needs_rehash(&self, hashed: &str, options: &HashOptions) -> bool {
        self.default.needs_rehash(hashed, options)
    }

    fn info(&self, hashed: &str) -> HashInfo {
        self.default.info(hashed)
    }
}
