//! Password hashing configuration.

use serde::{Deserialize, Serialize};

/// Selects and tunes the password hashing strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashingConfig {
    /// Hashing driver: `"bcrypt"`, `"argon"`, or `"argon2id"`.
    #[serde(default = "default_driver")]
    pub driver: String,
    /// Bcrypt strategy settings.
    #[serde(default)]
    pub bcrypt: BcryptConfig,
    /// Argon2 strategy settings (shared by `argon` and `argon2id`).
    #[serde(default)]
    pub argon: ArgonConfig,
    /// Upgrade stored hashes after a successful login when parameters drift.
    #[serde(default = "default_true")]
    pub rehash_on_login: bool,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            bcrypt: BcryptConfig::default(),
            argon: ArgonConfig::default(),
            rehash_on_login: true,
        }
    }
}

/// Bcrypt cost settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BcryptConfig {
    /// Cost factor (log2 rounds). Accepted range is 4..=31.
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    /// Refuse to check hashes produced by another algorithm.
    #[serde(default = "default_true")]
    pub verify: bool,
}

impl Default for BcryptConfig {
    fn default() -> Self {
        Self {
            rounds: default_rounds(),
            verify: true,
        }
    }
}

/// Argon2 cost settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArgonConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory")]
    pub memory: u32,
    /// Time cost (iterations).
    #[serde(default = "default_time")]
    pub time: u32,
    /// Degree of parallelism.
    #[serde(default = "default_threads")]
    pub threads: u32,
    /// Refuse to check hashes produced by another algorithm.
    #[serde(default = "default_true")]
    pub verify: bool,
}

impl Default for ArgonConfig {
    fn default() -> Self {
        Self {
            memory: default_memory(),
            time: default_time(),
            threads: default_threads(),
            verify: true,
        }
    }
}

fn default_driver() -> String {
    "bcrypt".to_string()
}

fn default_rounds() -> u32 {
    10
}

fn default_memory() -> u32 {
    65536
}

fn default_time() -> u32 {
    4
}

fn default_threads() -> u32 {
    1
}

fn default_true() -> bool {
    true
}
