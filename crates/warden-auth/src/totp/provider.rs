//! TOTP secret generation, code generation, and verification.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use sha1::Sha1;
use url::form_urlencoded::byte_serialize;

use warden_core::config::TotpConfig;
use warden_core::types::Clock;
use warden_core::{AppError, AppResult};

use super::base32;
use super::recovery::RecoveryCodes;
use crate::crypto::{constant_time_eq, random_bytes};

type HmacSha1 = Hmac<Sha1>;

/// Length of generated shared secrets, in bytes (160 bits).
const SECRET_BYTES: usize = 20;

/// TOTP engine bound to a configuration and clock.
#[derive(Debug, Clone)]
pub struct TotpProvider {
    config: TotpConfig,
    clock: Arc<dyn Clock>,
}

impl TotpProvider {
    /// Creates a provider. A zero period is treated as 30 seconds.
    pub fn new(mut config: TotpConfig, clock: Arc<dyn Clock>) -> Self {
        if config.period == 0 {
            config.period = 30;
        }
        Self { config, clock }
    }

    /// Configuration in effect.
    pub fn config(&self) -> &TotpConfig {
        &self.config
    }

    /// A fresh random base32 secret.
    pub fn generate_secret(&self) -> String {
        base32::encode(&random_bytes(SECRET_BYTES))
    }

    /// Time step containing the current instant.
    pub fn current_timestep(&self) -> u64 {
        self.timestep_at(self.clock.timestamp())
    }

    fn timestep_at(&self, timestamp: i64) -> u64 {
        u64::try_from(timestamp).unwrap_or(0) / self.config.period
    }

    /// Code for the current time step.
    pub fn current_code(&self, secret: &str) -> AppResult<String> {
        self.code_at(secret, self.current_timestep())
    }

    /// Code for an explicit time step.
    pub fn code_at(&self, secret: &str, timestep: u64) -> AppResult<String> {
        let key = base32::decode(secret)
            .map_err(|e| AppError::validation(format!("Invalid TOTP secret: {e}")))?;
        hotp(&key, timestep, self.config.digits)
    }

    /// Checks `code` against the current time step and `window` steps on
    /// either side.
    pub fn verify(&self, secret: &str, code: &str) -> bool {
        self.verify_at(secret, code, self.clock.timestamp())
    }

    /// Checks `code` as if the current time were `timestamp`.
    pub fn verify_at(&self, secret: &str, code: &str, timestamp: i64) -> bool {
        if code.len() != self.config.digits as usize {
            return false;
        }
        let Ok(key) = base32::decode(secret) else {
            return false;
        };

        let current = self.timestep_at(timestamp);
        let window = self.config.window;
        let first = current.saturating_sub(window);
        let last = current.saturating_add(window);

        (first..=last).any(|step| {
            hotp(&key, step, self.config.digits)
                .is_ok_and(|expected| constant_time_eq(expected.as_bytes(), code.as_bytes()))
        })
    }

    /// `otpauth://` provisioning URI for authenticator apps.
    pub fn provisioning_uri(&self, account: &str, secret: &str) -> String {
        self.provisioning_uri_for(&self.config.issuer, account, secret)
    }

    /// Provisioning URI with an explicit issuer.
    pub fn provisioning_uri_for(&self, issuer: &str, account: &str, secret: &str) -> String {
        let issuer = encode_component(issuer);
        format!(
            "otpauth://totp/{issuer}:{account}?secret={secret}&issuer={issuer}&algorithm=SHA1&digits={digits}&period={period}",
            account = encode_component(account),
            digits = self.config.digits,
            period = self.config.period,
        )
    }

    /// The configured number of fresh recovery codes.
    pub fn generate_recovery_codes(&self) -> Vec<String> {
        RecoveryCodes::generate(self.config.recovery_codes)
    }
}

/// HOTP value (RFC 4226) for `counter`, zero-padded to `digits`.
fn hotp(key: &[u8], counter: u64, digits: u32) -> AppResult<String> {
    let mut mac = HmacSha1::new_from_slice(key)
        .map_err(|e| AppError::internal(format!("HMAC key rejected: {e}")))?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let binary = (u32::from(digest[offset] & 0x7f) << 24)
        | (u32::from(digest[offset + 1]) << 16)
        | (u32::from(digest[offset + 2]) << 8)
        | u32::from(digest[offset + 3]);

    let modulus = 10u64.pow(digits.min(10));
    let value = u64::from(binary) % modulus;
    Ok(format!("{value:0width$}", width = digits as usize))
}

fn encode_component(value: &str) -> String {
    byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
