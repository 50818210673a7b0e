//! Single-use two-factor recovery codes.

use crate::crypto::{constant_time_eq, random_hex};

/// Recovery code helpers. Codes are 8 lowercase hex characters.
#[derive(Debug, Clone, Copy)]
pub struct RecoveryCodes;

impl RecoveryCodes {
    /// `count` fresh codes.
    pub fn generate(count: usize) -> Vec<String> {
        (0..count).map(|_| Self::generate_one()).collect()
    }

    /// One fresh code.
    pub fn generate_one() -> String {
        random_hex(4)
    }

    /// Index of `presented` within `codes`. Every code is compared so the
    /// position of a match does not affect timing.
    pub fn position(codes: &[String], presented: &str) -> Option<usize> {
        let presented = presented.trim().to_ascii_lowercase();
        let mut found = None;
        for (i, code) in codes.iter().enumerate() {
            if constant_time_eq(code.as_bytes(), presented.as_bytes()) && found.is_none() {
                found = Some(i);
            }
        }
        found
    }
}
