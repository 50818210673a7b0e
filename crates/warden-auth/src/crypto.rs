//! Randomness, digests, and constant-time comparison shared by the engine.

use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

/// `len` bytes from the operating system CSPRNG.
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    OsRng.fill_bytes(&mut buf);
    buf
}

/// `len` random bytes, hex encoded (`2 * len` characters).
pub fn random_hex(len: usize) -> String {
    hex::encode(random_bytes(len))
}

/// Hex-encoded SHA-256 digest of `value`.
pub fn sha256_hex(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

/// Compares two byte strings without short-circuiting on the first
/// mismatching byte.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
