//! Password hashing and session tokens.
//!
//! Passwords are stored as `salt$digest` with a per-user random salt and a
//! SHA-256 digest over salt followed by the password bytes. Session tokens
//! are 32 random bytes hex-encoded, issued at login and deleted at logout
//! or expiry.

use sha2::{Digest, Sha256};

/// Sessions live this long before the server refuses the token.
pub const SESSION_TTL_DAYS: i64 = 30;

const SALT_LEN: usize = 16;

#[must_use]
pub fn hash_password(password: &str) -> String {
    use rand::Rng;
    let salt: [u8; SALT_LEN] = rand::rng().random();
    let salt_hex = to_hex(&salt);
    format!("{salt_hex}${}", digest_hex(&salt, password))
}

/// Check a password against a stored `salt$digest` string. Malformed
/// stored values simply fail the check.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, expected)) = stored.split_once('$') else {
        return false;
    };
    let Some(salt) = from_hex(salt_hex) else {
        return false;
    };
    // Compare without short-circuiting on the first differing byte.
    let actual = digest_hex(&salt, password);
    if actual.len() != expected.len() {
        return false;
    }
    actual
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Generate a fresh session token: 32 random bytes, hex-encoded.
#[must_use]
pub fn generate_token() -> String {
    use rand::Rng;
    let bytes: [u8; 32] = rand::rng().random();
    to_hex(&bytes)
}

fn digest_hex(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    to_hex(&hasher.finalize())
}

fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(
        String::with_capacity(bytes.len() * 2),
        |mut acc: String, b| {
            let _ = write!(acc, "{b:02x}");
            acc
        },
    )
}

fn from_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let stored = hash_password("hunter22");
        assert!(verify_password("hunter22", &stored));
        assert!(!verify_password("hunter23", &stored));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same-password");
        let b = hash_password("same-password");
        assert_ne!(a, b);
        assert!(verify_password("same-password", &a));
        assert!(verify_password("same-password", &b));
    }

    #[test]
    fn test_stored_format() {
        let stored = hash_password("pw");
        let (salt, digest) = stored.split_once('$').unwrap();
        assert_eq!(salt.len(), 32); // 16 bytes hex
        assert_eq!(digest.len(), 64); // sha256 hex
    }

    #[test]
    fn test_verify_rejects_malformed_stored_value() {
        assert!(!verify_password("pw", "no-dollar-sign"));
        assert!(!verify_password("pw", "nothex$abcdef"));
        assert!(!verify_password("pw", "$"));
    }

    #[test]
    fn test_generate_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }
}
