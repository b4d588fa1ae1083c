//! Security utilities for session tokens and password hashing.

use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use rand::Rng;
use rand::distr::Alphanumeric;
use sha2::{Digest, Sha256};

const TOKEN_PREFIX: &str = "rt_";

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generates a new bearer token for a login session.
pub fn generate_token() -> String {
    format!("{}{}", TOKEN_PREFIX, random_alphanumeric(32))
}

/// Hashes a session token using SHA-256. Only the hash is persisted.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Hashes a password with Argon2id and a fresh random salt.
///
/// Returns the PHC string (`$argon2id$v=19$...`), which carries the salt and
/// parameters needed to verify it later.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verifies a password against a stored PHC hash.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_format() {
        let token = generate_token();
        assert!(token.starts_with("rt_"));
        assert_eq!(token.len(), 35);
        assert_ne!(token, generate_token());
    }

    #[test]
    fn test_token_hashing() {
        let hash = hash_token("rt_abc123");

        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_token("rt_abc123"));
        assert_ne!(hash, hash_token("rt_abc124"));
    }

    #[test]
    fn test_password_roundtrip() {
        let stored = hash_password("correct-horse").unwrap();

        assert!(stored.starts_with("$argon2id$"));
        assert!(verify_password("correct-horse", &stored));
        assert!(!verify_password("wrong-horse", &stored));
    }

    #[test]
    fn test_password_salted() {
        assert_ne!(
            hash_password("same").unwrap(),
            hash_password("same").unwrap()
        );
    }

    #[test]
    fn test_malformed_stored_hash() {
        assert!(!verify_password("anything", "no-separator"));
    }
}
