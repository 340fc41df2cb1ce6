//! Argon2id hashing and verification.

use crate::errors::{AppResult, CryptoError};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use tracing::debug;

/// Hashes a password with a fresh random salt.
///
/// # Errors
///
/// Returns `CryptoError::HashingFailed` if the hasher rejects its input.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CryptoError::HashingFailed(e.to_string()))?;
    Ok(hash.to_string())
}

/// Checks a plaintext password against a stored PHC hash.
///
/// Returns `Ok(false)` on mismatch.
///
/// # Errors
///
/// Returns `CryptoError::MalformedHash` if `stored_hash` is not a valid PHC
/// string (including the empty hash of an unlocked journal).
pub fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|e| CryptoError::MalformedHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => {
            debug!("Password verification failed with non-mismatch error: {}", e);
            Err(CryptoError::MalformedHash(e.to_string()).into())
        }
    }
}
