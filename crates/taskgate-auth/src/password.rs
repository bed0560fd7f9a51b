//! Password hashing
//!
//! Digests are Argon2id PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`),
//! so the salt and cost parameters travel with the digest and verification
//! needs nothing else.

use argon2::password_hash::{
    rand_core::OsRng, Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier,
    SaltString,
};
use argon2::Argon2;

use crate::error::AuthError;

/// Hash a password with a freshly generated random salt
pub fn hash_password(plaintext: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Verify a password against a stored digest
///
/// Returns `Ok(false)` on mismatch. The digest comparison is constant-time.
/// A digest that is not a parseable PHC string yields `AuthError::HashFormat`.
pub fn verify_password(plaintext: &str, digest: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(digest).map_err(|e| AuthError::HashFormat(e.to_string()))?;

    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(e) => Err(AuthError::HashFormat(e.to_string())),
    }
}
