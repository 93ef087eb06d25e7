use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::RngCore;
use tracing::warn;

use crate::shared::AppError;

const SALT_LEN: usize = 16;

/// Hashes a password with Argon2id and a fresh random salt, returning the PHC string
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let mut salt_bytes = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| {
        warn!(error = %e, "Failed to encode password salt");
        AppError::Internal
    })?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            warn!(error = %e, "Password hashing failed");
            AppError::Internal
        })
}

/// Checks a password against a stored PHC string. A wrong password is `Ok(false)`;
/// only a corrupt stored hash is an error.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| {
        warn!(error = %e, "Stored password hash is malformed");
        AppError::Internal
    })?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => {
            warn!(error = %e, "Password verification failed");
            Err(AppError::Internal)
        }
    }
}
