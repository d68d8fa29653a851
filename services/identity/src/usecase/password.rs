//! Password hashing and verification using argon2id.
//!
//! The `_blocking` wrappers run argon2 on tokio's blocking pool.

use anyhow::Context as _;
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::domain::types::{PASSWORD_MAX_LEN, PASSWORD_MIN_LEN};
use crate::error::IdentityServiceError;

/// Hash a password using argon2id with a random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored argon2id hash.
/// `Err` only when the stored hash cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Length policy, counted in characters.
pub fn validate_password(password: &str) -> Result<(), IdentityServiceError> {
    let len = password.chars().count();
    if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) {
        return Err(IdentityServiceError::InvalidPassword);
    }
    Ok(())
}

pub async fn hash_password_blocking(password: String) -> Result<String, IdentityServiceError> {
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("password hashing task panicked")?
        .map_err(|e| anyhow::anyhow!("hash password: {e}"))?;
    Ok(hash)
}

pub async fn verify_password_blocking(
    password: String,
    hash: String,
) -> Result<bool, argon2::password_hash::Error> {
    match tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "password verification task panicked");
            Ok(false)
        }
    }
}
