use anyhow::{Context as _, anyhow};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::PortalError;

/// Hash a plaintext password with Argon2id (PHC string) on the blocking pool.
pub async fn hash_password(password: &str) -> Result<String, PortalError> {
    let password = password.to_owned();
    run_blocking(move || hash_password_blocking(&password)).await
}

/// Verify a plaintext password against a stored PHC hash on the blocking pool.
///
/// An account without a password never verifies.
pub async fn verify_password(password: &str, hash: Option<&str>) -> Result<bool, PortalError> {
    let Some(hash) = hash else {
        return Ok(false);
    };
    let (password, hash) = (password.to_owned(), hash.to_owned());
    run_blocking(move || verify_password_blocking(&password, &hash)).await
}

/// Synchronous Argon2id hash, for callers outside the async runtime.
pub fn hash_password_blocking(password: &str) -> Result<String, PortalError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PortalError::Internal(anyhow!("hash password: {e}")))
}

fn verify_password_blocking(password: &str, hash: &str) -> Result<bool, PortalError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| PortalError::Internal(anyhow!("parse password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

async fn run_blocking<T, F>(work: F) -> Result<T, PortalError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, PortalError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .context("password hashing task")?
}
