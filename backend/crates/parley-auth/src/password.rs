//! Argon2id password hashing.
//!
//! Hashing is deliberately slow, so both calls run on the blocking pool.

use crate::{AuthError, Result as AuthErrorResult};

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand::Rng;

const SALT_BYTES: usize = 16;

pub async fn hash_password(password: &str) -> AuthErrorResult<String> {
    let password = password.to_owned();

    tokio::task::spawn_blocking(move || {
        let mut salt = [0u8; SALT_BYTES];
        rand::rng().fill(&mut salt[..]);
        let salt = SaltString::encode_b64(&salt)
            .map_err(|e| AuthError::internal(format!("salt encoding failed: {e}")))?;

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::internal(format!("password hashing failed: {e}")))
    })
    .await
    .map_err(|e| AuthError::internal(format!("hashing task failed: {e}")))?
}

/// `false` for a wrong password or an unparseable stored hash
pub async fn verify_password(password: &str, stored_hash: &str) -> AuthErrorResult<bool> {
    let password = password.to_owned();
    let stored_hash = stored_hash.to_owned();

    tokio::task::spawn_blocking(move || {
        let Ok(parsed) = PasswordHash::new(&stored_hash) else {
            log::warn!("Stored password hash could not be parsed");
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
    .await
    .map_err(|e| AuthError::internal(format!("verification task failed: {e}")))
}
