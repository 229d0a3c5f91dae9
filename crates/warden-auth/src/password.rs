//! Password verification (Argon2id) and the registration-time
//! strength policy.

use argon2::{Argon2, PasswordVerifier};

use crate::error::AuthError;

/// Verify a plaintext password against an Argon2id PHC-format hash.
///
/// If `pepper` is provided it is prepended to the password before
/// verification; this must match the pepper used during hashing.
///
/// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or
/// `Err(AuthError::Crypto)` if the stored hash is malformed.
pub fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, AuthError> {
    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

    let argon2 = Argon2::default();
    match argon2.verify_password(input, &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
    }
}

/// Registration-time strength policy: minimum length plus at least one
/// letter and one digit.
pub fn validate_strength(password: &str, min_length: usize) -> bool {
    password.len() >= min_length
        && password.chars().any(|c| c.is_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}
