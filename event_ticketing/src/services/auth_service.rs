// event_ticketing/src/services/auth_service.rs

//! Password hashing, verification and the signup password policy.

use crate::errors::AppError;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use tracing::{debug, error, instrument};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Requires at least `MIN_PASSWORD_LEN` characters with a digit, a lower-case
/// and an upper-case letter.
pub fn check_password_policy(password: &str) -> Result<(), AppError> {
  let mut problems = Vec::new();
  if password.chars().count() < MIN_PASSWORD_LEN {
    problems.push(format!("be at least {} characters long", MIN_PASSWORD_LEN));
  }
  if !password.chars().any(|c| c.is_ascii_digit()) {
    problems.push("contain a digit".to_string());
  }
  if !password.chars().any(char::is_lowercase) {
    problems.push("contain a lower-case letter".to_string());
  }
  if !password.chars().any(char::is_uppercase) {
    problems.push("contain an upper-case letter".to_string());
  }
  if problems.is_empty() {
    Ok(())
  } else {
    Err(AppError::Validation(format!("Password must {}.", problems.join(", "))))
  }
}

#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  match Argon2::default().hash_password(password.as_bytes(), &salt) {
    Ok(hash) => {
      debug!("Password hashed.");
      Ok(hash.to_string())
    }
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      Err(AppError::Internal(format!("Password hashing failed: {}", argon_err)))
    }
  }
}

/// `Ok(false)` on a mismatch; errors only for unusable stored hashes.
#[instrument(
  name = "auth_service::verify_password",
  skip(stored_hash, provided_password),
  err(Display),
  fields(hash_len = stored_hash.len())
)]
pub fn verify_password(stored_hash: &str, provided_password: &str) -> Result<bool, AppError> {
  if provided_password.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(stored_hash).map_err(|parse_err| {
    error!(error = %parse_err, "Stored password hash is malformed.");
    AppError::Internal(format!("Invalid stored password hash: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password mismatch.");
      Ok(false)
    }
    Err(other) => {
      error!(error = %other, "Argon2 password verification failed.");
      Err(AppError::Internal(format!("Password verification failed: {}", other)))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn policy_rejects_weak_passwords() {
    assert!(check_password_policy("Secret1").is_ok());
    for weak in ["Sec1", "secret1", "SECRET1", "Secrets"] {
      assert!(matches!(check_password_policy(weak), Err(AppError::Validation(_))), "{weak}");
    }
  }

  #[test]
  fn hash_then_verify() {
    let hash = hash_password("Secret1").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password(&hash, "Secret1").unwrap());
    assert!(!verify_password(&hash, "Secret2").unwrap());
    assert!(!verify_password(&hash, "").unwrap());
    assert!(verify_password("not-a-hash", "Secret1").is_err());
  }
}
