//! Password hashing and one-time codes for email verification and password
//! reset.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use chrono::{DateTime, Duration, Utc};
use linkd_core::store::PendingCode;
use rand_core::{OsRng, RngCore};

use crate::error::ApiError;

/// Number of decimal digits in a verification or reset code.
pub const CODE_LEN: usize = 5;

/// Hash a password or code into an argon2 PHC string.
pub fn hash_secret(secret: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(secret.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}

/// Check `secret` against a PHC string. Malformed hashes never match.
pub fn verify_secret(secret: &str, hash: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(hash) else {
    return false;
  };
  Argon2::default()
    .verify_password(secret.as_bytes(), &parsed)
    .is_ok()
}

/// A fresh code of [`CODE_LEN`] random decimal digits.
pub fn generate_code() -> String {
  (0..CODE_LEN)
    .map(|_| char::from(b'0' + (OsRng.next_u32() % 10) as u8))
    .collect()
}

/// Hash `code` and stamp it with an expiry `ttl` from `now`.
pub fn pending_code(code: &str, ttl: Duration, now: DateTime<Utc>) -> Result<PendingCode, ApiError> {
  let expires_at = now
    .checked_add_signed(ttl)
    .ok_or_else(|| ApiError::Internal(format!("code lifetime {ttl} out of range")))?;
  Ok(PendingCode { hash: hash_secret(code)?, expires_at })
}

/// Outcome of presenting a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCheck {
  Valid,
  Expired,
  Invalid,
}

/// A code only counts as expired if it matched; anything else is invalid.
pub fn check_code(pending: Option<&PendingCode>, code: &str, now: DateTime<Utc>) -> CodeCheck {
  match pending {
    Some(p) if verify_secret(code, &p.hash) => {
      if p.expires_at < now {
        CodeCheck::Expired
      } else {
        CodeCheck::Valid
      }
    }
    _ => CodeCheck::Invalid,
  }
}

/// Lower-cased, trimmed email used as the account key.
pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }
