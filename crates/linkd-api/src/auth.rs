//! Bearer-token extractor and session token helpers.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use linkd_core::{store::SocialStore, user::User};
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::{AppState, error::ApiError};

/// A new opaque session token: 32 random bytes, base64url.
pub fn issue_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  URL_SAFE_NO_PAD.encode(bytes)
}

/// The digest under which a token is stored.
pub fn token_digest(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
  let value = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;
  let token = value
    .strip_prefix("Bearer ")
    .map(str::trim)
    .ok_or(ApiError::Unauthorized)?;
  if token.is_empty() {
    return Err(ApiError::Unauthorized);
  }
  Ok(token)
}

/// The authenticated caller. Present in a handler means the request carried a
/// known session token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl<S> FromRequestParts<AppState<S>> for AuthUser
where
  S: SocialStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let digest = token_digest(bearer_token(&parts.headers)?);
    let user = state
      .store
      .session_user(&digest)
      .await
      .map_err(ApiError::store)?
      .ok_or(ApiError::Unauthorized)?;
    Ok(AuthUser(user))
  }
}
