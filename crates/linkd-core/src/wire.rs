//! Request and response bodies shared by the server and the client.

use serde::{Deserialize, Serialize};

/// The envelope every error (and every plain acknowledgement) is wrapped in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
  pub message: String,
}

impl MessageBody {
  pub fn new(message: impl Into<String>) -> Self { Self { message: message.into() } }
}

/// Body of `POST /authentication/login` and `/register`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
  #[serde(default)]
  pub email:    String,
  #[serde(default)]
  pub password: String,
}

impl Credentials {
  /// Field errors in `field: message | ` form; empty when valid.
  pub fn validation_errors(&self) -> Option<String> {
    let mut out = String::new();
    if self.email.trim().is_empty() {
      out.push_str("email: Email is mandatory | ");
    }
    if self.password.trim().is_empty() {
      out.push_str("password: Password is mandatory | ");
    }
    (!out.is_empty()).then_some(out)
  }
}

/// Returned by login and register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
  pub token:   String,
  pub message: String,
}

/// `?limit=&offset=` on list endpoints.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageParams {
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

impl PageParams {
  pub const DEFAULT_LIMIT: usize = 50;
  pub const MAX_LIMIT: usize = 200;

  /// `(limit, offset)` with the default applied and the limit capped.
  pub fn resolve(self) -> (usize, usize) {
    let limit = self.limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT);
    (limit, self.offset.unwrap_or(0))
  }
}
