//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error leaves the server as `{"message": "..."}`.

use axum::{
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use linkd_core::{
  store::{Entity, StoreError, StoreErrorKind},
  wire::MessageBody,
};
use thiserror::Error;

/// Sent in place of the real message for any 5xx; the detail goes to the log.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  BadRequest(String),

  #[error("Unauthorized")]
  Unauthorized,

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("internal error: {0}")]
  Internal(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Wrap a backend error; used as `.map_err(ApiError::store)`.
  ///
  /// Conflicts and misses the store reports become 409 / 404, so a request
  /// that loses a race with another gets the same answer as one that was
  /// rejected up front.
  pub fn store<E: StoreError>(e: E) -> Self {
    match e.kind() {
      StoreErrorKind::EmailTaken => Self::Conflict("Email is already registered.".into()),
      StoreErrorKind::NotFound(entity) => Self::NotFound(not_found_message(entity).into()),
      StoreErrorKind::Other => Self::Store(Box::new(e)),
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Internal(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

fn not_found_message(entity: Entity) -> &'static str {
  match entity {
    Entity::User => "User not found",
    Entity::Post => "Post not found",
    Entity::Comment => "Comment not found",
    Entity::Notification => "Notification not found",
  }
}

impl From<linkd_core::Error> for ApiError {
  fn from(e: linkd_core::Error) -> Self {
    match e {
      linkd_core::Error::EmptyContent => ApiError::BadRequest("content: Content is mandatory".into()),
      other => ApiError::Internal(other.to_string()),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    match rejection {
      JsonRejection::JsonDataError(e) => ApiError::BadRequest(e.body_text()),
      _ => ApiError::BadRequest("Required request body is missing.".into()),
    }
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { ApiError::NotFound(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = if status.is_server_error() {
      tracing::error!(error = %self, %status, "request failed");
      INTERNAL_MESSAGE.to_owned()
    } else {
      tracing::debug!(error = %self, %status, "request rejected");
      self.to_string()
    };
    (status, axum::Json(MessageBody::new(message))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn renders_message_envelope() {
    let resp = ApiError::NotFound("Post not found".into()).into_response();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: MessageBody = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.message, "Post not found");
  }

  async fn message_of(err: ApiError) -> (StatusCode, String) {
    let resp = err.into_response();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: MessageBody = serde_json::from_slice(&bytes).unwrap();
    (status, body.message)
  }

  #[tokio::test]
  async fn server_errors_hide_their_detail() {
    let (status, message) = message_of(ApiError::Internal("argon2 error: bad salt".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(message, INTERNAL_MESSAGE);

    let err = linkd_store_sqlite::Error::DateParse("garbage".into());
    let (status, message) = message_of(ApiError::store(err)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(message, INTERNAL_MESSAGE);
  }

  #[tokio::test]
  async fn store_conflicts_and_misses_keep_their_status() {
    let err = linkd_store_sqlite::Error::EmailTaken("a@example.com".into());
    let (status, message) = message_of(ApiError::store(err)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(message, "Email is already registered.");

    let err = linkd_store_sqlite::Error::PostNotFound(1);
    let (status, message) = message_of(ApiError::store(err)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(message, "Post not found");

    let err = linkd_store_sqlite::Error::NotificationNotFound(3);
    assert_eq!(ApiError::store(err).status(), StatusCode::NOT_FOUND);
  }
}
