//! Error types for `linkd-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown notification type: {0:?}")]
  UnknownNotificationType(String),

  #[error("post content must not be empty")]
  EmptyContent,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
