//! Error type for `linkd-store-sqlite`.

use linkd_core::{
  store::{Entity, StoreError, StoreErrorKind},
  user::Id,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] linkd_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("email already registered: {0}")]
  EmailTaken(String),

  #[error("user not found: {0}")]
  UserNotFound(Id),

  #[error("post not found: {0}")]
  PostNotFound(Id),

  #[error("comment not found: {0}")]
  CommentNotFound(Id),

  #[error("notification not found: {0}")]
  NotificationNotFound(Id),
}

impl StoreError for Error {
  fn kind(&self) -> StoreErrorKind {
    match self {
      Error::EmailTaken(_) => StoreErrorKind::EmailTaken,
      Error::UserNotFound(_) => StoreErrorKind::NotFound(Entity::User),
      Error::PostNotFound(_) => StoreErrorKind::NotFound(Entity::Post),
      Error::CommentNotFound(_) => StoreErrorKind::NotFound(Entity::Comment),
      Error::NotificationNotFound(_) => StoreErrorKind::NotFound(Entity::Notification),
      Error::Core(_) | Error::Database(_) | Error::DateParse(_) => StoreErrorKind::Other,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
