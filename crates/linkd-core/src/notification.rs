//! Notifications raised when someone likes or comments on your post.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error,
  user::{Id, User},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationType {
  Like,
  Comment,
}

impl NotificationType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Like => "LIKE",
      Self::Comment => "COMMENT",
    }
  }

  /// The verb phrase used when rendering, e.g. "liked".
  pub fn verb(self) -> &'static str {
    match self {
      Self::Like => "liked",
      Self::Comment => "commented on",
    }
  }
}

impl fmt::Display for NotificationType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for NotificationType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "LIKE" => Ok(Self::Like),
      "COMMENT" => Ok(Self::Comment),
      other => Err(Error::UnknownNotificationType(other.to_owned())),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
  pub id:            Id,
  pub actor:         User,
  pub recipient:     User,
  #[serde(rename = "type")]
  pub kind:          NotificationType,
  pub read:          bool,
  /// The post the notification points at.
  pub resource_id:   Id,
  pub creation_date: DateTime<Utc>,
}

impl Notification {
  /// `"<actor> liked your post."`
  pub fn summary(&self) -> String {
    format!("{} {} your post.", self.actor.display_name(), self.kind.verb())
  }
}

/// Input to [`SocialStore::create_notification`](crate::store::SocialStore::create_notification).
#[derive(Debug, Clone, Copy)]
pub struct NewNotification {
  pub actor_id:     Id,
  pub recipient_id: Id,
  pub kind:         NotificationType,
  pub resource_id:  Id,
}
