//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond
//! precision so that lexical order equals chronological order. Rows are read
//! into `Raw*` structs inside the connection thread and decoded afterwards.

use chrono::{DateTime, SecondsFormat, Utc};
use linkd_core::{
  notification::{Notification, NotificationType},
  post::{Comment, Post},
  user::{Id, User},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_opt_dt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> { s.map(decode_dt).transpose() }

// ─── Users ────────────────────────────────────────────────────────────────────

/// Number of columns produced by [`user_columns`].
pub const USER_COLUMN_COUNT: usize = 10;

/// The public user columns, qualified with `alias`.
pub fn user_columns(alias: &str) -> String {
  [
    "id",
    "email",
    "email_verified",
    "first_name",
    "last_name",
    "company",
    "position",
    "location",
    "profile_picture",
    "profile_complete",
  ]
  .iter()
  .map(|c| format!("{alias}.{c}"))
  .collect::<Vec<_>>()
  .join(", ")
}

/// Read the [`user_columns`] block starting at column `at`.
pub fn read_user(row: &rusqlite::Row<'_>, at: usize) -> rusqlite::Result<User> {
  Ok(User {
    id:               row.get(at)?,
    email:            row.get(at + 1)?,
    email_verified:   row.get(at + 2)?,
    first_name:       row.get(at + 3)?,
    last_name:        row.get(at + 4)?,
    company:          row.get(at + 5)?,
    position:         row.get(at + 6)?,
    location:         row.get(at + 7)?,
    profile_picture:  row.get(at + 8)?,
    profile_complete: row.get(at + 9)?,
  })
}

/// Account secrets as read from the `users` table.
pub struct RawAccount {
  pub user:                 User,
  pub password_hash:        String,
  pub verification_hash:    Option<String>,
  pub verification_expires: Option<String>,
  pub reset_hash:           Option<String>,
  pub reset_expires:        Option<String>,
}

// ─── Posts ────────────────────────────────────────────────────────────────────

/// `SELECT` prefix for posts joined with their author and like count.
pub fn post_select() -> String {
  format!(
    "SELECT p.id, p.content, p.picture, p.creation_date, p.updated_date,
            (SELECT COUNT(*) FROM post_likes l WHERE l.post_id = p.id),
            {}
     FROM posts p
     JOIN users u ON u.id = p.author_id",
    user_columns("u")
  )
}

pub struct RawPost {
  pub id:            Id,
  pub content:       String,
  pub picture:       Option<String>,
  pub creation_date: String,
  pub updated_date:  Option<String>,
  pub likes_count:   u32,
  pub author:        User,
}

impl RawPost {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      content:       row.get(1)?,
      picture:       row.get(2)?,
      creation_date: row.get(3)?,
      updated_date:  row.get(4)?,
      likes_count:   row.get(5)?,
      author:        read_user(row, 6)?,
    })
  }

  pub fn into_post(self, comments: Vec<Comment>) -> Result<Post> {
    Ok(Post {
      id: self.id,
      author: self.author,
      content: self.content,
      picture: self.picture,
      creation_date: decode_dt(&self.creation_date)?,
      updated_date: decode_opt_dt(self.updated_date.as_deref())?,
      comments,
      likes_count: self.likes_count,
    })
  }
}

// ─── Comments ─────────────────────────────────────────────────────────────────

pub fn comment_select() -> String {
  format!(
    "SELECT c.id, c.post_id, c.content, c.creation_date, c.updated_date, {}
     FROM comments c
     JOIN users u ON u.id = c.author_id",
    user_columns("u")
  )
}

pub struct RawComment {
  pub id:            Id,
  pub post_id:       Id,
  pub content:       String,
  pub creation_date: String,
  pub updated_date:  Option<String>,
  pub author:        User,
}

impl RawComment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      post_id:       row.get(1)?,
      content:       row.get(2)?,
      creation_date: row.get(3)?,
      updated_date:  row.get(4)?,
      author:        read_user(row, 5)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      id: self.id,
      post_id: Some(self.post_id),
      author: self.author,
      content: self.content,
      creation_date: decode_dt(&self.creation_date)?,
      updated_date: decode_opt_dt(self.updated_date.as_deref())?,
    })
  }
}

// ─── Notifications ────────────────────────────────────────────────────────────

pub fn notification_select() -> String {
  format!(
    "SELECT n.id, n.type, n.read, n.resource_id, n.creation_date, {}, {}
     FROM notifications n
     JOIN users a ON a.id = n.actor_id
     JOIN users r ON r.id = n.recipient_id",
    user_columns("a"),
    user_columns("r")
  )
}

pub struct RawNotification {
  pub id:            Id,
  pub kind:          String,
  pub read:          bool,
  pub resource_id:   Id,
  pub creation_date: String,
  pub actor:         User,
  pub recipient:     User,
}

impl RawNotification {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      kind:          row.get(1)?,
      read:          row.get(2)?,
      resource_id:   row.get(3)?,
      creation_date: row.get(4)?,
      actor:         read_user(row, 5)?,
      recipient:     read_user(row, 5 + USER_COLUMN_COUNT)?,
    })
  }

  pub fn into_notification(self) -> Result<Notification> {
    Ok(Notification {
      id:            self.id,
      actor:         self.actor,
      recipient:     self.recipient,
      kind:          self.kind.parse::<NotificationType>()?,
      read:          self.read,
      resource_id:   self.resource_id,
      creation_date: decode_dt(&self.creation_date)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn encoded_timestamps_sort_chronologically() {
    let a = DateTime::parse_from_rfc3339("2026-01-01T00:00:05.1Z").unwrap().with_timezone(&Utc);
    let b = DateTime::parse_from_rfc3339("2026-01-01T00:00:05.12Z").unwrap().with_timezone(&Utc);
    assert!(encode_dt(a) < encode_dt(b));
    assert_eq!(decode_dt(&encode_dt(b)).unwrap(), b);
  }

  #[test]
  fn user_columns_are_qualified() {
    let cols = user_columns("a");
    assert!(cols.starts_with("a.id, a.email"));
    assert_eq!(cols.split(", ").count(), USER_COLUMN_COUNT);
  }
}
