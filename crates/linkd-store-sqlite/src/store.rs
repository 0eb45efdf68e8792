//! [`SqliteStore`]: the SQLite implementation of [`SocialStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use linkd_core::{
  notification::{NewNotification, Notification},
  post::{Comment, NewPost, Post},
  store::{Account, CodeKind, PendingCode, PostQuery, SocialStore},
  user::{Id, ProfileUpdate, User},
};

use crate::{
  Error, Result,
  encode::{
    RawAccount, RawComment, RawNotification, RawPost, comment_select, decode_dt, encode_dt,
    notification_select, post_select, read_user, user_columns,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A linkd store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row loaders (run on the connection thread) ──────────────────────────────

type RawPostWithComments = (RawPost, Vec<RawComment>);

fn load_comments(conn: &rusqlite::Connection, post_id: Id) -> rusqlite::Result<Vec<RawComment>> {
  let sql = format!(
    "{} WHERE c.post_id = ?1 ORDER BY c.creation_date ASC, c.id ASC",
    comment_select()
  );
  let mut stmt = conn.prepare(&sql)?;
  stmt
    .query_map(rusqlite::params![post_id], RawComment::from_row)?
    .collect()
}

fn load_comment(conn: &rusqlite::Connection, id: Id) -> rusqlite::Result<Option<RawComment>> {
  let sql = format!("{} WHERE c.id = ?1", comment_select());
  conn
    .query_row(&sql, rusqlite::params![id], RawComment::from_row)
    .optional()
}

fn load_posts(
  conn: &rusqlite::Connection,
  sql: &str,
  params: impl rusqlite::Params,
) -> rusqlite::Result<Vec<RawPostWithComments>> {
  let mut stmt = conn.prepare(sql)?;
  let posts = stmt
    .query_map(params, RawPost::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  posts
    .into_iter()
    .map(|p| {
      let comments = load_comments(conn, p.id)?;
      Ok((p, comments))
    })
    .collect()
}

fn load_post(conn: &rusqlite::Connection, id: Id) -> rusqlite::Result<Option<RawPostWithComments>> {
  let sql = format!("{} WHERE p.id = ?1", post_select());
  Ok(load_posts(conn, &sql, rusqlite::params![id])?.into_iter().next())
}

fn load_notification(
  conn: &rusqlite::Connection,
  id: Id,
) -> rusqlite::Result<Option<RawNotification>> {
  let sql = format!("{} WHERE n.id = ?1", notification_select());
  conn
    .query_row(&sql, rusqlite::params![id], RawNotification::from_row)
    .optional()
}

fn load_user(conn: &rusqlite::Connection, id: Id) -> rusqlite::Result<Option<User>> {
  let sql = format!("SELECT {} FROM users u WHERE u.id = ?1", user_columns("u"));
  conn
    .query_row(&sql, rusqlite::params![id], |row| read_user(row, 0))
    .optional()
}

fn decode_post((raw, comments): RawPostWithComments) -> Result<Post> {
  let comments = comments
    .into_iter()
    .map(RawComment::into_comment)
    .collect::<Result<Vec<_>>>()?;
  raw.into_post(comments)
}

fn decode_pending(hash: Option<String>, expires: Option<String>) -> Result<Option<PendingCode>> {
  match (hash, expires) {
    (Some(hash), Some(expires)) => Ok(Some(PendingCode { hash, expires_at: decode_dt(&expires)? })),
    _ => Ok(None),
  }
}

// ─── SocialStore impl ────────────────────────────────────────────────────────

impl SocialStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, email: &str, password_hash: &str) -> Result<User> {
    let email_owned = email.to_owned();
    let hash = password_hash.to_owned();
    let now = encode_dt(Utc::now());

    let id: Option<Id> = self
      .conn
      .call(move |conn| {
        let taken = conn
          .query_row(
            "SELECT 1 FROM users WHERE email = ?1",
            rusqlite::params![email_owned],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if taken {
          return Ok(None);
        }
        conn.execute(
          "INSERT INTO users (email, password_hash, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![email_owned, hash, now],
        )?;
        Ok(Some(conn.last_insert_rowid()))
      })
      .await?;

    let id = id.ok_or_else(|| Error::EmailTaken(email.to_owned()))?;
    tracing::debug!(user_id = id, "created user");
    self.get_user(id).await?.ok_or(Error::UserNotFound(id))
  }

  async fn get_user(&self, id: Id) -> Result<Option<User>> {
    Ok(self.conn.call(move |conn| Ok(load_user(conn, id)?)).await?)
  }

  async fn find_account(&self, email: &str) -> Result<Option<Account>> {
    let email = email.to_owned();
    let sql = format!(
      "SELECT {}, u.password_hash,
              u.email_verification_hash, u.email_verification_expires_at,
              u.password_reset_hash, u.password_reset_expires_at
       FROM users u WHERE u.email = ?1",
      user_columns("u")
    );

    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(&sql, rusqlite::params![email], |row| {
            Ok(RawAccount {
              user:                 read_user(row, 0)?,
              password_hash:        row.get(10)?,
              verification_hash:    row.get(11)?,
              verification_expires: row.get(12)?,
              reset_hash:           row.get(13)?,
              reset_expires:        row.get(14)?,
            })
          })
          .optional()?)
      })
      .await?;

    raw
      .map(|r| {
        Ok(Account {
          user:               r.user,
          password_hash:      r.password_hash,
          email_verification: decode_pending(r.verification_hash, r.verification_expires)?,
          password_reset:     decode_pending(r.reset_hash, r.reset_expires)?,
        })
      })
      .transpose()
  }

  async fn update_profile(&self, id: Id, update: ProfileUpdate) -> Result<User> {
    let user: Option<User> = self
      .conn
      .call(move |conn| {
        let Some(mut user) = load_user(conn, id)? else {
          return Ok(None);
        };
        update.apply(&mut user);
        conn.execute(
          "UPDATE users SET first_name = ?2, last_name = ?3, company = ?4, position = ?5,
                            location = ?6, profile_picture = ?7, profile_complete = ?8
           WHERE id = ?1",
          rusqlite::params![
            id,
            user.first_name,
            user.last_name,
            user.company,
            user.position,
            user.location,
            user.profile_picture,
            user.profile_complete,
          ],
        )?;
        Ok(Some(user))
      })
      .await?;
    user.ok_or(Error::UserNotFound(id))
  }

  async fn set_password(&self, id: Id, password_hash: String) -> Result<()> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET password_hash = ?2 WHERE id = ?1",
          rusqlite::params![id, password_hash],
        )?)
      })
      .await?;
    if changed == 0 {
      return Err(Error::UserNotFound(id));
    }
    Ok(())
  }

  async fn set_code(&self, id: Id, kind: CodeKind, code: Option<PendingCode>) -> Result<()> {
    let sql = match kind {
      CodeKind::EmailVerification => {
        "UPDATE users SET email_verification_hash = ?2, email_verification_expires_at = ?3 WHERE id = ?1"
      }
      CodeKind::PasswordReset => {
        "UPDATE users SET password_reset_hash = ?2, password_reset_expires_at = ?3 WHERE id = ?1"
      }
    };
    let (hash, expires) = match code {
      Some(c) => (Some(c.hash), Some(encode_dt(c.expires_at))),
      None => (None, None),
    };

    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params![id, hash, expires])?))
      .await?;
    if changed == 0 {
      return Err(Error::UserNotFound(id));
    }
    Ok(())
  }

  async fn mark_email_verified(&self, id: Id) -> Result<()> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET email_verified = 1,
                            email_verification_hash = NULL,
                            email_verification_expires_at = NULL
           WHERE id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;
    if changed == 0 {
      return Err(Error::UserNotFound(id));
    }
    Ok(())
  }

  async fn delete_user(&self, id: Id) -> Result<()> {
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM users WHERE id = ?1", rusqlite::params![id])?))
      .await?;
    if changed == 0 {
      return Err(Error::UserNotFound(id));
    }
    tracing::debug!(user_id = id, "deleted user");
    Ok(())
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn create_session(&self, user_id: Id, token_hash: String) -> Result<()> {
    let now = encode_dt(Utc::now());
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_hash, user_id, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![token_hash, user_id, now],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn session_user(&self, token_hash: &str) -> Result<Option<User>> {
    let token_hash = token_hash.to_owned();
    let sql = format!(
      "SELECT {} FROM sessions s JOIN users u ON u.id = s.user_id WHERE s.token_hash = ?1",
      user_columns("u")
    );
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(conn
            .query_row(&sql, rusqlite::params![token_hash], |row| read_user(row, 0))
            .optional()?)
        })
        .await?,
    )
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn create_post(&self, author_id: Id, post: NewPost) -> Result<Post> {
    let post = post.normalized()?;
    let now = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO posts (author_id, content, picture, creation_date) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![author_id, post.content, post.picture, now],
        )?;
        let id = conn.last_insert_rowid();
        Ok(load_post(conn, id)?)
      })
      .await?;

    let post = raw.map(decode_post).transpose()?.ok_or(Error::UserNotFound(author_id))?;
    tracing::debug!(post_id = post.id, author_id, "created post");
    Ok(post)
  }

  async fn get_post(&self, id: Id) -> Result<Option<Post>> {
    let raw = self.conn.call(move |conn| Ok(load_post(conn, id)?)).await?;
    raw.map(decode_post).transpose()
  }

  async fn update_post(&self, id: Id, post: NewPost) -> Result<Post> {
    let post = post.normalized()?;
    let now = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE posts SET content = ?2, picture = ?3, updated_date = ?4 WHERE id = ?1",
          rusqlite::params![id, post.content, post.picture, now],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(load_post(conn, id)?)
      })
      .await?;

    raw.map(decode_post).transpose()?.ok_or(Error::PostNotFound(id))
  }

  async fn delete_post(&self, id: Id) -> Result<()> {
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM posts WHERE id = ?1", rusqlite::params![id])?))
      .await?;
    if changed == 0 {
      return Err(Error::PostNotFound(id));
    }
    Ok(())
  }

  async fn list_posts(&self, query: &PostQuery) -> Result<Vec<Post>> {
    let author = query.author;
    let exclude = query.exclude_author;
    let limit_val = query.limit.unwrap_or(50) as i64;
    let offset_val = query.offset.unwrap_or(0) as i64;

    let raws = self
      .conn
      .call(move |conn| {
        // Build WHERE clause dynamically.
        let mut conds: Vec<&'static str> = vec![];
        if author.is_some() {
          conds.push("p.author_id = ?1");
        }
        if exclude.is_some() {
          conds.push("p.author_id != ?2");
        }
        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "{} {where_clause}
           ORDER BY p.creation_date DESC, p.id DESC
           LIMIT ?3 OFFSET ?4",
          post_select()
        );
        Ok(load_posts(
          conn,
          &sql,
          rusqlite::params![author, exclude, limit_val, offset_val],
        )?)
      })
      .await?;

    raws.into_iter().map(decode_post).collect()
  }

  async fn toggle_like(&self, post_id: Id, user_id: Id) -> Result<bool> {
    let liked: Option<bool> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let exists = tx
          .query_row("SELECT 1 FROM posts WHERE id = ?1", rusqlite::params![post_id], |_| Ok(()))
          .optional()?
          .is_some();
        if !exists {
          return Ok(None);
        }
        let removed = tx.execute(
          "DELETE FROM post_likes WHERE post_id = ?1 AND user_id = ?2",
          rusqlite::params![post_id, user_id],
        )?;
        if removed == 0 {
          tx.execute(
            "INSERT INTO post_likes (post_id, user_id) VALUES (?1, ?2)",
            rusqlite::params![post_id, user_id],
          )?;
        }
        tx.commit()?;
        Ok(Some(removed == 0))
      })
      .await?;
    liked.ok_or(Error::PostNotFound(post_id))
  }

  async fn list_likes(&self, post_id: Id) -> Result<Vec<User>> {
    let sql = format!(
      "SELECT {} FROM post_likes l JOIN users u ON u.id = l.user_id
       WHERE l.post_id = ?1 ORDER BY u.id",
      user_columns("u")
    );
    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(&sql)?;
          let users = stmt
            .query_map(rusqlite::params![post_id], |row| read_user(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(users)
        })
        .await?,
    )
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn add_comment(&self, post_id: Id, author_id: Id, content: String) -> Result<Comment> {
    let now = encode_dt(Utc::now());
    let raw = self
      .conn
      .call(move |conn| {
        let exists = conn
          .query_row("SELECT 1 FROM posts WHERE id = ?1", rusqlite::params![post_id], |_| Ok(()))
          .optional()?
          .is_some();
        if !exists {
          return Ok(None);
        }
        conn.execute(
          "INSERT INTO comments (post_id, author_id, content, creation_date) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![post_id, author_id, content, now],
        )?;
        let id = conn.last_insert_rowid();
        Ok(load_comment(conn, id)?)
      })
      .await?;
    raw
      .map(RawComment::into_comment)
      .transpose()?
      .ok_or(Error::PostNotFound(post_id))
  }

  async fn get_comment(&self, id: Id) -> Result<Option<Comment>> {
    let raw = self.conn.call(move |conn| Ok(load_comment(conn, id)?)).await?;
    raw.map(RawComment::into_comment).transpose()
  }

  async fn update_comment(&self, id: Id, content: String) -> Result<Comment> {
    let now = encode_dt(Utc::now());
    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE comments SET content = ?2, updated_date = ?3 WHERE id = ?1",
          rusqlite::params![id, content, now],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(load_comment(conn, id)?)
      })
      .await?;
    raw
      .map(RawComment::into_comment)
      .transpose()?
      .ok_or(Error::CommentNotFound(id))
  }

  async fn delete_comment(&self, id: Id) -> Result<()> {
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM comments WHERE id = ?1", rusqlite::params![id])?))
      .await?;
    if changed == 0 {
      return Err(Error::CommentNotFound(id));
    }
    Ok(())
  }

  async fn list_comments(&self, post_id: Id) -> Result<Vec<Comment>> {
    let raws = self.conn.call(move |conn| Ok(load_comments(conn, post_id)?)).await?;
    raws.into_iter().map(RawComment::into_comment).collect()
  }

  // ── Notifications ─────────────────────────────────────────────────────────

  async fn create_notification(&self, input: NewNotification) -> Result<Notification> {
    let now = encode_dt(Utc::now());
    let kind = input.kind.as_str();
    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO notifications (actor_id, recipient_id, type, resource_id, creation_date)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![input.actor_id, input.recipient_id, kind, input.resource_id, now],
        )?;
        let id = conn.last_insert_rowid();
        Ok(load_notification(conn, id)?)
      })
      .await?;
    raw
      .map(RawNotification::into_notification)
      .transpose()?
      .ok_or(Error::UserNotFound(input.recipient_id))
  }

  async fn get_notification(&self, id: Id) -> Result<Option<Notification>> {
    let raw = self.conn.call(move |conn| Ok(load_notification(conn, id)?)).await?;
    raw.map(RawNotification::into_notification).transpose()
  }

  async fn list_notifications(&self, recipient_id: Id) -> Result<Vec<Notification>> {
    let sql = format!(
      "{} WHERE n.recipient_id = ?1 ORDER BY n.creation_date DESC, n.id DESC",
      notification_select()
    );
    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![recipient_id], RawNotification::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawNotification::into_notification).collect()
  }

  async fn mark_notification_read(&self, id: Id) -> Result<Notification> {
    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE notifications SET read = 1 WHERE id = ?1",
          rusqlite::params![id],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(load_notification(conn, id)?)
      })
      .await?;
    raw
      .map(RawNotification::into_notification)
      .transpose()?
      .ok_or(Error::NotificationNotFound(id))
  }
}
