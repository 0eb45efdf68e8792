//! The `SocialStore` trait and supporting types.
//!
//! Implemented by storage backends (e.g. `linkd-store-sqlite`). The HTTP
//! layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  notification::{NewNotification, Notification},
  post::{Comment, NewPost, Post},
  user::{Id, ProfileUpdate, User},
};

// ─── Account ──────────────────────────────────────────────────────────────────

/// A one-time code stored as a hash with an expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCode {
  pub hash:       String,
  pub expires_at: DateTime<Utc>,
}

/// A user together with the secrets the HTTP layer needs to authenticate them.
#[derive(Debug, Clone)]
pub struct Account {
  pub user:               User,
  pub password_hash:      String,
  pub email_verification: Option<PendingCode>,
  pub password_reset:     Option<PendingCode>,
}

/// Which one-time code a write refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
  EmailVerification,
  PasswordReset,
}

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`SocialStore::list_posts`]. Results are newest first.
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
  /// Only posts by this author.
  pub author:         Option<Id>,
  /// Skip posts by this author (the "feed" view).
  pub exclude_author: Option<Id>,
  pub limit:          Option<usize>,
  pub offset:         Option<usize>,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// The kind of row a not-found error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
  User,
  Post,
  Comment,
  Notification,
}

/// Backend-independent classification of a store failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
  /// The email is already registered.
  EmailTaken,
  NotFound(Entity),
  Other,
}

/// Implemented by every [`SocialStore::Error`] so callers can tell expected
/// failures (conflicts, misses) from broken backends.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> StoreErrorKind;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a linkd storage backend.
///
/// Lookups that can miss return `Ok(None)`; mutations of a missing row return
/// the backend's not-found error.
pub trait SocialStore: Send + Sync {
  type Error: StoreError;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create a user. Fails if `email` is already registered.
  fn create_user<'a>(
    &'a self,
    email: &'a str,
    password_hash: &'a str,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + 'a;

  fn get_user(&self, id: Id) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn find_account<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  fn update_profile(
    &self,
    id: Id,
    update: ProfileUpdate,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn set_password(
    &self,
    id: Id,
    password_hash: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Store (or, with `None`, clear) a pending one-time code.
  fn set_code(
    &self,
    id: Id,
    kind: CodeKind,
    code: Option<PendingCode>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Flag the email verified and clear the verification code.
  fn mark_email_verified(&self, id: Id) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a user and everything they own.
  fn delete_user(&self, id: Id) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  fn create_session(
    &self,
    user_id: Id,
    token_hash: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Resolve a session token digest to its user.
  fn session_user<'a>(
    &'a self,
    token_hash: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  // ── Posts ─────────────────────────────────────────────────────────────

  fn create_post(
    &self,
    author_id: Id,
    post: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  fn get_post(&self, id: Id) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// Replace content and picture; stamps `updated_date`.
  fn update_post(
    &self,
    id: Id,
    post: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  /// Delete a post with its comments and likes.
  fn delete_post(&self, id: Id) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn list_posts<'a>(
    &'a self,
    query: &'a PostQuery,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + 'a;

  /// Toggle `user_id`'s like on a post. Returns `true` if the post is now liked.
  fn toggle_like(
    &self,
    post_id: Id,
    user_id: Id,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_likes(&self, post_id: Id) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  // ── Comments ──────────────────────────────────────────────────────────

  fn add_comment(
    &self,
    post_id: Id,
    author_id: Id,
    content: String,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  fn get_comment(&self, id: Id) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  fn update_comment(
    &self,
    id: Id,
    content: String,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  fn delete_comment(&self, id: Id) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Oldest first.
  fn list_comments(&self, post_id: Id) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  // ── Notifications ─────────────────────────────────────────────────────

  fn create_notification(
    &self,
    input: NewNotification,
  ) -> impl Future<Output = Result<Notification, Self::Error>> + Send + '_;

  fn get_notification(
    &self,
    id: Id,
  ) -> impl Future<Output = Result<Option<Notification>, Self::Error>> + Send + '_;

  /// Newest first.
  fn list_notifications(
    &self,
    recipient_id: Id,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + '_;

  fn mark_notification_read(
    &self,
    id: Id,
  ) -> impl Future<Output = Result<Notification, Self::Error>> + Send + '_;
}
