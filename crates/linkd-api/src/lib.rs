//! JSON REST API for linkd.
//!
//! Exposes an axum [`Router`] backed by any [`SocialStore`]. Every error is
//! returned as `{"message": "..."}`; authenticated routes expect
//! `Authorization: Bearer <token>`.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = linkd_api::router(state); // serves /api/v1/...
//! ```

pub mod accounts;
pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod mail;

use std::sync::Arc;

use axum::{
  Router,
  http::Uri,
  routing::{get, post, put},
};
use chrono::Duration;
use linkd_core::store::SocialStore;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
use handlers::{authentication, feed, notifications};
use mail::Mailer;

// ─── Application state ────────────────────────────────────────────────────────

/// Account policy knobs.
#[derive(Debug, Clone)]
pub struct Settings {
  /// How long a verification or reset code stays valid.
  pub code_ttl: Duration,
}

impl Default for Settings {
  fn default() -> Self { Self { code_ttl: Duration::minutes(1) } }
}

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub mailer:   Arc<dyn Mailer>,
  pub settings: Arc<Settings>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      mailer:   Arc::clone(&self.mailer),
      settings: Arc::clone(&self.settings),
    }
  }
}

impl<S> AppState<S> {
  pub fn new(store: S, mailer: impl Mailer + 'static, settings: Settings) -> Self {
    Self {
      store:    Arc::new(store),
      mailer:   Arc::new(mailer),
      settings: Arc::new(settings),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full application: `/api/v1` routes, request tracing and a JSON 404.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: SocialStore + 'static,
{
  Router::new()
    .nest("/api/v1", api_router(state))
    .fallback(fallback)
    .layer(TraceLayer::new_for_http())
}

/// Build the API router for `state`, relative to `/api/v1`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: SocialStore + 'static,
{
  Router::new()
    // Authentication
    .route("/authentication/login", post(authentication::login::<S>))
    .route("/authentication/register", post(authentication::register::<S>))
    .route("/authentication/user", get(authentication::current_user::<S>))
    .route("/authentication/delete", axum::routing::delete(authentication::delete_account::<S>))
    .route("/authentication/profile", put(authentication::update_profile::<S>))
    .route(
      "/authentication/validate-email-verification-token",
      put(authentication::validate_email_verification_token::<S>),
    )
    .route(
      "/authentication/send-email-verification-token",
      get(authentication::send_email_verification_token::<S>),
    )
    .route(
      "/authentication/send-password-reset-token",
      put(authentication::send_password_reset_token::<S>),
    )
    .route("/authentication/reset-password", put(authentication::reset_password::<S>))
    // Feed
    .route("/feed", get(feed::feed::<S>))
    .route("/feed/posts", get(feed::all_posts::<S>).post(feed::create_post::<S>))
    .route(
      "/feed/posts/{id}",
      get(feed::get_post::<S>)
        .put(feed::edit_post::<S>)
        .delete(feed::delete_post::<S>),
    )
    .route("/feed/posts/user/{user_id}", get(feed::posts_by_user::<S>))
    .route("/feed/posts/{id}/like", put(feed::like_post::<S>))
    .route("/feed/posts/{id}/likes", get(feed::post_likes::<S>))
    .route(
      "/feed/posts/{id}/comments",
      get(feed::list_comments::<S>).post(feed::add_comment::<S>),
    )
    .route(
      "/feed/comments/{id}",
      put(feed::edit_comment::<S>).delete(feed::delete_comment::<S>),
    )
    // Notifications
    .route("/notifications", get(notifications::list::<S>))
    .route("/notifications/{id}", put(notifications::mark_read::<S>))
    .with_state(state)
}

async fn fallback(uri: Uri) -> ApiError { ApiError::NotFound(format!("No route for {uri}")) }

#[cfg(test)]
mod tests;
