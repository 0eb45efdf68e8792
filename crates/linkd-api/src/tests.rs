use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use chrono::Duration;
use linkd_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use super::*;
use crate::mail::RecordingMailer;

struct Harness {
  state:  AppState<SqliteStore>,
  mailer: Arc<RecordingMailer>,
}

impl Harness {
  async fn new() -> Self { Self::with_ttl(Duration::minutes(1)).await }

  async fn with_ttl(code_ttl: Duration) -> Self {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState {
      store:    Arc::new(store),
      mailer:   mailer.clone(),
      settings: Arc::new(Settings { code_ttl }),
    };
    Self { state, mailer }
  }

  async fn call(
    &self,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = router(self.state.clone())
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
  }

  /// Register `email` and return its session token.
  async fn register(&self, email: &str, password: &str) -> String {
    let (status, body) = self
      .call(
        "POST",
        "/api/v1/authentication/register",
        None,
        Some(json!({ "email": email, "password": password })),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["token"].as_str().unwrap().to_owned()
  }

  async fn post(&self, token: &str, content: &str) -> i64 {
    let (status, body) = self
      .call("POST", "/api/v1/feed/posts", Some(token), Some(json!({ "content": content })))
      .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
  }
}

// ── Authentication ──────────────────────────────────────────────────────────

#[tokio::test]
async fn register_login_and_fetch_current_user() {
  let h = Harness::new().await;
  h.register("ada@example.com", "pw").await;

  let (status, body) = h
    .call(
      "POST",
      "/api/v1/authentication/login",
      None,
      Some(json!({ "email": "Ada@Example.com", "password": "pw" })),
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Authentication succeeded.");
  let token = body["token"].as_str().unwrap();

  let (status, user) = h.call("GET", "/api/v1/authentication/user", Some(token), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(user["email"], "ada@example.com");
  assert_eq!(user["emailVerified"], false);
  assert_eq!(user["profileComplete"], false);
}

#[tokio::test]
async fn protected_routes_require_a_known_token() {
  let h = Harness::new().await;

  let (status, body) = h.call("GET", "/api/v1/feed", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["message"], "Unauthorized");

  let (status, _) = h.call("GET", "/api/v1/notifications", Some("bogus"), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_failures_carry_a_message() {
  let h = Harness::new().await;
  h.register("ada@example.com", "pw").await;

  let (status, body) = h
    .call(
      "POST",
      "/api/v1/authentication/login",
      None,
      Some(json!({ "email": "nobody@example.com", "password": "pw" })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["message"], "User not found.");

  let (status, body) = h
    .call(
      "POST",
      "/api/v1/authentication/login",
      None,
      Some(json!({ "email": "ada@example.com", "password": "nope" })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["message"], "Password is incorrect.");

  let (status, body) = h
    .call("POST", "/api/v1/authentication/login", None, Some(json!({})))
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["message"].as_str().unwrap().contains("email: Email is mandatory"));
}

#[tokio::test]
async fn missing_body_is_reported() {
  let h = Harness::new().await;
  let (status, body) = h.call("POST", "/api/v1/authentication/login", None, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["message"], "Required request body is missing.");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
  let h = Harness::new().await;
  h.register("ada@example.com", "pw").await;
  let (status, body) = h
    .call(
      "POST",
      "/api/v1/authentication/register",
      None,
      Some(json!({ "email": "ada@example.com", "password": "other" })),
    )
    .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["message"].is_string());
}

#[tokio::test]
async fn concurrent_registrations_of_one_email_conflict() {
  let h = Harness::new().await;
  let body = json!({ "email": "race@example.com", "password": "pw" });
  let (a, b) = tokio::join!(
    h.call("POST", "/api/v1/authentication/register", None, Some(body.clone())),
    h.call("POST", "/api/v1/authentication/register", None, Some(body)),
  );

  let mut statuses = [a.0, b.0];
  statuses.sort();
  assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
  let loser = if a.0 == StatusCode::CONFLICT { a.1 } else { b.1 };
  assert_eq!(loser["message"], "Email is already registered.");
}

#[tokio::test]
async fn email_verification_flow() {
  let h = Harness::new().await;
  let token = h.register("ada@example.com", "pw").await;
  let code = h.mailer.last_code_for("ada@example.com").unwrap();
  let wrong = if code == "00000" { "11111" } else { "00000" };

  let uri = format!("/api/v1/authentication/validate-email-verification-token?token={wrong}");
  let (status, body) = h.call("PUT", &uri, Some(&token), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["message"], "Email verification token failed.");

  let uri = format!("/api/v1/authentication/validate-email-verification-token?token={code}");
  let (status, body) = h.call("PUT", &uri, Some(&token), None).await;
  assert_eq!(status, StatusCode::ACCEPTED);
  assert_eq!(body["message"], "Email verified successfully.");

  let (_, user) = h.call("GET", "/api/v1/authentication/user", Some(&token), None).await;
  assert_eq!(user["emailVerified"], true);

  let (status, _) = h
    .call("GET", "/api/v1/authentication/send-email-verification-token", Some(&token), None)
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn expired_codes_are_reported_as_expired() {
  let h = Harness::with_ttl(Duration::seconds(-1)).await;
  let token = h.register("ada@example.com", "pw").await;
  let code = h.mailer.last_code_for("ada@example.com").unwrap();

  let uri = format!("/api/v1/authentication/validate-email-verification-token?token={code}");
  let (status, body) = h.call("PUT", &uri, Some(&token), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["message"], "Email verification token expired.");

  let (status, _) = h
    .call(
      "PUT",
      "/api/v1/authentication/send-password-reset-token?email=ada@example.com",
      None,
      None,
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  let code = h.mailer.last_code_for("ada@example.com").unwrap();
  let uri = format!(
    "/api/v1/authentication/reset-password?email=ada@example.com&token={code}&newPassword=new"
  );
  let (status, body) = h.call("PUT", &uri, None, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["message"], "Password reset token expired.");
}

#[tokio::test]
async fn password_reset_flow() {
  let h = Harness::new().await;
  h.register("ada@example.com", "old").await;

  let (status, body) = h
    .call(
      "PUT",
      "/api/v1/authentication/send-password-reset-token?email=nobody@example.com",
      None,
      None,
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["message"], "User not found.");

  let (status, body) = h
    .call(
      "PUT",
      "/api/v1/authentication/send-password-reset-token?email=ada@example.com",
      None,
      None,
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Password reset token sent to ada@example.com");

  let code = h.mailer.last_code_for("ada@example.com").unwrap();
  let wrong = if code == "00000" { "11111" } else { "00000" };
  let uri = format!(
    "/api/v1/authentication/reset-password?email=ada@example.com&token={wrong}&newPassword=new"
  );
  let (status, body) = h.call("PUT", &uri, None, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["message"], "Password reset token failed.");

  let uri = format!(
    "/api/v1/authentication/reset-password?email=ada@example.com&token={code}&newPassword=new"
  );
  let (status, body) = h.call("PUT", &uri, None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Password reset successful.");

  // The code is single use.
  let (status, _) = h.call("PUT", &uri, None, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = h
    .call(
      "POST",
      "/api/v1/authentication/login",
      None,
      Some(json!({ "email": "ada@example.com", "password": "new" })),
    )
    .await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn profile_update_and_account_deletion() {
  let h = Harness::new().await;
  let token = h.register("ada@example.com", "pw").await;

  let (status, user) = h
    .call(
      "PUT",
      "/api/v1/authentication/profile",
      Some(&token),
      Some(json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "company": "Analytical Engines",
        "position": "Engineer",
        "location": "London"
      })),
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(user["firstName"], "Ada");
  assert_eq!(user["profileComplete"], true);

  let (status, body) = h.call("DELETE", "/api/v1/authentication/delete", Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "User deleted successfully.");

  let (status, _) = h.call("GET", "/api/v1/authentication/user", Some(&token), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ── Feed ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn feed_excludes_the_callers_posts() {
  let h = Harness::new().await;
  let ada = h.register("ada@example.com", "pw").await;
  let bob = h.register("bob@example.com", "pw").await;
  h.post(&ada, "from ada").await;
  h.post(&bob, "from bob").await;

  let (status, feed) = h.call("GET", "/api/v1/feed", Some(&ada), None).await;
  assert_eq!(status, StatusCode::OK);
  let feed = feed.as_array().unwrap();
  assert_eq!(feed.len(), 1);
  assert_eq!(feed[0]["content"], "from bob");

  let (_, all) = h.call("GET", "/api/v1/feed/posts?limit=1", Some(&ada), None).await;
  let all = all.as_array().unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0]["content"], "from bob");
}

#[tokio::test]
async fn blank_posts_are_rejected() {
  let h = Harness::new().await;
  let ada = h.register("ada@example.com", "pw").await;
  let (status, body) = h
    .call("POST", "/api/v1/feed/posts", Some(&ada), Some(json!({ "content": "   " })))
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["message"].is_string());
}

#[tokio::test]
async fn only_the_author_may_edit_or_delete() {
  let h = Harness::new().await;
  let ada = h.register("ada@example.com", "pw").await;
  let bob = h.register("bob@example.com", "pw").await;
  let id = h.post(&ada, "hello").await;
  let uri = format!("/api/v1/feed/posts/{id}");

  let (status, body) = h
    .call("PUT", &uri, Some(&bob), Some(json!({ "content": "hijacked" })))
    .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(body["message"], "User is not the author of the post");

  let (status, _) = h.call("DELETE", &uri, Some(&bob), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, post) = h
    .call("PUT", &uri, Some(&ada), Some(json!({ "content": "edited" })))
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(post["content"], "edited");
  assert!(post["updatedDate"].is_string());

  let (status, _) = h.call("DELETE", &uri, Some(&ada), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, body) = h.call("GET", &uri, Some(&ada), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["message"], "Post not found");
}

#[tokio::test]
async fn concurrent_deletes_of_one_post() {
  let h = Harness::new().await;
  let ada = h.register("ada@example.com", "pw").await;
  let id = h.post(&ada, "hello").await;
  let uri = format!("/api/v1/feed/posts/{id}");

  let (a, b) = tokio::join!(
    h.call("DELETE", &uri, Some(&ada), None),
    h.call("DELETE", &uri, Some(&ada), None),
  );

  let mut statuses = [a.0, b.0];
  statuses.sort();
  assert_eq!(statuses, [StatusCode::NO_CONTENT, StatusCode::NOT_FOUND]);
  let loser = if a.0 == StatusCode::NOT_FOUND { a.1 } else { b.1 };
  assert_eq!(loser["message"], "Post not found");
}

#[tokio::test]
async fn like_toggles_and_self_likes_do_not_notify() {
  let h = Harness::new().await;
  let ada = h.register("ada@example.com", "pw").await;
  let id = h.post(&ada, "hello").await;
  let uri = format!("/api/v1/feed/posts/{id}/like");

  let (_, post) = h.call("PUT", &uri, Some(&ada), None).await;
  assert_eq!(post["likesCount"], 1);
  let (_, likes) = h
    .call("GET", &format!("/api/v1/feed/posts/{id}/likes"), Some(&ada), None)
    .await;
  assert_eq!(likes[0]["email"], "ada@example.com");

  let (_, post) = h.call("PUT", &uri, Some(&ada), None).await;
  assert_eq!(post["likesCount"], 0);

  let (_, notes) = h.call("GET", "/api/v1/notifications", Some(&ada), None).await;
  assert_eq!(notes, json!([]));
}

#[tokio::test]
async fn comments_are_author_only_to_change() {
  let h = Harness::new().await;
  let ada = h.register("ada@example.com", "pw").await;
  let bob = h.register("bob@example.com", "pw").await;
  let id = h.post(&ada, "hello").await;

  let (status, comment) = h
    .call(
      "POST",
      &format!("/api/v1/feed/posts/{id}/comments"),
      Some(&bob),
      Some(json!({ "content": "nice" })),
    )
    .await;
  assert_eq!(status, StatusCode::CREATED);
  let comment_id = comment["id"].as_i64().unwrap();
  let uri = format!("/api/v1/feed/comments/{comment_id}");

  let (status, body) = h
    .call("PUT", &uri, Some(&ada), Some(json!({ "content": "rewritten" })))
    .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(body["message"], "User is not the author of the comment");

  let (status, edited) = h
    .call("PUT", &uri, Some(&bob), Some(json!({ "content": "very nice" })))
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(edited["content"], "very nice");

  let (status, _) = h
    .call(
      "POST",
      &format!("/api/v1/feed/posts/{id}/comments"),
      Some(&bob),
      Some(json!({ "content": "  " })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = h.call("DELETE", &uri, Some(&bob), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (_, comments) = h
    .call("GET", &format!("/api/v1/feed/posts/{id}/comments"), Some(&ada), None)
    .await;
  assert_eq!(comments, json!([]));
}

// ── Notifications ───────────────────────────────────────────────────────────

#[tokio::test]
async fn comment_and_like_notify_the_author_newest_first() {
  let h = Harness::new().await;
  let ada = h.register("ada@example.com", "pw").await;
  let bob = h.register("bob@example.com", "pw").await;
  let id = h.post(&ada, "hello").await;

  h.call(
    "POST",
    &format!("/api/v1/feed/posts/{id}/comments"),
    Some(&bob),
    Some(json!({ "content": "nice" })),
  )
  .await;
  h.call("PUT", &format!("/api/v1/feed/posts/{id}/like"), Some(&bob), None)
    .await;

  let (status, notes) = h.call("GET", "/api/v1/notifications", Some(&ada), None).await;
  assert_eq!(status, StatusCode::OK);
  let notes = notes.as_array().unwrap();
  assert_eq!(notes.len(), 2);
  assert_eq!(notes[0]["type"], "LIKE");
  assert_eq!(notes[1]["type"], "COMMENT");
  assert_eq!(notes[0]["resourceId"], id);
  assert_eq!(notes[0]["actor"]["email"], "bob@example.com");
  assert!(notes.iter().all(|n| n["read"] == false));

  let first = notes[0]["id"].as_i64().unwrap();
  let (status, updated) = h
    .call("PUT", &format!("/api/v1/notifications/{first}"), Some(&ada), None)
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["read"], true);

  let (_, notes) = h.call("GET", "/api/v1/notifications", Some(&ada), None).await;
  assert_eq!(notes[0]["read"], true);
  assert_eq!(notes[1]["read"], false);

  // Bob cannot touch Ada's notifications.
  let (status, _) = h
    .call("PUT", &format!("/api/v1/notifications/{first}"), Some(&bob), None)
    .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_routes_use_the_message_envelope() {
  let h = Harness::new().await;
  let (status, body) = h.call("GET", "/nope", None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["message"], "No route for /nope");
}
