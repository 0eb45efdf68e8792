//! Async HTTP client for the linkd JSON API.
//!
//! Every call goes through [`ApiClient::fetch`]: the bearer token is read from
//! the [`TokenStore`] on each request, bodies are JSON, and any failure is
//! reduced to the server's `message` or a short description. Pages usually use
//! [`ApiClient::request`], which routes the outcome into one of two callbacks
//! over the page's own state.

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Client, Method, StatusCode, header};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

use crate::token::TokenStore;

/// Shown when a failure body carries no `message` field.
pub const FALLBACK_ERROR: &str = "Something went wrong!";

/// Connection settings for the linkd API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RequestError {
  /// The server answered with a non-success status.
  #[error("{message}")]
  Api { status: StatusCode, message: String },

  /// The request never got a response.
  #[error("{0}")]
  Transport(String),

  /// The body could not be encoded or decoded.
  #[error("{0}")]
  Decode(String),
}

impl RequestError {
  pub fn status(&self) -> Option<StatusCode> {
    match self {
      Self::Api { status, .. } => Some(*status),
      _ => None,
    }
  }

  pub fn is_unauthorized(&self) -> bool { self.status() == Some(StatusCode::UNAUTHORIZED) }

  /// The text a page shows for this failure.
  ///
  /// A server `message` is returned as sent, even when blank.
  pub fn message(&self) -> String {
    match self {
      RequestError::Api { message, .. } => message.clone(),
      other => {
        let text = other.to_string();
        if text.trim().is_empty() { FALLBACK_ERROR.to_owned() } else { text }
      }
    }
  }
}

// ─── Request ──────────────────────────────────────────────────────────────────

/// One call: method, path under the base URL, query pairs and optional body.
#[derive(Debug)]
pub struct ApiRequest {
  method: Method,
  path:   String,
  query:  Vec<(String, String)>,
  body:   Option<serde_json::Result<Value>>,
}

impl ApiRequest {
  pub fn new(method: Method, path: impl Into<String>) -> Self {
    Self { method, path: path.into(), query: Vec::new(), body: None }
  }

  pub fn get(path: impl Into<String>) -> Self { Self::new(Method::GET, path) }

  pub fn post(path: impl Into<String>) -> Self { Self::new(Method::POST, path) }

  pub fn put(path: impl Into<String>) -> Self { Self::new(Method::PUT, path) }

  pub fn delete(path: impl Into<String>) -> Self { Self::new(Method::DELETE, path) }

  pub fn query(mut self, key: &str, value: impl ToString) -> Self {
    self.query.push((key.to_owned(), value.to_string()));
    self
  }

  pub fn json<T: Serialize>(mut self, body: &T) -> Self {
    self.body = Some(serde_json::to_value(body));
    self
  }
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// Cheap to clone; the inner [`reqwest::Client`] and token store are shared.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
  tokens: Arc<TokenStore>,
}

impl ApiClient {
  pub fn new(config: ApiConfig, tokens: TokenStore) -> Result<Self> {
    let client = Client::builder()
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config, tokens: Arc::new(tokens) })
  }

  pub fn tokens(&self) -> &TokenStore { &self.tokens }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Perform `req` and decode a success body as `T`.
  ///
  /// An empty success body decodes as JSON `null`, so `()` accepts a 204.
  pub async fn fetch<T: DeserializeOwned>(&self, req: ApiRequest) -> Result<T, RequestError> {
    let ApiRequest { method, path, query, body } = req;

    let mut builder = self
      .client
      .request(method.clone(), self.url(&path))
      .header(header::CONTENT_TYPE, "application/json");
    if !query.is_empty() {
      builder = builder.query(&query);
    }
    if let Some(token) = self.tokens.load() {
      builder = builder.bearer_auth(token);
    }
    if let Some(body) = body {
      let body = body.map_err(|e| RequestError::Decode(e.to_string()))?;
      builder = builder.body(body.to_string());
    }

    tracing::debug!(%method, %path, "request");
    let resp = builder
      .send()
      .await
      .map_err(|e| RequestError::Transport(e.to_string()))?;
    let status = resp.status();
    let bytes = resp
      .bytes()
      .await
      .map_err(|e| RequestError::Transport(e.to_string()))?;

    if !status.is_success() {
      let message = failure_message(&bytes);
      tracing::debug!(%method, %path, %status, %message, "request failed");
      return Err(RequestError::Api { status, message });
    }

    let bytes: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) { b"null" } else { &bytes };
    serde_json::from_slice(bytes).map_err(|e| RequestError::Decode(e.to_string()))
  }

  /// Perform `req` and hand the outcome to exactly one of the callbacks.
  ///
  /// Both callbacks get `ctx`, usually the calling page. Never fails.
  pub async fn request<T, C>(
    &self,
    req: ApiRequest,
    ctx: &mut C,
    on_success: impl FnOnce(&mut C, T),
    on_failure: impl FnOnce(&mut C, String),
  ) where
    T: DeserializeOwned,
    C: ?Sized,
  {
    match self.fetch(req).await {
      Ok(value) => on_success(ctx, value),
      Err(e) => on_failure(ctx, e.message()),
    }
  }
}

/// The `message` of a JSON error body, the fallback if it has none, or the
/// parse error if the body is not JSON.
fn failure_message(bytes: &[u8]) -> String {
  match serde_json::from_slice::<Value>(bytes) {
    Ok(body) => body
      .get("message")
      .and_then(Value::as_str)
      .unwrap_or(FALLBACK_ERROR)
      .to_owned(),
    Err(e) => e.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  };

  use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode as AxumStatus},
    routing::{get, post},
  };
  use serde_json::json;

  use crate::testing::{client_for, serve};

  #[derive(Default)]
  struct Outcome {
    ok:       Option<Value>,
    failures: Vec<String>,
  }

  async fn run(client: &ApiClient, req: ApiRequest) -> Outcome {
    let mut out = Outcome::default();
    client
      .request(
        req,
        &mut out,
        |o, v: Value| o.ok = Some(v),
        |o, msg| o.failures.push(msg),
      )
      .await;
    out
  }

  #[tokio::test]
  async fn success_passes_the_parsed_body() {
    let app = Router::new().route("/api/v1/things", get(|| async { Json(json!([{ "id": 1 }])) }));
    let client = client_for(serve(app).await);

    let out = run(&client, ApiRequest::get("/api/v1/things")).await;
    assert_eq!(out.ok, Some(json!([{ "id": 1 }])));
    assert!(out.failures.is_empty());
  }

  #[tokio::test]
  async fn error_status_passes_the_message_verbatim() {
    let app = Router::new().route(
      "/api/v1/authentication/login",
      post(|| async {
        (AxumStatus::BAD_REQUEST, Json(json!({ "message": "Password is incorrect." })))
      }),
    );
    let client = client_for(serve(app).await);

    let out = run(&client, ApiRequest::post("/api/v1/authentication/login").json(&json!({}))).await;
    assert!(out.ok.is_none());
    assert_eq!(out.failures, vec!["Password is incorrect.".to_owned()]);
  }

  #[tokio::test]
  async fn error_without_message_uses_fallback() {
    let app = Router::new().route(
      "/api/v1/x",
      get(|| async { (AxumStatus::INTERNAL_SERVER_ERROR, Json(json!({ "error": true }))) }),
    );
    let client = client_for(serve(app).await);

    let out = run(&client, ApiRequest::get("/api/v1/x")).await;
    assert_eq!(out.failures, vec![FALLBACK_ERROR.to_owned()]);
  }

  #[tokio::test]
  async fn blank_message_is_passed_through_unchanged() {
    let app = Router::new()
      .route(
        "/api/v1/empty",
        get(|| async { (AxumStatus::BAD_REQUEST, Json(json!({ "message": "" }))) }),
      )
      .route(
        "/api/v1/spaces",
        get(|| async { (AxumStatus::BAD_REQUEST, Json(json!({ "message": "  " }))) }),
      );
    let client = client_for(serve(app).await);

    let out = run(&client, ApiRequest::get("/api/v1/empty")).await;
    assert_eq!(out.failures, vec![String::new()]);
    let out = run(&client, ApiRequest::get("/api/v1/spaces")).await;
    assert_eq!(out.failures, vec!["  ".to_owned()]);
  }

  #[tokio::test]
  async fn error_with_non_json_body_reports_parse_error() {
    let app = Router::new().route(
      "/api/v1/x",
      get(|| async { (AxumStatus::BAD_GATEWAY, "upstream down") }),
    );
    let client = client_for(serve(app).await);

    let out = run(&client, ApiRequest::get("/api/v1/x")).await;
    assert_eq!(out.failures.len(), 1);
    assert!(!out.failures[0].is_empty());
    assert_ne!(out.failures[0], "upstream down");
  }

  #[tokio::test]
  async fn network_error_reaches_failure_callback_once() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = client_for(format!("http://{addr}"));

    let out = run(&client, ApiRequest::get("/api/v1/feed")).await;
    assert!(out.ok.is_none());
    assert_eq!(out.failures.len(), 1);
    assert!(!out.failures[0].is_empty());
  }

  #[tokio::test]
  async fn empty_success_body_decodes_as_unit() {
    let app = Router::new().route(
      "/api/v1/feed/posts/{id}",
      axum::routing::delete(|| async { AxumStatus::NO_CONTENT }),
    );
    let client = client_for(serve(app).await);

    let res: Result<(), _> = client.fetch(ApiRequest::delete("/api/v1/feed/posts/1")).await;
    assert!(res.is_ok());
  }

  #[tokio::test]
  async fn bearer_header_follows_the_token_store() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
      "/api/v1/echo",
      get(move |headers: HeaderMap| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move {
          let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
          let content_type = headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
          Json(json!({ "auth": auth, "contentType": content_type }))
        }
      }),
    );
    let client = client_for(serve(app).await);

    let body: Value = client.fetch(ApiRequest::get("/api/v1/echo")).await.unwrap();
    assert_eq!(body["auth"], Value::Null);
    assert_eq!(body["contentType"], "application/json");

    client.tokens().save("tok").unwrap();
    let body: Value = client.fetch(ApiRequest::get("/api/v1/echo")).await.unwrap();
    assert_eq!(body["auth"], "Bearer tok");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn fetch_reports_status_on_api_errors() {
    let app = Router::new().route(
      "/api/v1/feed",
      get(|| async { (AxumStatus::UNAUTHORIZED, Json(json!({ "message": "Unauthorized" }))) }),
    );
    let client = client_for(serve(app).await);

    let err = client.fetch::<Value>(ApiRequest::get("/api/v1/feed")).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.message(), "Unauthorized");
  }
}
