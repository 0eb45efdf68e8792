//! Stub-server helpers shared by the client and page tests.

use chrono::{TimeZone, Utc};
use linkd_core::{
  notification::{Notification, NotificationType},
  post::Post,
  user::{Id, User},
};

use crate::{
  client::{ApiClient, ApiConfig},
  token::TokenStore,
};

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn serve(app: axum::Router) -> String {
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, app).await.unwrap();
  });
  format!("http://{addr}")
}

/// A client for `base_url` with an in-memory token store.
pub fn client_for(base_url: String) -> ApiClient {
  ApiClient::new(ApiConfig { base_url }, TokenStore::in_memory()).unwrap()
}

pub fn user(id: Id, first: &str, last: &str) -> User {
  let mut user = User::new(id, format!("{}@example.com", first.to_lowercase()));
  user.first_name = Some(first.to_owned());
  user.last_name = Some(last.to_owned());
  user
}

pub fn post(id: Id, author: User, content: &str) -> Post {
  Post {
    id,
    author,
    content: content.to_owned(),
    picture: None,
    creation_date: Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap(),
    updated_date: None,
    comments: Vec::new(),
    likes_count: 0,
  }
}

pub fn notification(id: Id, actor: User, kind: NotificationType, resource_id: Id) -> Notification {
  Notification {
    id,
    actor,
    recipient: user(1, "Ada", "Lovelace"),
    kind,
    read: false,
    resource_id,
    creation_date: Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap(),
  }
}
