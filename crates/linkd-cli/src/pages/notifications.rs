//! The caller's notifications, newest first.

use crossterm::event::{KeyCode, KeyEvent};
use linkd_core::{notification::Notification, user::Id};

use super::Outcome;
use crate::{
  app::Screen,
  client::{ApiClient, ApiRequest},
};

pub const NOTIFICATIONS_PATH: &str = "/api/v1/notifications";

#[derive(Debug, Clone, Default)]
pub struct NotificationsPage {
  pub items:   Vec<Notification>,
  pub cursor:  usize,
  pub error:   Option<String>,
  pub loading: bool,
}

impl NotificationsPage {
  pub async fn load(&mut self, client: &ApiClient) -> Outcome {
    self.loading = true;
    let result = client
      .fetch::<Vec<Notification>>(ApiRequest::get(NOTIFICATIONS_PATH))
      .await;
    self.loading = false;

    match result {
      Ok(items) => {
        self.items = items;
        self.cursor = 0;
        self.error = None;
        Outcome::Stay
      }
      Err(e) if e.is_unauthorized() => Outcome::Unauthorized,
      Err(e) => {
        self.error = Some(e.message());
        Outcome::Stay
      }
    }
  }

  pub fn unread_count(&self) -> usize { self.items.iter().filter(|n| !n.read).count() }

  /// Mark `id` read on the server; on success flip only that entry.
  pub async fn mark_read(&mut self, client: &ApiClient, id: Id) -> bool {
    let mut marked = false;
    client
      .request(
        ApiRequest::put(format!("{NOTIFICATIONS_PATH}/{id}")),
        &mut (&mut *self, &mut marked),
        |(page, marked), updated: Notification| {
          if let Some(item) = page.items.iter_mut().find(|n| n.id == updated.id) {
            item.read = updated.read;
          }
          **marked = true;
        },
        |(page, _), message| page.error = Some(message),
      )
      .await;
    marked
  }

  /// Mark the entry under the cursor read, then open its post.
  pub async fn open(&mut self, client: &ApiClient) -> Outcome {
    let Some((id, read, post_id)) = self
      .items
      .get(self.cursor)
      .map(|n| (n.id, n.read, n.resource_id))
    else {
      return Outcome::Stay;
    };
    if !read && !self.mark_read(client, id).await {
      return Outcome::Stay;
    }
    Outcome::Navigate(Screen::PostDetail(post_id))
  }

  pub async fn handle_key(&mut self, key: KeyEvent, client: &ApiClient) -> Outcome {
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        if self.cursor + 1 < self.items.len() {
          self.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => self.cursor = self.cursor.saturating_sub(1),
      KeyCode::Enter => return self.open(client).await,
      KeyCode::Char('r') => return self.load(client).await,
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => return Outcome::Navigate(Screen::Feed),
      _ => {}
    }
    Outcome::Stay
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::{
    Json, Router,
    extract::Path,
    routing::{get, put},
  };
  use linkd_core::notification::NotificationType;

  use crate::testing::{self, client_for, serve};

  fn items() -> Vec<Notification> {
    vec![
      testing::notification(2, testing::user(2, "Bob", "Byte"), NotificationType::Like, 7),
      testing::notification(1, testing::user(2, "Bob", "Byte"), NotificationType::Comment, 7),
    ]
  }

  fn app() -> Router {
    Router::new()
      .route(NOTIFICATIONS_PATH, get(|| async { Json(items()) }))
      .route(
        "/api/v1/notifications/{id}",
        put(|Path(id): Path<Id>| async move {
          let mut n = items().into_iter().find(|n| n.id == id).unwrap();
          n.read = true;
          Json(n)
        }),
      )
  }

  #[tokio::test]
  async fn opening_marks_only_that_entry_read() {
    let client = client_for(serve(app()).await);
    let mut page = NotificationsPage::default();
    page.load(&client).await;
    assert_eq!(page.unread_count(), 2);

    assert_eq!(page.open(&client).await, Outcome::Navigate(Screen::PostDetail(7)));
    assert!(page.items[0].read);
    assert!(!page.items[1].read);
    assert_eq!(page.unread_count(), 1);
  }

  #[tokio::test]
  async fn empty_list_loads_cleanly() {
    let app = Router::new().route(NOTIFICATIONS_PATH, get(|| async { Json(Vec::<Notification>::new()) }));
    let client = client_for(serve(app).await);
    let mut page = NotificationsPage::default();
    assert_eq!(page.load(&client).await, Outcome::Stay);
    assert!(page.items.is_empty());
    assert!(page.error.is_none());
  }
}
