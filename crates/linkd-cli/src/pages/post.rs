//! A single post with its comments.

use crossterm::event::{KeyCode, KeyEvent};
use linkd_core::{
  post::{Comment, CommentBody, Post},
  user::Id,
};

use super::{Outcome, TextField};
use crate::{
  app::Screen,
  client::{ApiClient, ApiRequest},
};

#[derive(Debug, Clone)]
pub struct PostPage {
  pub id:      Id,
  pub post:    Option<Post>,
  /// Open while the user is typing a comment.
  pub comment: Option<TextField>,
  pub scroll:  usize,
  pub error:   Option<String>,
  pub loading: bool,
  /// Where Esc goes.
  pub back:    Screen,
}

impl PostPage {
  pub fn new(id: Id, back: Screen) -> Self {
    Self { id, post: None, comment: None, scroll: 0, error: None, loading: false, back }
  }

  pub async fn load(&mut self, client: &ApiClient) -> Outcome {
    self.loading = true;
    let result = client
      .fetch::<Post>(ApiRequest::get(format!("/api/v1/feed/posts/{}", self.id)))
      .await;
    self.loading = false;

    match result {
      Ok(post) => {
        self.post = Some(post);
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

  /// Post the typed comment and append it. Blank input just closes the box.
  pub async fn submit_comment(&mut self, client: &ApiClient) {
    let Some(content) = self.comment.as_ref().map(|f| f.trimmed().to_owned()) else {
      return;
    };
    if content.is_empty() {
      self.comment = None;
      return;
    }
    let req = ApiRequest::post(format!("/api/v1/feed/posts/{}/comments", self.id))
      .json(&CommentBody { content });
    client
      .request(
        req,
        self,
        |page, comment: Comment| {
          if let Some(post) = page.post.as_mut() {
            post.comments.push(comment);
          }
          page.comment = None;
          page.error = None;
        },
        |page, message| page.error = Some(message),
      )
      .await;
  }

  pub async fn toggle_like(&mut self, client: &ApiClient) {
    client
      .request(
        ApiRequest::put(format!("/api/v1/feed/posts/{}/like", self.id)),
        self,
        |page, post: Post| page.post = Some(post),
        |page, message| page.error = Some(message),
      )
      .await;
  }

  /// Delete the post (the server only allows its author) and go back.
  pub async fn delete_post(&mut self, client: &ApiClient) -> Outcome {
    let mut deleted = false;
    client
      .request(
        ApiRequest::delete(format!("/api/v1/feed/posts/{}", self.id)),
        &mut (&mut *self, &mut deleted),
        |(_, deleted), ()| **deleted = true,
        |(page, _), message| page.error = Some(message),
      )
      .await;
    if deleted { Outcome::Navigate(self.back.clone()) } else { Outcome::Stay }
  }

  pub async fn handle_key(&mut self, key: KeyEvent, client: &ApiClient) -> Outcome {
    if let Some(field) = self.comment.as_mut() {
      match key.code {
        KeyCode::Esc => self.comment = None,
        KeyCode::Enter => self.submit_comment(client).await,
        _ => {
          field.input(key);
        }
      }
      return Outcome::Stay;
    }

    match key.code {
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        return Outcome::Navigate(self.back.clone());
      }
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.post.as_ref().map_or(0, |p| p.comments.len());
        if self.scroll + 1 < len {
          self.scroll += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
      KeyCode::Char('c') => {
        self.comment = Some(TextField::default());
        self.error = None;
      }
      KeyCode::Char('l') => self.toggle_like(client).await,
      KeyCode::Char('d') => return self.delete_post(client).await,
      KeyCode::Char('r') => return self.load(client).await,
      _ => {}
    }
    Outcome::Stay
  }
}
