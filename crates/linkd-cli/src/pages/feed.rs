//! The feed: posts by other members (or everyone), a composer for new posts,
//! likes, and a fuzzy filter.

use crossterm::event::{KeyCode, KeyEvent};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use linkd_core::post::{NewPost, Post};

use super::{Outcome, TextField};
use crate::{
  app::Screen,
  client::{ApiClient, ApiRequest},
};

pub const PAGE_SIZE: usize = 20;

// ─── Tabs ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedTab {
  /// Posts by everyone except the caller.
  #[default]
  Feed,
  All,
}

impl FeedTab {
  pub fn path(self) -> &'static str {
    match self {
      Self::Feed => "/api/v1/feed",
      Self::All => "/api/v1/feed/posts",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Feed => "Feed",
      Self::All => "All",
    }
  }

  pub fn toggled(self) -> Self {
    match self {
      Self::Feed => Self::All,
      Self::All => Self::Feed,
    }
  }
}

// ─── Composer ─────────────────────────────────────────────────────────────────

/// The new-post modal.
#[derive(Debug, Clone, Default)]
pub struct Composer {
  pub content: TextField,
  pub picture: TextField,
  /// `0` is the content, `1` the picture URL.
  pub focus:   usize,
}

// ─── Page ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FeedPage {
  pub tab:           FeedTab,
  pub posts:         Vec<Post>,
  /// Position within the filtered list.
  pub cursor:        usize,
  pub offset:        usize,
  pub limit:         usize,
  pub filter:        String,
  pub filter_active: bool,
  pub composer:      Option<Composer>,
  pub error:         Option<String>,
  pub loading:       bool,
}

impl Default for FeedPage {
  fn default() -> Self {
    Self {
      tab:           FeedTab::Feed,
      posts:         Vec::new(),
      cursor:        0,
      offset:        0,
      limit:         PAGE_SIZE,
      filter:        String::new(),
      filter_active: false,
      composer:      None,
      error:         None,
      loading:       false,
    }
  }
}

impl FeedPage {
  // ── Data loading ──────────────────────────────────────────────────────────

  /// Load the current tab and page.
  pub async fn load(&mut self, client: &ApiClient) -> Outcome {
    self.loading = true;
    let req = ApiRequest::get(self.tab.path())
      .query("limit", self.limit)
      .query("offset", self.offset);
    let result = client.fetch::<Vec<Post>>(req).await;
    self.loading = false;

    match result {
      Ok(posts) => {
        self.posts = posts;
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

  pub async fn switch_tab(&mut self, client: &ApiClient) -> Outcome {
    self.tab = self.tab.toggled();
    self.offset = 0;
    self.load(client).await
  }

  pub async fn next_page(&mut self, client: &ApiClient) -> Outcome {
    if self.posts.len() < self.limit {
      return Outcome::Stay;
    }
    self.offset += self.limit;
    self.load(client).await
  }

  pub async fn prev_page(&mut self, client: &ApiClient) -> Outcome {
    if self.offset == 0 {
      return Outcome::Stay;
    }
    self.offset = self.offset.saturating_sub(self.limit);
    self.load(client).await
  }

  // ── Filtered list ─────────────────────────────────────────────────────────

  /// Posts whose author name or content match the filter.
  pub fn filtered_posts(&self) -> Vec<&Post> {
    if self.filter.is_empty() {
      return self.posts.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    self
      .posts
      .iter()
      .filter(|p| {
        matcher
          .fuzzy_match(&p.author.display_name(), &self.filter)
          .is_some()
          || matcher.fuzzy_match(&p.content, &self.filter).is_some()
      })
      .collect()
  }

  pub fn cursor_post(&self) -> Option<&Post> { self.filtered_posts().get(self.cursor).copied() }

  // ── Actions ───────────────────────────────────────────────────────────────

  pub fn open_composer(&mut self) {
    self.composer = Some(Composer::default());
    self.error = None;
  }

  /// Publish the composer's post. Blank content just closes the composer.
  pub async fn submit_post(&mut self, client: &ApiClient) {
    let Some(composer) = self.composer.as_ref() else {
      return;
    };
    let content = composer.content.trimmed().to_owned();
    if content.is_empty() {
      self.composer = None;
      return;
    }
    let picture = Some(composer.picture.trimmed().to_owned()).filter(|p| !p.is_empty());

    self.loading = true;
    client
      .request(
        ApiRequest::post("/api/v1/feed/posts").json(&NewPost { content, picture }),
        self,
        |page, post: Post| {
          page.posts.insert(0, post);
          page.cursor = 0;
          page.composer = None;
          page.error = None;
        },
        |page, message| page.error = Some(message),
      )
      .await;
    self.loading = false;
  }

  /// Toggle the like on the post under the cursor and swap in the result.
  pub async fn toggle_like(&mut self, client: &ApiClient) {
    let Some(id) = self.cursor_post().map(|p| p.id) else {
      return;
    };
    client
      .request(
        ApiRequest::put(format!("/api/v1/feed/posts/{id}/like")),
        self,
        |page, post: Post| {
          if let Some(slot) = page.posts.iter_mut().find(|p| p.id == post.id) {
            *slot = post;
          }
        },
        |page, message| page.error = Some(message),
      )
      .await;
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  pub async fn handle_key(&mut self, key: KeyEvent, client: &ApiClient) -> Outcome {
    if self.composer.is_some() {
      self.handle_composer_key(key, client).await;
      return Outcome::Stay;
    }
    if self.filter_active {
      self.handle_filter_key(key);
      return Outcome::Stay;
    }

    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        if self.cursor + 1 < self.filtered_posts().len() {
          self.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.cursor = self.cursor.saturating_sub(1);
      }
      KeyCode::Enter => {
        if let Some(id) = self.cursor_post().map(|p| p.id) {
          return Outcome::Navigate(Screen::PostDetail(id));
        }
      }
      KeyCode::Tab => return self.switch_tab(client).await,
      KeyCode::Char(']') | KeyCode::PageDown => return self.next_page(client).await,
      KeyCode::Char('[') | KeyCode::PageUp => return self.prev_page(client).await,
      KeyCode::Char('r') => return self.load(client).await,
      KeyCode::Char('l') => self.toggle_like(client).await,
      KeyCode::Char('c') => self.open_composer(),
      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.cursor = 0;
      }
      KeyCode::Char('n') => return Outcome::Navigate(Screen::Notifications),
      KeyCode::Char('v') => return Outcome::Navigate(Screen::VerifyEmail),
      KeyCode::Char('L') => {
        if let Err(e) = client.tokens().clear() {
          tracing::warn!(error = %e, "failed to clear token");
        }
        return Outcome::Navigate(Screen::Login);
      }
      _ => {}
    }
    Outcome::Stay
  }

  async fn handle_composer_key(&mut self, key: KeyEvent, client: &ApiClient) {
    match key.code {
      KeyCode::Esc => self.composer = None,
      KeyCode::Enter => self.submit_post(client).await,
      KeyCode::Tab | KeyCode::BackTab => {
        if let Some(c) = self.composer.as_mut() {
          c.focus = (c.focus + 1) % 2;
        }
      }
      _ => {
        if let Some(c) = self.composer.as_mut() {
          let field = if c.focus == 0 { &mut c.content } else { &mut c.picture };
          field.input(key);
        }
      }
    }
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
      }
      KeyCode::Enter => self.filter_active = false,
      KeyCode::Backspace => {
        self.filter.pop();
      }
      KeyCode::Char(c) => self.filter.push(c),
      _ => {}
    }
    self.cursor = 0;
  }
}
