//! Application state machine and event dispatcher.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use linkd_core::user::Id;

use crate::{
  client::ApiClient,
  pages::{
    Outcome, feed::FeedPage, login::LoginPage, notifications::NotificationsPage, post::PostPage,
    reset_password::ResetPasswordPage, signup::SignupPage, verify_email::VerifyEmailPage,
  },
};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
  Login,
  Signup,
  ResetPassword,
  VerifyEmail,
  Feed,
  PostDetail(Id),
  Notifications,
}

impl Screen {
  pub fn title(&self) -> &'static str {
    match self {
      Screen::Login => "Sign in",
      Screen::Signup => "Join linkd",
      Screen::ResetPassword => "Reset password",
      Screen::VerifyEmail => "Verify email",
      Screen::Feed => "Feed",
      Screen::PostDetail(_) => "Post",
      Screen::Notifications => "Notifications",
    }
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state. Each page's state is rebuilt when the page is
/// mounted.
pub struct App {
  pub screen: Screen,

  /// Where to go after a successful login.
  pub redirect_from: Option<Screen>,

  pub login:         LoginPage,
  pub signup:        SignupPage,
  pub reset:         ResetPasswordPage,
  pub verify:        VerifyEmailPage,
  pub feed:          FeedPage,
  pub notifications: NotificationsPage,
  pub post:          Option<PostPage>,

  pub client: ApiClient,
}

impl App {
  pub fn new(client: ApiClient) -> Self {
    Self {
      screen: Screen::Login,
      redirect_from: None,
      login: LoginPage::default(),
      signup: SignupPage::default(),
      reset: ResetPasswordPage::default(),
      verify: VerifyEmailPage::default(),
      feed: FeedPage::default(),
      notifications: NotificationsPage::default(),
      post: None,
      client,
    }
  }

  /// The first screen: the feed if a token is stored, else login.
  pub async fn start(&mut self) {
    let first = if self.client.tokens().load().is_some() { Screen::Feed } else { Screen::Login };
    self.navigate(first).await;
  }

  // ── Navigation ────────────────────────────────────────────────────────────

  /// Mount `target`, following any redirect its load produces.
  pub async fn navigate(&mut self, mut target: Screen) {
    loop {
      match self.mount(target.clone()).await {
        Outcome::Stay => return,
        Outcome::Navigate(next) => target = next,
        Outcome::Authenticated => target = self.redirect_from.take().unwrap_or(Screen::Feed),
        Outcome::Unauthorized => {
          tracing::info!(screen = ?target, "session rejected; redirecting to login");
          self.redirect_from = Some(target);
          target = Screen::Login;
        }
      }
    }
  }

  async fn mount(&mut self, screen: Screen) -> Outcome {
    let previous = std::mem::replace(&mut self.screen, screen.clone());
    match screen {
      Screen::Login => {
        self.login = LoginPage::default();
        Outcome::Stay
      }
      Screen::Signup => {
        self.signup = SignupPage::default();
        Outcome::Stay
      }
      Screen::ResetPassword => {
        self.reset = ResetPasswordPage::default();
        Outcome::Stay
      }
      Screen::VerifyEmail => {
        self.verify = VerifyEmailPage::default();
        Outcome::Stay
      }
      Screen::Feed => {
        self.feed = FeedPage::default();
        self.feed.load(&self.client).await
      }
      Screen::Notifications => {
        self.notifications = NotificationsPage::default();
        self.notifications.load(&self.client).await
      }
      Screen::PostDetail(id) => {
        let back = match previous {
          Screen::Notifications => Screen::Notifications,
          _ => Screen::Feed,
        };
        let page = self.post.insert(PostPage::new(id, back));
        page.load(&self.client).await
      }
    }
  }

  /// Apply a page's outcome. 401 sends the user to login and remembers the
  /// current screen.
  async fn follow(&mut self, outcome: Outcome) {
    match outcome {
      Outcome::Stay => {}
      Outcome::Navigate(next) => self.navigate(next).await,
      Outcome::Authenticated => {
        let next = self.redirect_from.take().unwrap_or(Screen::Feed);
        self.navigate(next).await;
      }
      Outcome::Unauthorized => {
        self.redirect_from = Some(self.screen.clone());
        self.navigate(Screen::Login).await;
      }
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Whether the current page is capturing text, so `q` must not quit.
  pub fn typing(&self) -> bool {
    match self.screen {
      Screen::Login | Screen::Signup | Screen::ResetPassword | Screen::VerifyEmail => true,
      Screen::Feed => self.feed.composer.is_some() || self.feed.filter_active,
      Screen::PostDetail(_) => self.post.as_ref().is_some_and(|p| p.comment.is_some()),
      Screen::Notifications => false,
    }
  }

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }
    if key.code == KeyCode::Char('q') && !self.typing() {
      return Ok(false);
    }

    let client = &self.client;
    let outcome = match self.screen {
      Screen::Login => self.login.handle_key(key, client).await,
      Screen::Signup => self.signup.handle_key(key, client).await,
      Screen::ResetPassword => self.reset.handle_key(key, client).await,
      Screen::VerifyEmail => self.verify.handle_key(key, client).await,
      Screen::Feed => self.feed.handle_key(key, client).await,
      Screen::Notifications => self.notifications.handle_key(key, client).await,
      Screen::PostDetail(_) => match self.post.as_mut() {
        Some(page) => page.handle_key(key, client).await,
        None => Outcome::Navigate(Screen::Feed),
      },
    };
    self.follow(outcome).await;
    Ok(true)
  }
}
