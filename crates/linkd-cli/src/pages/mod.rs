//! View components. Each page owns its local state and the async actions that
//! change it; [`App`](crate::app::App) decides which page is on screen.

pub mod feed;
pub mod login;
pub mod notifications;
pub mod post;
pub mod reset_password;
pub mod signup;
pub mod verify_email;

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use linkd_core::wire::{AuthResponse, Credentials};

use crate::{
  app::Screen,
  client::{ApiClient, ApiRequest},
};

// ─── Outcome ──────────────────────────────────────────────────────────────────

/// What the app should do after a page loads or handles input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
  Stay,
  Navigate(Screen),
  /// A token was stored; go back to wherever the user was sent from.
  Authenticated,
  /// A load came back 401.
  Unauthorized,
}

// ─── Text input ───────────────────────────────────────────────────────────────

/// A single-line text input.
#[derive(Debug, Clone, Default)]
pub struct TextField {
  pub value:  String,
  pub masked: bool,
}

impl TextField {
  pub fn masked() -> Self { Self { value: String::new(), masked: true } }

  /// Apply an editing key. Returns `false` if the key is not an edit.
  pub fn input(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char(c) => self.value.push(c),
      KeyCode::Backspace => {
        self.value.pop();
      }
      _ => return false,
    }
    true
  }

  /// The value as it should appear on screen.
  pub fn display(&self) -> String {
    if self.masked { "*".repeat(self.value.chars().count()) } else { self.value.clone() }
  }

  pub fn trimmed(&self) -> &str { self.value.trim() }

  pub fn clear(&mut self) { self.value.clear(); }
}

// ─── Credentials form ─────────────────────────────────────────────────────────

/// Email and password form shared by login and signup.
#[derive(Debug, Clone)]
pub struct CredentialsForm {
  pub email:    TextField,
  pub password: TextField,
  /// `0` is email, `1` is password.
  pub focus:    usize,
  pub error:    Option<String>,
  pub loading:  bool,
  issued:       Option<String>,
}

impl Default for CredentialsForm {
  fn default() -> Self {
    Self {
      email:    TextField::default(),
      password: TextField::masked(),
      focus:    0,
      error:    None,
      loading:  false,
      issued:   None,
    }
  }
}

impl CredentialsForm {
  /// Move to the other field. Focusing a field clears the error.
  pub fn cycle_focus(&mut self) {
    self.focus = (self.focus + 1) % 2;
    self.error = None;
  }

  pub fn focused_mut(&mut self) -> &mut TextField {
    if self.focus == 0 { &mut self.email } else { &mut self.password }
  }

  /// Post the credentials to `path` and store the returned token.
  pub async fn submit(&mut self, client: &ApiClient, path: &str) -> Outcome {
    if self.loading {
      return Outcome::Stay;
    }
    self.loading = true;
    self.error = None;

    let body = Credentials {
      email:    self.email.trimmed().to_owned(),
      password: self.password.value.clone(),
    };
    client
      .request(
        ApiRequest::post(path).json(&body),
        self,
        |form, resp: AuthResponse| form.issued = Some(resp.token),
        |form, message| form.error = Some(message),
      )
      .await;
    self.loading = false;

    let Some(token) = self.issued.take() else {
      return Outcome::Stay;
    };
    match client.tokens().save(&token) {
      Ok(()) => {
        self.password.clear();
        Outcome::Authenticated
      }
      Err(e) => {
        tracing::warn!(error = %e, "failed to persist token");
        self.error = Some(e.to_string());
        Outcome::Stay
      }
    }
  }
}

// ─── Formatting ───────────────────────────────────────────────────────────────

/// Short relative age of `then` as seen at `now`.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
  let secs = (now - then).num_seconds().max(0);
  match secs {
    0..60 => "just now".to_owned(),
    60..3_600 => format!("{}m ago", secs / 60),
    3_600..86_400 => format!("{}h ago", secs / 3_600),
    86_400..604_800 => format!("{}d ago", secs / 86_400),
    _ => then.format("%Y-%m-%d").to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;
  use crossterm::event::KeyModifiers;

  #[test]
  fn relative_time_buckets() {
    let now = Utc::now();
    assert_eq!(relative_time(now, now), "just now");
    assert_eq!(relative_time(now - Duration::minutes(5), now), "5m ago");
    assert_eq!(relative_time(now - Duration::hours(3), now), "3h ago");
    assert_eq!(relative_time(now - Duration::days(2), now), "2d ago");
    let old = now - Duration::days(30);
    assert_eq!(relative_time(old, now), old.format("%Y-%m-%d").to_string());
  }

  #[test]
  fn masked_fields_hide_their_value() {
    let mut field = TextField::masked();
    for c in "pw1".chars() {
      field.input(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
    }
    assert_eq!(field.value, "pw1");
    assert_eq!(field.display(), "***");
    field.input(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE));
    assert_eq!(field.value, "pw");
  }

  #[test]
  fn focusing_a_field_clears_the_error() {
    let mut form = CredentialsForm { error: Some("bad".into()), ..Default::default() };
    form.cycle_focus();
    assert_eq!(form.focus, 1);
    assert!(form.error.is_none());
  }
}
