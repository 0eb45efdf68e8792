//! Signup: same form as login, `POST /authentication/register`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{CredentialsForm, Outcome};
use crate::{app::Screen, client::ApiClient};

pub const REGISTER_PATH: &str = "/api/v1/authentication/register";

#[derive(Debug, Clone, Default)]
pub struct SignupPage {
  pub form: CredentialsForm,
}

impl SignupPage {
  pub async fn handle_key(&mut self, key: KeyEvent, client: &ApiClient) -> Outcome {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
      return match key.code {
        KeyCode::Char('l') => Outcome::Navigate(Screen::Login),
        _ => Outcome::Stay,
      };
    }
    match key.code {
      KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => self.form.cycle_focus(),
      KeyCode::Enter => return self.submit(client).await,
      KeyCode::Esc => return Outcome::Navigate(Screen::Login),
      _ => {
        self.form.focused_mut().input(key);
      }
    }
    Outcome::Stay
  }

  /// A new account always lands on the feed.
  pub async fn submit(&mut self, client: &ApiClient) -> Outcome {
    match self.form.submit(client, REGISTER_PATH).await {
      Outcome::Authenticated => Outcome::Navigate(Screen::Feed),
      other => other,
    }
  }
}
