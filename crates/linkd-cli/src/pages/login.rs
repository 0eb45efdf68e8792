//! Login: email and password, `POST /authentication/login`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{CredentialsForm, Outcome};
use crate::{app::Screen, client::ApiClient};

pub const LOGIN_PATH: &str = "/api/v1/authentication/login";

#[derive(Debug, Clone, Default)]
pub struct LoginPage {
  pub form: CredentialsForm,
}

impl LoginPage {
  pub async fn handle_key(&mut self, key: KeyEvent, client: &ApiClient) -> Outcome {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
      return match key.code {
        KeyCode::Char('n') => Outcome::Navigate(Screen::Signup),
        KeyCode::Char('r') => Outcome::Navigate(Screen::ResetPassword),
        _ => Outcome::Stay,
      };
    }
    match key.code {
      KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => self.form.cycle_focus(),
      KeyCode::Enter => return self.submit(client).await,
      _ => {
        self.form.focused_mut().input(key);
      }
    }
    Outcome::Stay
  }

  pub async fn submit(&mut self, client: &ApiClient) -> Outcome {
    self.form.submit(client, LOGIN_PATH).await
  }
}
