//! Password reset in two steps: request a code by email, then submit the code
//! with a new password.

use crossterm::event::{KeyCode, KeyEvent};
use linkd_core::wire::MessageBody;

use super::{Outcome, TextField};
use crate::{
  app::Screen,
  client::{ApiClient, ApiRequest},
};

pub const SEND_TOKEN_PATH: &str = "/api/v1/authentication/send-password-reset-token";
pub const RESET_PATH: &str = "/api/v1/authentication/reset-password";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Step {
  #[default]
  RequestCode,
  Reset,
  Done,
}

#[derive(Debug, Clone)]
pub struct ResetPasswordPage {
  pub step:         Step,
  pub email:        TextField,
  pub code:         TextField,
  pub new_password: TextField,
  /// Focus within step two: `0` is the code, `1` the new password.
  pub focus:        usize,
  pub error:        Option<String>,
  /// Confirmation from the server after a code was sent.
  pub notice:       Option<String>,
  pub loading:      bool,
}

impl Default for ResetPasswordPage {
  fn default() -> Self {
    Self {
      step:         Step::RequestCode,
      email:        TextField::default(),
      code:         TextField::default(),
      new_password: TextField::masked(),
      focus:        0,
      error:        None,
      notice:       None,
      loading:      false,
    }
  }
}

impl ResetPasswordPage {
  pub async fn handle_key(&mut self, key: KeyEvent, client: &ApiClient) -> Outcome {
    match (self.step, key.code) {
      (_, KeyCode::Enter) => return self.submit(client).await,
      (Step::RequestCode, KeyCode::Esc) => return Outcome::Navigate(Screen::Login),
      (Step::Reset, KeyCode::Esc) => self.back(),
      (Step::Reset, KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down) => {
        self.focus = (self.focus + 1) % 2;
        self.error = None;
      }
      (Step::RequestCode, _) => {
        self.email.input(key);
      }
      (Step::Reset, _) => {
        let field = if self.focus == 0 { &mut self.code } else { &mut self.new_password };
        field.input(key);
      }
      (Step::Done, _) => {}
    }
    Outcome::Stay
  }

  /// Return to step one and clear the error.
  pub fn back(&mut self) {
    self.step = Step::RequestCode;
    self.error = None;
    self.notice = None;
    self.code.clear();
    self.new_password.clear();
    self.focus = 0;
  }

  pub async fn submit(&mut self, client: &ApiClient) -> Outcome {
    if self.loading {
      return Outcome::Stay;
    }
    self.loading = true;
    self.error = None;

    let req = match self.step {
      Step::RequestCode => ApiRequest::put(SEND_TOKEN_PATH).query("email", self.email.trimmed()),
      Step::Reset => ApiRequest::put(RESET_PATH)
        .query("email", self.email.trimmed())
        .query("token", self.code.trimmed())
        .query("newPassword", &self.new_password.value),
      Step::Done => {
        self.loading = false;
        return Outcome::Navigate(Screen::Login);
      }
    };
    client
      .request(
        req,
        self,
        |page, body: MessageBody| {
          page.notice = Some(body.message);
          page.step = match page.step {
            Step::RequestCode => Step::Reset,
            _ => Step::Done,
          };
        },
        |page, message| page.error = Some(message),
      )
      .await;
    self.loading = false;

    if self.step == Step::Done { Outcome::Navigate(Screen::Login) } else { Outcome::Stay }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  use axum::{Json, Router, extract::Query, http::StatusCode, routing::put};
  use serde_json::json;

  use crate::testing::{client_for, serve};

  fn app() -> Router {
    Router::new()
      .route(
        SEND_TOKEN_PATH,
        put(|Query(q): Query<HashMap<String, String>>| async move {
          if q.get("email").map(String::as_str) == Some("ada@example.com") {
            (StatusCode::OK, Json(json!({ "message": "Password reset token sent to ada@example.com" })))
          } else {
            (StatusCode::BAD_REQUEST, Json(json!({ "message": "User not found." })))
          }
        }),
      )
      .route(
        RESET_PATH,
        put(|Query(q): Query<HashMap<String, String>>| async move {
          if q.get("token").map(String::as_str) == Some("12345")
            && q.get("newPassword").map(String::as_str) == Some("new pw")
          {
            (StatusCode::OK, Json(json!({ "message": "Password reset successful." })))
          } else {
            (StatusCode::BAD_REQUEST, Json(json!({ "message": "Password reset token failed." })))
          }
        }),
      )
  }

  #[tokio::test]
  async fn two_steps_then_login() {
    let client = client_for(serve(app()).await);
    let mut page = ResetPasswordPage::default();
    page.email.value = "ada@example.com".into();

    assert_eq!(page.submit(&client).await, Outcome::Stay);
    assert_eq!(page.step, Step::Reset);

    page.code.value = "00000".into();
    page.new_password.value = "new pw".into();
    assert_eq!(page.submit(&client).await, Outcome::Stay);
    assert_eq!(page.error.as_deref(), Some("Password reset token failed."));
    assert_eq!(page.step, Step::Reset);

    page.code.value = "12345".into();
    assert_eq!(page.submit(&client).await, Outcome::Navigate(Screen::Login));
  }

  #[tokio::test]
  async fn unknown_email_stays_on_step_one() {
    let client = client_for(serve(app()).await);
    let mut page = ResetPasswordPage::default();
    page.email.value = "nobody@example.com".into();

    page.submit(&client).await;
    assert_eq!(page.step, Step::RequestCode);
    assert_eq!(page.error.as_deref(), Some("User not found."));
  }

  #[test]
  fn back_clears_the_error() {
    let mut page = ResetPasswordPage {
      step: Step::Reset,
      error: Some("Password reset token expired.".into()),
      ..Default::default()
    };
    page.back();
    assert_eq!(page.step, Step::RequestCode);
    assert!(page.error.is_none());
  }
}
