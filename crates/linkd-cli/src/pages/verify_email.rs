//! Email verification: enter the mailed code, or ask for a new one.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use linkd_core::wire::MessageBody;

use super::{Outcome, TextField};
use crate::{
  app::Screen,
  client::{ApiClient, ApiRequest},
};

pub const VALIDATE_PATH: &str = "/api/v1/authentication/validate-email-verification-token";
pub const RESEND_PATH: &str = "/api/v1/authentication/send-email-verification-token";

#[derive(Debug, Clone, Default)]
pub struct VerifyEmailPage {
  pub code:    TextField,
  pub error:   Option<String>,
  pub notice:  Option<String>,
  pub loading: bool,
  verified:    bool,
}

impl VerifyEmailPage {
  pub async fn handle_key(&mut self, key: KeyEvent, client: &ApiClient) -> Outcome {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
      self.resend(client).await;
      return Outcome::Stay;
    }
    match key.code {
      KeyCode::Enter => return self.submit(client).await,
      KeyCode::Esc => return Outcome::Navigate(Screen::Feed),
      _ => {
        if self.code.input(key) {
          self.error = None;
        }
      }
    }
    Outcome::Stay
  }

  pub async fn submit(&mut self, client: &ApiClient) -> Outcome {
    if self.loading {
      return Outcome::Stay;
    }
    self.loading = true;
    self.error = None;
    let req = ApiRequest::put(VALIDATE_PATH).query("token", self.code.trimmed());
    client
      .request(
        req,
        self,
        |page, _: MessageBody| page.verified = true,
        |page, message| page.error = Some(message),
      )
      .await;
    self.loading = false;

    if self.verified { Outcome::Navigate(Screen::Feed) } else { Outcome::Stay }
  }

  pub async fn resend(&mut self, client: &ApiClient) {
    self.error = None;
    self.notice = None;
    client
      .request(
        ApiRequest::get(RESEND_PATH),
        self,
        |page, body: MessageBody| page.notice = Some(body.message),
        |page, message| page.error = Some(message),
      )
      .await;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, put},
  };
  use serde_json::json;

  use crate::testing::{client_for, serve};

  #[tokio::test]
  async fn expired_code_is_reported_then_resend_confirms() {
    let app = Router::new()
      .route(
        VALIDATE_PATH,
        put(|| async {
          (StatusCode::BAD_REQUEST, Json(json!({ "message": "Email verification token expired." })))
        }),
      )
      .route(
        RESEND_PATH,
        get(|| async { Json(json!({ "message": "Email verification token sent successfully." })) }),
      );
    let client = client_for(serve(app).await);
    let mut page = VerifyEmailPage::default();
    page.code.value = "12345".into();

    assert_eq!(page.submit(&client).await, Outcome::Stay);
    assert_eq!(page.error.as_deref(), Some("Email verification token expired."));

    page.resend(&client).await;
    assert!(page.error.is_none());
    assert_eq!(page.notice.as_deref(), Some("Email verification token sent successfully."));
  }

  #[tokio::test]
  async fn valid_code_goes_to_the_feed() {
    let app = Router::new().route(
      VALIDATE_PATH,
      put(|| async {
        (StatusCode::ACCEPTED, Json(json!({ "message": "Email verified successfully." })))
      }),
    );
    let client = client_for(serve(app).await);
    let mut page = VerifyEmailPage::default();
    page.code.value = "12345".into();

    assert_eq!(page.submit(&client).await, Outcome::Navigate(Screen::Feed));
  }
}
