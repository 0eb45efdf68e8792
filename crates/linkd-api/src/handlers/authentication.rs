//! Handlers for `/authentication` endpoints.
//!
//! | Method   | Path | Auth | Notes |
//! |----------|------|------|-------|
//! | `POST`   | `/login` | no | Body: [`Credentials`]; returns [`AuthResponse`] |
//! | `POST`   | `/register` | no | Body: [`Credentials`]; mails a verification code |
//! | `GET`    | `/user` | yes | The caller |
//! | `DELETE` | `/delete` | yes | Deletes the caller and everything they own |
//! | `PUT`    | `/profile` | yes | Body: [`ProfileUpdate`] |
//! | `PUT`    | `/validate-email-verification-token?token=` | yes | |
//! | `GET`    | `/send-email-verification-token` | yes | |
//! | `PUT`    | `/send-password-reset-token?email=` | no | |
//! | `PUT`    | `/reset-password?email=&token=&newPassword=` | no | |

use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use linkd_core::{
  store::{CodeKind, SocialStore},
  user::{ProfileUpdate, User},
  wire::{AuthResponse, Credentials, MessageBody},
};
use serde::Deserialize;

use crate::{
  AppState,
  accounts::{CodeCheck, check_code, generate_code, hash_secret, normalize_email, pending_code, verify_secret},
  auth::{AuthUser, issue_token, token_digest},
  error::ApiError,
  extract::{Json, Query},
};

// ─── Helpers ──────────────────────────────────────────────────────────────────

async fn open_session<S: SocialStore>(state: &AppState<S>, user_id: i64) -> Result<String, ApiError> {
  let token = issue_token();
  state
    .store
    .create_session(user_id, token_digest(&token))
    .await
    .map_err(ApiError::store)?;
  Ok(token)
}

/// Store a fresh code of `kind` for `user` and mail it. Mail failures are
/// logged only.
async fn send_code<S: SocialStore>(
  state: &AppState<S>,
  user: &User,
  kind: CodeKind,
) -> Result<(), ApiError> {
  let code = generate_code();
  let ttl = state.settings.code_ttl;
  let pending = pending_code(&code, ttl, Utc::now())?;
  state
    .store
    .set_code(user.id, kind, Some(pending))
    .await
    .map_err(ApiError::store)?;

  let minutes = ttl.num_minutes();
  let (subject, body) = match kind {
    CodeKind::EmailVerification => (
      "Email Verification",
      format!(
        "Only one step to take full advantage of linkd.\n\n\
         Enter this code to verify your email: {code}\n\n\
         The code will expire in {minutes} minutes."
      ),
    ),
    CodeKind::PasswordReset => (
      "Password Reset",
      format!(
        "You requested a password reset.\n\n\
         Enter this code to reset your password: {code}\n\n\
         The code will expire in {minutes} minutes."
      ),
    ),
  };
  if let Err(e) = state.mailer.send(&user.email, subject, &body) {
    tracing::warn!(error = %e, user_id = user.id, "error while sending email");
  }
  Ok(())
}

fn validated(body: Credentials) -> Result<Credentials, ApiError> {
  if let Some(errors) = body.validation_errors() {
    return Err(ApiError::BadRequest(errors));
  }
  Ok(Credentials { email: normalize_email(&body.email), password: body.password })
}

// ─── Login / register ─────────────────────────────────────────────────────────

/// `POST /authentication/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<Credentials>,
) -> Result<Json<AuthResponse>, ApiError>
where
  S: SocialStore + 'static,
{
  let body = validated(body)?;
  let account = state
    .store
    .find_account(&body.email)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::BadRequest("User not found.".into()))?;

  if !verify_secret(&body.password, &account.password_hash) {
    return Err(ApiError::BadRequest("Password is incorrect.".into()));
  }

  let token = open_session(&state, account.user.id).await?;
  tracing::info!(user_id = account.user.id, "login");
  Ok(Json(AuthResponse { token, message: "Authentication succeeded.".into() }))
}

/// `POST /authentication/register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<Credentials>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError>
where
  S: SocialStore + 'static,
{
  let body = validated(body)?;
  let existing = state
    .store
    .find_account(&body.email)
    .await
    .map_err(ApiError::store)?;
  if existing.is_some() {
    return Err(ApiError::Conflict("Email is already registered.".into()));
  }

  let password_hash = hash_secret(&body.password)?;
  let user = state
    .store
    .create_user(&body.email, &password_hash)
    .await
    .map_err(ApiError::store)?;

  send_code(&state, &user, CodeKind::EmailVerification).await?;
  let token = open_session(&state, user.id).await?;
  tracing::info!(user_id = user.id, "registered");
  Ok((
    StatusCode::CREATED,
    Json(AuthResponse { token, message: "User registered successfully.".into() }),
  ))
}

// ─── Current user ─────────────────────────────────────────────────────────────

/// `GET /authentication/user`
pub async fn current_user<S>(
  State(_state): State<AppState<S>>,
  AuthUser(user): AuthUser,
) -> Json<User>
where
  S: SocialStore + 'static,
{
  Json(user)
}

/// `DELETE /authentication/delete`
pub async fn delete_account<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
) -> Result<Json<MessageBody>, ApiError>
where
  S: SocialStore + 'static,
{
  state.store.delete_user(user.id).await.map_err(ApiError::store)?;
  tracing::info!(user_id = user.id, "account deleted");
  Ok(Json(MessageBody::new("User deleted successfully.")))
}

/// `PUT /authentication/profile`
pub async fn update_profile<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Json(update): Json<ProfileUpdate>,
) -> Result<Json<User>, ApiError>
where
  S: SocialStore + 'static,
{
  let user = state
    .store
    .update_profile(user.id, update)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(user))
}

// ─── Email verification ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TokenParams {
  pub token: String,
}

/// `PUT /authentication/validate-email-verification-token?token=<code>`
pub async fn validate_email_verification_token<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Query(params): Query<TokenParams>,
) -> Result<(StatusCode, Json<MessageBody>), ApiError>
where
  S: SocialStore + 'static,
{
  let account = state
    .store
    .find_account(&user.email)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthorized)?;

  match check_code(account.email_verification.as_ref(), params.token.trim(), Utc::now()) {
    CodeCheck::Valid => {
      state
        .store
        .mark_email_verified(user.id)
        .await
        .map_err(ApiError::store)?;
      Ok((StatusCode::ACCEPTED, Json(MessageBody::new("Email verified successfully."))))
    }
    CodeCheck::Expired => Err(ApiError::BadRequest("Email verification token expired.".into())),
    CodeCheck::Invalid => Err(ApiError::BadRequest("Email verification token failed.".into())),
  }
}

/// `GET /authentication/send-email-verification-token`
pub async fn send_email_verification_token<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
) -> Result<Json<MessageBody>, ApiError>
where
  S: SocialStore + 'static,
{
  if user.email_verified {
    return Err(ApiError::BadRequest(
      "Email verification token failed, or email is already verified.".into(),
    ));
  }
  send_code(&state, &user, CodeKind::EmailVerification).await?;
  Ok(Json(MessageBody::new("Email verification token sent successfully.")))
}

// ─── Password reset ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EmailParams {
  pub email: String,
}

/// `PUT /authentication/send-password-reset-token?email=<email>`
pub async fn send_password_reset_token<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<EmailParams>,
) -> Result<Json<MessageBody>, ApiError>
where
  S: SocialStore + 'static,
{
  let email = normalize_email(&params.email);
  let account = state
    .store
    .find_account(&email)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::BadRequest("User not found.".into()))?;

  send_code(&state, &account.user, CodeKind::PasswordReset).await?;
  Ok(Json(MessageBody::new(format!("Password reset token sent to {email}"))))
}

#[derive(Debug, Deserialize)]
pub struct ResetParams {
  pub email:        String,
  pub token:        String,
  #[serde(rename = "newPassword")]
  pub new_password: String,
}

/// `PUT /authentication/reset-password?email=&token=&newPassword=`
pub async fn reset_password<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ResetParams>,
) -> Result<Json<MessageBody>, ApiError>
where
  S: SocialStore + 'static,
{
  if params.new_password.trim().is_empty() {
    return Err(ApiError::BadRequest("newPassword: Password is mandatory | ".into()));
  }

  let email = normalize_email(&params.email);
  let account = state
    .store
    .find_account(&email)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::BadRequest("Password reset token failed.".into()))?;

  match check_code(account.password_reset.as_ref(), params.token.trim(), Utc::now()) {
    CodeCheck::Valid => {
      let hash = hash_secret(&params.new_password)?;
      state
        .store
        .set_password(account.user.id, hash)
        .await
        .map_err(ApiError::store)?;
      state
        .store
        .set_code(account.user.id, CodeKind::PasswordReset, None)
        .await
        .map_err(ApiError::store)?;
      tracing::info!(user_id = account.user.id, "password reset");
      Ok(Json(MessageBody::new("Password reset successful.")))
    }
    CodeCheck::Expired => Err(ApiError::BadRequest("Password reset token expired.".into())),
    CodeCheck::Invalid => Err(ApiError::BadRequest("Password reset token failed.".into())),
  }
}
