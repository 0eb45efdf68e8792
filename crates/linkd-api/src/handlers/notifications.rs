//! Handlers for `/notifications`.

use axum::extract::State;
use linkd_core::{notification::Notification, store::SocialStore, user::Id};

use crate::{
  AppState,
  auth::AuthUser,
  error::ApiError,
  extract::{Json, Path},
};

/// `GET /notifications`: the caller's notifications, newest first.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
) -> Result<Json<Vec<Notification>>, ApiError>
where
  S: SocialStore + 'static,
{
  let items = state
    .store
    .list_notifications(user.id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(items))
}

/// `PUT /notifications/{id}`: mark one of the caller's notifications read.
///
/// Someone else's notification is reported as missing.
pub async fn mark_read<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Path(id): Path<Id>,
) -> Result<Json<Notification>, ApiError>
where
  S: SocialStore + 'static,
{
  let not_found = || ApiError::NotFound("Notification not found".into());
  let existing = state
    .store
    .get_notification(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(not_found)?;
  if existing.recipient.id != user.id {
    return Err(not_found());
  }
  let updated = state
    .store
    .mark_notification_read(id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(updated))
}
