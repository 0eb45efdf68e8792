//! Handlers for `/feed` endpoints. All of them require a session.

use axum::{extract::State, http::StatusCode};
use linkd_core::{
  notification::{NewNotification, NotificationType},
  post::{Comment, CommentBody, NewPost, Post},
  store::{PostQuery, SocialStore},
  user::{Id, User},
  wire::PageParams,
};

use crate::{
  AppState,
  auth::AuthUser,
  error::ApiError,
  extract::{Json, Path, Query},
};

// ─── Helpers ──────────────────────────────────────────────────────────────────

async fn require_post<S: SocialStore>(state: &AppState<S>, id: Id) -> Result<Post, ApiError> {
  state
    .store
    .get_post(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("Post not found".into()))
}

async fn require_own_comment<S: SocialStore>(
  state: &AppState<S>,
  id: Id,
  caller: &User,
) -> Result<Comment, ApiError> {
  let comment = state
    .store
    .get_comment(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("Comment not found".into()))?;
  if comment.author.id != caller.id {
    return Err(ApiError::Forbidden("User is not the author of the comment".into()));
  }
  Ok(comment)
}

fn ensure_author(post: &Post, caller: &User) -> Result<(), ApiError> {
  if post.author.id != caller.id {
    return Err(ApiError::Forbidden("User is not the author of the post".into()));
  }
  Ok(())
}

/// Notify the post's author unless they are the actor. Failures are logged;
/// the triggering action has already succeeded.
async fn notify<S: SocialStore>(
  state: &AppState<S>,
  post: &Post,
  actor: &User,
  kind: NotificationType,
) {
  if post.author.id == actor.id {
    return;
  }
  let input = NewNotification {
    actor_id: actor.id,
    recipient_id: post.author.id,
    kind,
    resource_id: post.id,
  };
  if let Err(e) = state.store.create_notification(input).await {
    tracing::warn!(error = %e, post_id = post.id, %kind, "failed to record notification");
  }
}

async fn list<S: SocialStore>(state: &AppState<S>, query: PostQuery) -> Result<Json<Vec<Post>>, ApiError> {
  let posts = state.store.list_posts(&query).await.map_err(ApiError::store)?;
  Ok(Json(posts))
}

fn page(params: PageParams) -> PostQuery {
  let (limit, offset) = params.resolve();
  PostQuery { limit: Some(limit), offset: Some(offset), ..Default::default() }
}

// ─── Posts ────────────────────────────────────────────────────────────────────

/// `GET /feed`: everyone's posts but the caller's, newest first.
pub async fn feed<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Query(params): Query<PageParams>,
) -> Result<Json<Vec<Post>>, ApiError>
where
  S: SocialStore + 'static,
{
  list(&state, PostQuery { exclude_author: Some(user.id), ..page(params) }).await
}

/// `GET /feed/posts`
pub async fn all_posts<S>(
  State(state): State<AppState<S>>,
  AuthUser(_user): AuthUser,
  Query(params): Query<PageParams>,
) -> Result<Json<Vec<Post>>, ApiError>
where
  S: SocialStore + 'static,
{
  list(&state, page(params)).await
}

/// `GET /feed/posts/user/{user_id}`
pub async fn posts_by_user<S>(
  State(state): State<AppState<S>>,
  AuthUser(_user): AuthUser,
  Path(user_id): Path<Id>,
  Query(params): Query<PageParams>,
) -> Result<Json<Vec<Post>>, ApiError>
where
  S: SocialStore + 'static,
{
  state
    .store
    .get_user(user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
  list(&state, PostQuery { author: Some(user_id), ..page(params) }).await
}

/// `POST /feed/posts`
pub async fn create_post<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Json(body): Json<NewPost>,
) -> Result<(StatusCode, Json<Post>), ApiError>
where
  S: SocialStore + 'static,
{
  let body = body.normalized()?;
  let post = state
    .store
    .create_post(user.id, body)
    .await
    .map_err(ApiError::store)?;
  tracing::debug!(post_id = post.id, user_id = user.id, "post created");
  Ok((StatusCode::CREATED, Json(post)))
}

/// `GET /feed/posts/{id}`
pub async fn get_post<S>(
  State(state): State<AppState<S>>,
  AuthUser(_user): AuthUser,
  Path(id): Path<Id>,
) -> Result<Json<Post>, ApiError>
where
  S: SocialStore + 'static,
{
  require_post(&state, id).await.map(Json)
}

/// `PUT /feed/posts/{id}`
pub async fn edit_post<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Path(id): Path<Id>,
  Json(body): Json<NewPost>,
) -> Result<Json<Post>, ApiError>
where
  S: SocialStore + 'static,
{
  let post = require_post(&state, id).await?;
  ensure_author(&post, &user)?;
  let body = body.normalized()?;
  let post = state.store.update_post(id, body).await.map_err(ApiError::store)?;
  Ok(Json(post))
}

/// `DELETE /feed/posts/{id}`
pub async fn delete_post<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Path(id): Path<Id>,
) -> Result<StatusCode, ApiError>
where
  S: SocialStore + 'static,
{
  let post = require_post(&state, id).await?;
  ensure_author(&post, &user)?;
  state.store.delete_post(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Likes ────────────────────────────────────────────────────────────────────

/// `PUT /feed/posts/{id}/like`: toggles the caller's like.
pub async fn like_post<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Path(id): Path<Id>,
) -> Result<Json<Post>, ApiError>
where
  S: SocialStore + 'static,
{
  let post = require_post(&state, id).await?;
  let liked = state
    .store
    .toggle_like(id, user.id)
    .await
    .map_err(ApiError::store)?;
  if liked {
    notify(&state, &post, &user, NotificationType::Like).await;
  }
  require_post(&state, id).await.map(Json)
}

/// `GET /feed/posts/{id}/likes`
pub async fn post_likes<S>(
  State(state): State<AppState<S>>,
  AuthUser(_user): AuthUser,
  Path(id): Path<Id>,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: SocialStore + 'static,
{
  require_post(&state, id).await?;
  let users = state.store.list_likes(id).await.map_err(ApiError::store)?;
  Ok(Json(users))
}

// ─── Comments ─────────────────────────────────────────────────────────────────

fn comment_content(body: CommentBody) -> Result<String, ApiError> {
  let content = body.content.trim();
  if content.is_empty() {
    return Err(ApiError::BadRequest("content: Content is mandatory".into()));
  }
  Ok(content.to_owned())
}

/// `GET /feed/posts/{id}/comments`: oldest first.
pub async fn list_comments<S>(
  State(state): State<AppState<S>>,
  AuthUser(_user): AuthUser,
  Path(id): Path<Id>,
) -> Result<Json<Vec<Comment>>, ApiError>
where
  S: SocialStore + 'static,
{
  require_post(&state, id).await?;
  let comments = state.store.list_comments(id).await.map_err(ApiError::store)?;
  Ok(Json(comments))
}

/// `POST /feed/posts/{id}/comments`
pub async fn add_comment<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Path(id): Path<Id>,
  Json(body): Json<CommentBody>,
) -> Result<(StatusCode, Json<Comment>), ApiError>
where
  S: SocialStore + 'static,
{
  let content = comment_content(body)?;
  let post = require_post(&state, id).await?;
  let comment = state
    .store
    .add_comment(id, user.id, content)
    .await
    .map_err(ApiError::store)?;
  notify(&state, &post, &user, NotificationType::Comment).await;
  Ok((StatusCode::CREATED, Json(comment)))
}

/// `PUT /feed/comments/{id}`
pub async fn edit_comment<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Path(id): Path<Id>,
  Json(body): Json<CommentBody>,
) -> Result<Json<Comment>, ApiError>
where
  S: SocialStore + 'static,
{
  require_own_comment(&state, id, &user).await?;
  let content = comment_content(body)?;
  let comment = state
    .store
    .update_comment(id, content)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(comment))
}

/// `DELETE /feed/comments/{id}`
pub async fn delete_comment<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Path(id): Path<Id>,
) -> Result<StatusCode, ApiError>
where
  S: SocialStore + 'static,
{
  require_own_comment(&state, id, &user).await?;
  state.store.delete_comment(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
