use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::db::models::{AccountId, Post};
use crate::error::{AppError, AppResult};
use crate::extractors::{ApiJson, ApiPath, CurrentAccount};
use crate::posts::{CreatePostRequest, PostError};
use crate::state::AppState;

impl From<PostError> for AppError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::Validation(e) => AppError::Validation(e.0),
            PostError::Store(e) => AppError::Store(e),
        }
    }
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/posts", get(list_posts).post(create_post))
        .route("/api/users/{id}/posts", get(list_posts_by_account))
}

// --- Handlers ---

async fn list_posts(State(state): State<AppState>) -> AppResult<Json<Vec<Post>>> {
    Ok(Json(state.binder().list_posts().await?))
}

async fn create_post(
    State(state): State<AppState>,
    caller: CurrentAccount,
    ApiJson(req): ApiJson<CreatePostRequest>,
) -> AppResult<(StatusCode, Json<Post>)> {
    let post = state.binder().create_post(&caller.account, req).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn list_posts_by_account(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<Vec<Post>>> {
    Ok(Json(
        state.binder().list_posts_by_account(AccountId(id)).await?,
    ))
}
