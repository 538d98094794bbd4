use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::comment::Comment;
use crate::handlers::utils::parse_lesson_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// Body for creating or editing a comment or reply
#[derive(Debug, Default, Deserialize)]
pub struct ContentBody {
    pub content: Option<String>,
}

/// POST /api/lessons/:lesson_id/comments
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(lesson_id): Path<String>,
    payload: Result<Json<ContentBody>, JsonRejection>,
) -> ApiResult<Comment> {
    let lesson_id = parse_lesson_id(&lesson_id)?;
    let Json(body) = payload?;

    let comment = state
        .comments
        .create_comment(lesson_id, &user, body.content.as_deref())
        .await?;

    Ok(ApiResponse::created(comment))
}
