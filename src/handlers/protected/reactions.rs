use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::comment::{Comment, Emoji};
use crate::error::ApiError;
use crate::handlers::utils::node_path;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ReactionBody {
    pub emoji: Option<String>,
}

/// POST .../reactions - toggle the caller's reaction on the addressed node
pub async fn toggle_reaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(segments): Path<Vec<String>>,
    payload: Result<Json<ReactionBody>, JsonRejection>,
) -> ApiResult<Comment> {
    let path = node_path(&segments)?;
    let Json(body) = payload?;

    let emoji: Emoji = body
        .emoji
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|e: crate::comment::InvalidEmoji| ApiError::bad_request(e.to_string()))?;

    let comment = state.comments.toggle_reaction(&path, &user, emoji).await?;
    Ok(ApiResponse::success(comment))
}
