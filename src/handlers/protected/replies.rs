//! Path-addressed thread operations. Each handler serves every depth: the
//! route captures the comment id followed by up to three reply ids.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::comment::Comment;
use crate::handlers::utils::node_path;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

use super::comments::ContentBody;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyCreated {
    pub comment: Comment,
    pub reply_id: Uuid,
}

/// POST .../replies - append a reply under the addressed node
pub async fn add_reply(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(segments): Path<Vec<String>>,
    payload: Result<Json<ContentBody>, JsonRejection>,
) -> ApiResult<ReplyCreated> {
    let parent = node_path(&segments)?;
    let Json(body) = payload?;

    let (comment, reply_id) = state
        .comments
        .add_reply(&parent, &user, body.content.as_deref())
        .await?;

    Ok(ApiResponse::created(ReplyCreated { comment, reply_id }))
}

/// PATCH - edit the addressed comment or reply
pub async fn update_node(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(segments): Path<Vec<String>>,
    payload: Result<Json<ContentBody>, JsonRejection>,
) -> ApiResult<Comment> {
    let path = node_path(&segments)?;
    let Json(body) = payload?;

    let comment = state.comments.update(&path, &user, body.content.as_deref()).await?;
    Ok(ApiResponse::success(comment))
}

/// DELETE - remove the addressed comment, or splice out the addressed reply
pub async fn delete_node(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(segments): Path<Vec<String>>,
) -> ApiResult<Value> {
    let path = node_path(&segments)?;

    if path.depth() == 0 {
        state.comments.delete_comment(path.comment_id(), &user).await?;
        return Ok(ApiResponse::success(json!({ "message": "Comment deleted" })));
    }

    let comment = state.comments.delete_reply(&path, &user).await?;
    Ok(ApiResponse::success(json!({
        "message": "Reply deleted",
        "comment": comment,
    })))
}
