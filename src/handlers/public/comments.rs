use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::handlers::utils::{parse_lesson_id, parse_number};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::CommentPage;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// GET /api/lessons/:lesson_id/comments - newest first, paginated
pub async fn list_comments(
    State(state): State<AppState>,
    Path(lesson_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> ApiResult<CommentPage> {
    let lesson_id = parse_lesson_id(&lesson_id)?;
    let page = state
        .comments
        .list_comments(
            lesson_id,
            parse_number(query.page.as_deref()),
            parse_number(query.limit.as_deref()),
        )
        .await?;

    Ok(ApiResponse::success(page))
}
