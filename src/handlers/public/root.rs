use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "LifeCherry API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Comments, replies and reactions for life lessons",
            "endpoints": {
                "health": "/health (public)",
                "comments": "/api/lessons/:lessonId/comments (GET public, POST protected)",
                "threads": "/api/comments/:commentId[/replies/:replyId[/replies/:nestedId[/replies/:deepId]]] (protected)",
                "reactions": "<thread path>/reactions (protected)",
                "audit": "/api/audit/changes (admin), /api/audit/me (protected)",
            }
        }
    }))
}

/// GET /health - store connectivity probe
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
