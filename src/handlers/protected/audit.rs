use axum::{
    extract::{Query, State},
    Extension,
};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::utils::parse_number;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{AuditError, ChangePage, ChangeQuery, Requester};
use crate::state::AppState;
use crate::types::{Role, TargetType};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangesQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub actor_role: Option<String>,
    pub target_type: Option<String>,
}

impl ChangesQuery {
    fn into_query(self) -> Result<ChangeQuery, ApiError> {
        let actor_role = match self.actor_role.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => Some(raw.parse::<Role>().map_err(ApiError::bad_request)?),
            None => None,
        };
        let target_type = match self.target_type.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => Some(raw.parse::<TargetType>().map_err(ApiError::bad_request)?),
            None => None,
        };

        Ok(ChangeQuery {
            page: parse_number(self.page.as_deref()),
            limit: parse_number(self.limit.as_deref()),
            actor_role,
            target_type,
        })
    }
}

async fn requester(state: &AppState, user: &AuthUser) -> Result<Requester, ApiError> {
    Ok(state
        .requesters
        .resolve(user)
        .await?
        .ok_or(AuditError::Unauthenticated)?)
}

/// GET /api/audit/changes - full change log, admins only
pub async fn admin_changes(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ChangesQuery>,
) -> ApiResult<ChangePage> {
    let requester = requester(&state, &user).await?;
    let page = state.audit.list_admin_changes(&requester, query.into_query()?).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/audit/me - activity by or affecting the caller
pub async fn my_changes(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ChangesQuery>,
) -> ApiResult<ChangePage> {
    let requester = requester(&state, &user).await?;
    let mut query = query.into_query()?;
    query.actor_role = None;
    let page = state.audit.list_user_changes(&requester, query).await?;
    Ok(ApiResponse::success(page))
}
