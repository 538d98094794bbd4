use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::database::models::{ChangeFilter, ChangeRecord};
use crate::database::{ChangeLogStore, StoreError};
use crate::services::requester::Requester;
use crate::types::{AuditAction, Role, TargetType};

pub const DEFAULT_CHANGE_LIMIT: u32 = 50;
pub const MAX_CHANGE_LIMIT: u32 = 200;
pub const FREE_CHANGE_LIMIT: u32 = 10;

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("Login required")]
    Unauthenticated,
    #[error("Forbidden: admin only")]
    AdminOnly,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// An event to be written to the change log
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub actor_email: String,
    pub actor_name: String,
    pub actor_role: Role,
    pub target_type: TargetType,
    pub target_id: String,
    pub target_owner_email: Option<String>,
    pub action: AuditAction,
    pub summary: String,
    pub metadata: Value,
}

impl ChangeEvent {
    pub fn by(actor: &Requester, action: AuditAction, target_type: TargetType, target_id: impl ToString) -> Self {
        Self {
            actor_email: actor.email.clone(),
            actor_name: actor.display_name.clone(),
            actor_role: actor.role,
            target_type,
            target_id: target_id.to_string(),
            target_owner_email: None,
            action,
            summary: String::new(),
            metadata: Value::Object(Default::default()),
        }
    }

    pub fn owner(mut self, email: impl Into<String>) -> Self {
        self.target_owner_email = Some(email.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Listing parameters as received from the query string
#[derive(Debug, Clone, Default)]
pub struct ChangeQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub actor_role: Option<Role>,
    pub target_type: Option<TargetType>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePage {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub changes: Vec<ChangeRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_premium: Option<bool>,
}

#[derive(Clone)]
pub struct AuditService {
    store: Arc<dyn ChangeLogStore>,
    enabled: bool,
}

impl AuditService {
    pub fn new(store: Arc<dyn ChangeLogStore>, enabled: bool) -> Self {
        Self { store, enabled }
    }

    /// Best effort. Failures are logged and never reach the caller.
    pub async fn record(&self, event: ChangeEvent) {
        if !self.enabled {
            return;
        }

        let actor_email = event.actor_email.trim().to_lowercase();
        if actor_email.is_empty() {
            debug!("Dropping change log entry without actor: {}", event.summary);
            return;
        }

        let record = ChangeRecord {
            id: Uuid::new_v4(),
            actor_email,
            actor_name: event.actor_name,
            actor_role: event.actor_role,
            target_type: event.target_type,
            target_id: event.target_id,
            target_owner_email: event
                .target_owner_email
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty()),
            action: event.action,
            summary: event.summary,
            metadata: event.metadata,
            created_at: Utc::now(),
        };

        if let Err(e) = self.store.insert(&record).await {
            warn!("Failed to write change log entry {}: {}", record.id, e);
        }
    }

    /// Every change, for administrators
    pub async fn list_admin_changes(&self, requester: &Requester, query: ChangeQuery) -> Result<ChangePage, AuditError> {
        if !requester.is_admin() {
            return Err(AuditError::AdminOnly);
        }

        let filter = ChangeFilter {
            actor_role: query.actor_role,
            target_type: query.target_type,
            involving: None,
        };
        let (page, limit) = paging(query.page, query.limit, MAX_CHANGE_LIMIT);
        let (changes, total) = self.fetch(&filter, page, limit).await?;

        Ok(ChangePage {
            page,
            limit,
            total,
            changes,
            is_premium: None,
        })
    }

    /// Changes the caller made or that touched the caller's content.
    /// Free accounts only see the first page, capped to a handful of rows.
    pub async fn list_user_changes(&self, requester: &Requester, query: ChangeQuery) -> Result<ChangePage, AuditError> {
        let full_history = requester.is_premium || requester.is_admin();
        let filter = ChangeFilter {
            actor_role: None,
            target_type: query.target_type,
            involving: Some(requester.email.clone()),
        };

        let (page, limit) = if full_history {
            paging(query.page, query.limit, MAX_CHANGE_LIMIT)
        } else {
            paging(query.page, query.limit, FREE_CHANGE_LIMIT)
        };

        if !full_history && page > 1 {
            return Ok(ChangePage {
                page,
                limit,
                total: 0,
                changes: Vec::new(),
                is_premium: Some(false),
            });
        }

        let (changes, total) = self.fetch(&filter, page, limit).await?;
        Ok(ChangePage {
            page,
            limit,
            total,
            changes,
            is_premium: Some(full_history),
        })
    }

    async fn fetch(&self, filter: &ChangeFilter, page: u32, limit: u32) -> Result<(Vec<ChangeRecord>, u64), StoreError> {
        let offset = u64::from(page - 1) * u64::from(limit);
        futures::try_join!(
            self.store.list(filter, offset, u64::from(limit)),
            self.store.count(filter)
        )
    }
}

fn paging(page: Option<u32>, limit: Option<u32>, max_limit: u32) -> (u32, u32) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_CHANGE_LIMIT).clamp(1, max_limit);
    (page, limit)
}
