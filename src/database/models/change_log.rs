use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::types::{AuditAction, Role, TargetType};

/// One audit trail entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub id: Uuid,
    pub actor_email: String,
    pub actor_name: String,
    pub actor_role: Role,
    pub target_type: TargetType,
    pub target_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_owner_email: Option<String>,
    pub action: AuditAction,
    pub summary: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

/// Listing filter. `involving` matches either the actor or the target owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeFilter {
    pub actor_role: Option<Role>,
    pub target_type: Option<TargetType>,
    pub involving: Option<String>,
}

impl ChangeFilter {
    pub fn matches(&self, record: &ChangeRecord) -> bool {
        if let Some(role) = self.actor_role {
            if record.actor_role != role {
                return false;
            }
        }
        if let Some(target_type) = self.target_type {
            if record.target_type != target_type {
                return false;
            }
        }
        if let Some(email) = &self.involving {
            let owner = record.target_owner_email.as_deref() == Some(email.as_str());
            if record.actor_email != *email && !owner {
                return false;
            }
        }
        true
    }
}
