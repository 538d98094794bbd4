use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::comment::Comment;
use crate::database::models::{ChangeFilter, ChangeRecord, LessonSummary, UserProfile};

/// Errors from the storage backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Malformed document: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Query(other.to_string()),
        }
    }
}

/// Root comment documents. Each document holds its entire reply tree.
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn insert(&self, comment: &Comment) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Comment>, StoreError>;

    /// Replace the stored document when its version still equals
    /// `expected_version`. Returns false on a version mismatch or when the
    /// document no longer exists.
    async fn save(&self, comment: &Comment, expected_version: i64) -> Result<bool, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Newest first
    async fn list_by_lesson(&self, lesson_id: Uuid, offset: u64, limit: u64) -> Result<Vec<Comment>, StoreError>;

    async fn count_by_lesson(&self, lesson_id: Uuid) -> Result<u64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Read-only view of lessons owned by the lesson subsystem
#[async_trait]
pub trait LessonDirectory: Send + Sync {
    async fn find_lesson(&self, id: Uuid) -> Result<Option<LessonSummary>, StoreError>;
}

/// Read-only view of user profiles
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, email: &str) -> Result<Option<UserProfile>, StoreError>;
}

/// Audit trail persistence
#[async_trait]
pub trait ChangeLogStore: Send + Sync {
    async fn insert(&self, record: &ChangeRecord) -> Result<(), StoreError>;

    /// Newest first
    async fn list(&self, filter: &ChangeFilter, offset: u64, limit: u64) -> Result<Vec<ChangeRecord>, StoreError>;

    async fn count(&self, filter: &ChangeFilter) -> Result<u64, StoreError>;
}
