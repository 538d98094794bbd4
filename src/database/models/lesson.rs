use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The slice of a lesson the comment engine needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LessonSummary {
    pub id: Uuid,
    pub title: String,
    pub creator_email: String,
}
