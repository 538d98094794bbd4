//! Comment data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::reaction::Reactions;

/// Author snapshot taken when a node is created. Never refreshed from the
/// live profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    /// Lowercased email, the durable identity key
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub photo_url: String,
}

impl Author {
    pub fn new(email: impl AsRef<str>, display_name: impl Into<String>, photo_url: impl Into<String>) -> Self {
        Self {
            email: email.as_ref().trim().to_lowercase(),
            display_name: display_name.into(),
            photo_url: photo_url.into(),
        }
    }

    pub fn is(&self, email: &str) -> bool {
        self.email == email
    }
}

/// Root comment attached to a lesson. Owns its whole reply tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub author: Author,
    pub content: String,
    #[serde(default)]
    pub reactions: Reactions,
    #[serde(default)]
    pub replies: Vec<ReplyNode>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped on every save; guards concurrent read-modify-write cycles
    #[serde(default)]
    pub version: i64,
}

impl Comment {
    pub fn new(lesson_id: Uuid, author: Author, content: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            lesson_id,
            author,
            content,
            reactions: Reactions::new(),
            replies: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }
}

/// A reply at depth 1, 2 or 3
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyNode {
    pub id: Uuid,
    pub author: Author,
    pub content: String,
    #[serde(default)]
    pub reactions: Reactions,
    #[serde(default)]
    pub replies: Vec<ReplyNode>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReplyNode {
    pub fn new(author: Author, content: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author,
            content,
            reactions: Reactions::new(),
            replies: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Depth of the subtree rooted here (1 for a leaf)
    pub fn height(&self) -> usize {
        1 + self.replies.iter().map(ReplyNode::height).max().unwrap_or(0)
    }

    /// Number of nodes in the subtree rooted here, including itself
    pub fn subtree_len(&self) -> usize {
        1 + self.replies.iter().map(ReplyNode::subtree_len).sum::<usize>()
    }
}
