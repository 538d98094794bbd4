use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::comment::Comment;
use crate::database::models::{ChangeFilter, ChangeRecord, LessonSummary, UserProfile};
use crate::database::store::{ChangeLogStore, CommentStore, LessonDirectory, StoreError, UserDirectory};

/// Process-local backend used in development and tests
#[derive(Clone, Default)]
pub struct MemoryStore {
    comments: Arc<RwLock<HashMap<Uuid, Comment>>>,
    lessons: Arc<RwLock<HashMap<Uuid, LessonSummary>>>,
    users: Arc<RwLock<HashMap<String, UserProfile>>>,
    changes: Arc<RwLock<Vec<ChangeRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_lesson(&self, lesson: LessonSummary) {
        self.lessons.write().await.insert(lesson.id, lesson);
    }

    pub async fn add_user(&self, user: UserProfile) {
        self.users.write().await.insert(user.email.clone(), user);
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn insert(&self, comment: &Comment) -> Result<(), StoreError> {
        let mut comments = self.comments.write().await;
        if comments.contains_key(&comment.id) {
            return Err(StoreError::Query(format!("duplicate comment id {}", comment.id)));
        }
        comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        Ok(self.comments.read().await.get(&id).cloned())
    }

    async fn save(&self, comment: &Comment, expected_version: i64) -> Result<bool, StoreError> {
        let mut comments = self.comments.write().await;
        match comments.get_mut(&comment.id) {
            Some(stored) if stored.version == expected_version => {
                *stored = comment.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.comments.write().await.remove(&id).is_some())
    }

    async fn list_by_lesson(&self, lesson_id: Uuid, offset: u64, limit: u64) -> Result<Vec<Comment>, StoreError> {
        let comments = self.comments.read().await;
        let mut matching: Vec<&Comment> = comments.values().filter(|c| c.lesson_id == lesson_id).collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        Ok(matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count_by_lesson(&self, lesson_id: Uuid) -> Result<u64, StoreError> {
        let comments = self.comments.read().await;
        Ok(comments.values().filter(|c| c.lesson_id == lesson_id).count() as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl LessonDirectory for MemoryStore {
    async fn find_lesson(&self, id: Uuid) -> Result<Option<LessonSummary>, StoreError> {
        Ok(self.lessons.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_user(&self, email: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.users.read().await.get(email).cloned())
    }
}

#[async_trait]
impl ChangeLogStore for MemoryStore {
    async fn insert(&self, record: &ChangeRecord) -> Result<(), StoreError> {
        self.changes.write().await.push(record.clone());
        Ok(())
    }

    async fn list(&self, filter: &ChangeFilter, offset: u64, limit: u64) -> Result<Vec<ChangeRecord>, StoreError> {
        let changes = self.changes.read().await;
        Ok(changes
            .iter()
            .rev()
            .filter(|r| filter.matches(r))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &ChangeFilter) -> Result<u64, StoreError> {
        let changes = self.changes.read().await;
        Ok(changes.iter().filter(|r| filter.matches(r)).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::Author;
    use chrono::{Duration, Utc};

    fn comment(lesson_id: Uuid, minutes_ago: i64) -> Comment {
        let author = Author::new("a@example.com", "A", "");
        Comment::new(lesson_id, author, "hi".into(), Utc::now() - Duration::minutes(minutes_ago))
    }

    #[tokio::test]
    async fn save_rejects_stale_versions() {
        let store = MemoryStore::new();
        let mut c = comment(Uuid::new_v4(), 0);
        CommentStore::insert(&store, &c).await.unwrap();

        c.version = 1;
        assert!(store.save(&c, 0).await.unwrap());
        c.version = 2;
        assert!(!store.save(&c, 0).await.unwrap());
        assert_eq!(store.get(c.id).await.unwrap().unwrap().version, 1);
    }

    #[tokio::test]
    async fn lists_newest_first_with_paging() {
        let store = MemoryStore::new();
        let lesson = Uuid::new_v4();
        let oldest = comment(lesson, 30);
        let middle = comment(lesson, 20);
        let newest = comment(lesson, 10);
        for c in [&middle, &oldest, &newest] {
            CommentStore::insert(&store, c).await.unwrap();
        }
        CommentStore::insert(&store, &comment(Uuid::new_v4(), 0)).await.unwrap();

        let first = store.list_by_lesson(lesson, 0, 2).await.unwrap();
        assert_eq!(first.iter().map(|c| c.id).collect::<Vec<_>>(), vec![newest.id, middle.id]);
        let second = store.list_by_lesson(lesson, 2, 2).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id, oldest.id);
        assert_eq!(store.count_by_lesson(lesson).await.unwrap(), 3);
    }
}
