use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::comment::{Comment, ContentValidator, Emoji, Level, NodeKind, NodePath, ReactionChange, ReplyNode, TreeError};
use crate::config::AppConfig;
use crate::database::{CommentStore, LessonDirectory, StoreError};
use crate::services::audit_service::{AuditService, ChangeEvent};
use crate::services::requester::{Requester, RequesterResolver};
use crate::types::{AuditAction, TargetType};

#[derive(Debug, thiserror::Error)]
pub enum CommentError {
    #[error("Login required")]
    Unauthenticated,
    #[error("{0}")]
    NotFound(String),
    #[error("Comment was modified concurrently")]
    Conflict,
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One page of a lesson's comments, newest first
#[derive(Debug, Clone, Serialize)]
pub struct CommentPage {
    pub comments: Vec<Comment>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub pages: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct CommentLimits {
    pub max_content_length: usize,
    pub max_write_retries: u32,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl From<&AppConfig> for CommentLimits {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_content_length: config.comments.max_content_length,
            max_write_retries: config.comments.max_write_retries,
            default_page_size: config.api.default_page_size,
            max_page_size: config.api.max_page_size,
        }
    }
}

/// Comment threads: creation, listing, and path-addressed mutation of
/// replies and reactions.
///
/// Every mutation reloads the root document, applies the change in memory
/// and writes it back conditionally on the version it was loaded at. A
/// version mismatch restarts the cycle from a fresh load.
#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentStore>,
    lessons: Arc<dyn LessonDirectory>,
    requesters: RequesterResolver,
    audit: AuditService,
    validator: ContentValidator,
    limits: CommentLimits,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentStore>,
        lessons: Arc<dyn LessonDirectory>,
        requesters: RequesterResolver,
        audit: AuditService,
        limits: CommentLimits,
    ) -> Self {
        Self {
            comments,
            lessons,
            requesters,
            audit,
            validator: ContentValidator::with_max_length(limits.max_content_length),
            limits,
        }
    }

    pub async fn requester(&self, user: &AuthUser) -> Result<Requester, CommentError> {
        self.requesters.resolve(user).await?.ok_or(CommentError::Unauthenticated)
    }

    pub async fn create_comment(
        &self,
        lesson_id: Uuid,
        user: &AuthUser,
        content: Option<&str>,
    ) -> Result<Comment, CommentError> {
        let requester = self.requester(user).await?;
        let content = self.validator.clean(NodeKind::Comment, content)?;
        let lesson = self
            .lessons
            .find_lesson(lesson_id)
            .await?
            .ok_or_else(|| CommentError::NotFound("Lesson not found".to_string()))?;

        let comment = Comment::new(lesson.id, requester.author(), content, Utc::now());
        self.comments.insert(&comment).await?;
        info!("Comment {} created on lesson {} by {}", comment.id, lesson.id, requester.email);

        self.audit
            .record(
                ChangeEvent::by(&requester, AuditAction::Create, TargetType::Comment, comment.id)
                    .owner(&lesson.creator_email)
                    .summary(format!("Commented on lesson \"{}\"", lesson.title))
                    .metadata(json!({
                        "lessonTitle": lesson.title,
                        "commentId": comment.id,
                    })),
            )
            .await;

        Ok(comment)
    }

    pub async fn list_comments(
        &self,
        lesson_id: Uuid,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<CommentPage, CommentError> {
        let page = page.unwrap_or(1).max(1);
        let limit = limit
            .unwrap_or(self.limits.default_page_size)
            .clamp(1, self.limits.max_page_size.max(1));
        let offset = u64::from(page - 1) * u64::from(limit);

        let (comments, total) = futures::try_join!(
            self.comments.list_by_lesson(lesson_id, offset, u64::from(limit)),
            self.comments.count_by_lesson(lesson_id)
        )?;

        Ok(CommentPage {
            comments,
            total,
            page,
            limit,
            pages: total.div_ceil(u64::from(limit)),
        })
    }

    /// Edit the comment or reply at `path`
    pub async fn update(&self, path: &NodePath, user: &AuthUser, content: Option<&str>) -> Result<Comment, CommentError> {
        let requester = self.requester(user).await?;

        let (comment, ()) = self
            .mutate(path.comment_id(), |comment| {
                comment.edit(path, &requester.email, content, &self.validator, Utc::now())
            })
            .await?;

        info!("{} {} updated by {}", path.target_level().kind(), path, requester.email);
        Ok(comment)
    }

    pub async fn delete_comment(&self, comment_id: Uuid, user: &AuthUser) -> Result<(), CommentError> {
        let requester = self.requester(user).await?;
        let comment = self.load(comment_id).await?;
        comment.ensure_author(&requester.email, "Can only delete your own comments")?;

        if !self.comments.delete(comment_id).await? {
            return Err(CommentError::NotFound(Level::Comment.not_found_message().to_string()));
        }
        info!("Comment {} deleted by {}", comment_id, requester.email);

        self.audit
            .record(
                ChangeEvent::by(&requester, AuditAction::Delete, TargetType::Comment, comment_id)
                    .owner(&comment.author.email)
                    .summary("Deleted a comment")
                    .metadata(json!({ "commentId": comment_id })),
            )
            .await;

        Ok(())
    }

    /// Remove the reply at `path` along with everything beneath it
    pub async fn delete_reply(&self, path: &NodePath, user: &AuthUser) -> Result<Comment, CommentError> {
        let requester = self.requester(user).await?;

        let (comment, removed) = self
            .mutate(path.comment_id(), |comment| comment.remove_reply(path, &requester.email))
            .await?;

        info!(
            "Reply {} deleted by {} ({} nested replies discarded)",
            path,
            requester.email,
            removed.subtree_len() - 1
        );
        Ok(comment)
    }

    /// Append a reply under the node at `parent`. Returns the root comment
    /// and the new reply's id.
    pub async fn add_reply(
        &self,
        parent: &NodePath,
        user: &AuthUser,
        content: Option<&str>,
    ) -> Result<(Comment, Uuid), CommentError> {
        let requester = self.requester(user).await?;
        if parent.depth() >= crate::comment::MAX_DEPTH {
            return Err(TreeError::DepthExceeded.into());
        }
        let content = self.validator.clean(NodeKind::Reply, content)?;
        let author = requester.author();

        let (comment, reply_id) = self
            .mutate(parent.comment_id(), |comment| {
                let reply = ReplyNode::new(author.clone(), content.clone(), Utc::now());
                comment.append_reply(parent, reply)
            })
            .await?;

        info!("Reply {} added under {} by {}", reply_id, parent, requester.email);
        Ok((comment, reply_id))
    }

    /// React to any node. Re-sending the same emoji withdraws it.
    pub async fn toggle_reaction(&self, path: &NodePath, user: &AuthUser, emoji: Emoji) -> Result<Comment, CommentError> {
        let requester = self.requester(user).await?;

        let (comment, change) = self
            .mutate(path.comment_id(), |comment| {
                comment.toggle_reaction(path, &requester.email, emoji, Utc::now())
            })
            .await?;

        match change {
            ReactionChange::Added(emoji) => info!("{} reacted {} on {}", requester.email, emoji, path),
            ReactionChange::Switched { from, to } => {
                info!("{} switched reaction {} -> {} on {}", requester.email, from, to, path)
            }
            ReactionChange::Removed(emoji) => info!("{} removed reaction {} on {}", requester.email, emoji, path),
        }
        Ok(comment)
    }

    async fn load(&self, comment_id: Uuid) -> Result<Comment, CommentError> {
        self.comments
            .get(comment_id)
            .await?
            .ok_or_else(|| CommentError::NotFound(Level::Comment.not_found_message().to_string()))
    }

    /// Load, apply, conditionally save; retried on version conflicts
    async fn mutate<T, F>(&self, comment_id: Uuid, mut apply: F) -> Result<(Comment, T), CommentError>
    where
        T: Send,
        F: FnMut(&mut Comment) -> Result<T, TreeError> + Send,
    {
        let attempts = self.limits.max_write_retries + 1;
        for attempt in 1..=attempts {
            let mut comment = self.load(comment_id).await?;
            let expected = comment.version;

            let outcome = apply(&mut comment)?;
            comment.version = expected + 1;

            if self.comments.save(&comment, expected).await? {
                return Ok((comment, outcome));
            }
            warn!(
                "Version conflict on comment {} (attempt {}/{})",
                comment_id, attempt, attempts
            );
        }
        Err(CommentError::Conflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{ChangeFilter, ChangeRecord, LessonSummary, UserProfile};
    use crate::database::{ChangeLogStore, MemoryStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    const LESSON_OWNER: &str = "creator@x.io";

    fn limits() -> CommentLimits {
        CommentLimits {
            max_content_length: 50,
            max_write_retries: 2,
            default_page_size: 2,
            max_page_size: 5,
        }
    }

    fn user(email: &str) -> AuthUser {
        AuthUser {
            email: email.to_string(),
            name: None,
            picture: None,
        }
    }

    async fn setup() -> (CommentService, MemoryStore, Uuid) {
        let store = MemoryStore::new();
        let lesson_id = Uuid::new_v4();
        store
            .add_lesson(LessonSummary {
                id: lesson_id,
                title: "Patience".to_string(),
                creator_email: LESSON_OWNER.to_string(),
            })
            .await;
        store.add_user(UserProfile::new("x@x.io", "Xavier").with_photo("x.png")).await;
        store.add_user(UserProfile::new("admin@x.io", "Admin").admin()).await;

        let shared = Arc::new(store.clone());
        let service = CommentService::new(
            shared.clone(),
            shared.clone(),
            RequesterResolver::new(shared.clone()),
            AuditService::new(shared, true),
            limits(),
        );
        (service, store, lesson_id)
    }

    #[tokio::test]
    async fn create_snapshots_author_and_audits() {
        let (service, store, lesson_id) = setup().await;
        let comment = service
            .create_comment(lesson_id, &user("X@x.io"), Some("  Great read!  "))
            .await
            .unwrap();

        assert_eq!(comment.content, "Great read!");
        assert_eq!(comment.author.email, "x@x.io");
        assert_eq!(comment.author.display_name, "Xavier");
        assert_eq!(comment.author.photo_url, "x.png");
        assert!(comment.replies.is_empty() && comment.reactions.is_empty());

        let page = service.list_comments(lesson_id, None, None).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.comments[0].id, comment.id);

        let changes = store.list(&ChangeFilter::default(), 0, 10).await.unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].target_owner_email.as_deref(), Some(LESSON_OWNER));
        assert_eq!(changes[0].summary, "Commented on lesson \"Patience\"");
    }

    #[tokio::test]
    async fn create_validates_input_then_lesson() {
        let (service, _, lesson_id) = setup().await;

        let empty = service.create_comment(lesson_id, &user("x@x.io"), Some("   ")).await;
        assert!(matches!(empty, Err(CommentError::Tree(TreeError::EmptyContent(NodeKind::Comment)))));

        let long = "a".repeat(51);
        let too_long = service.create_comment(lesson_id, &user("x@x.io"), Some(&long)).await;
        assert!(matches!(too_long, Err(CommentError::Tree(TreeError::ContentTooLong { .. }))));

        let missing = service.create_comment(Uuid::new_v4(), &user("x@x.io"), Some("hi")).await;
        assert!(matches!(missing, Err(CommentError::NotFound(m)) if m == "Lesson not found"));

        let anonymous = service.create_comment(lesson_id, &user(""), Some("hi")).await;
        assert!(matches!(anonymous, Err(CommentError::Unauthenticated)));
    }

    #[tokio::test]
    async fn list_clamps_paging() {
        let (service, _, lesson_id) = setup().await;
        for i in 0..5 {
            service
                .create_comment(lesson_id, &user("x@x.io"), Some(&format!("comment {}", i)))
                .await
                .unwrap();
        }

        let first = service.list_comments(lesson_id, Some(0), None).await.unwrap();
        assert_eq!((first.page, first.limit, first.pages), (1, 2, 3));
        assert_eq!(first.comments.len(), 2);

        let capped = service.list_comments(lesson_id, None, Some(500)).await.unwrap();
        assert_eq!(capped.limit, 5);
        assert_eq!(capped.comments.len(), 5);

        let empty = service.list_comments(Uuid::new_v4(), None, None).await.unwrap();
        assert_eq!((empty.total, empty.pages), (0, 0));
    }

    #[tokio::test]
    async fn reply_react_and_forbid_scenario() {
        let (service, _, lesson_id) = setup().await;
        let comment = service
            .create_comment(lesson_id, &user("x@x.io"), Some("Great read!"))
            .await
            .unwrap();
        let root = NodePath::comment(comment.id);

        let (updated, reply_id) = service.add_reply(&root, &user("x@x.io"), Some("Thanks!")).await.unwrap();
        assert_eq!(updated.replies.len(), 1);
        assert_eq!(updated.version, 1);

        let reply_path = root.child(reply_id).unwrap();
        let reacted = service.toggle_reaction(&reply_path, &user("x@x.io"), Emoji::ThumbsUp).await.unwrap();
        assert_eq!(reacted.replies[0].reactions.len(), 1);

        let cleared = service.toggle_reaction(&reply_path, &user("x@x.io"), Emoji::ThumbsUp).await.unwrap();
        assert!(cleared.replies[0].reactions.is_empty());

        let forbidden = service.update(&reply_path, &user("y@x.io"), Some("hijack")).await;
        assert!(matches!(forbidden, Err(CommentError::Tree(TreeError::Forbidden(_)))));
    }

    #[tokio::test]
    async fn non_authors_are_forbidden_before_content_is_checked() {
        let (service, _, lesson_id) = setup().await;
        let comment = service.create_comment(lesson_id, &user("x@x.io"), Some("mine")).await.unwrap();
        let root = NodePath::comment(comment.id);
        let (_, reply_id) = service.add_reply(&root, &user("x@x.io"), Some("reply")).await.unwrap();

        for path in [root.clone(), root.child(reply_id).unwrap()] {
            let err = service.update(&path, &user("y@x.io"), Some("  ")).await.unwrap_err();
            assert!(matches!(err, CommentError::Tree(TreeError::Forbidden(_))));
        }

        let blank = service.update(&root, &user("x@x.io"), None).await.unwrap_err();
        assert!(matches!(blank, CommentError::Tree(TreeError::EmptyContent(NodeKind::Comment))));

        let edited = service.update(&root, &user("x@x.io"), Some(" edited ")).await.unwrap();
        assert_eq!(edited.content, "edited");
    }

    #[tokio::test]
    async fn admins_cannot_delete_other_peoples_comments() {
        let (service, store, lesson_id) = setup().await;
        let comment = service
            .create_comment(lesson_id, &user("x@x.io"), Some("mine"))
            .await
            .unwrap();

        let err = service.delete_comment(comment.id, &user("admin@x.io")).await.unwrap_err();
        assert!(matches!(err, CommentError::Tree(TreeError::Forbidden("Can only delete your own comments"))));

        service.delete_comment(comment.id, &user("x@x.io")).await.unwrap();
        assert!(store.get(comment.id).await.unwrap().is_none());

        let again = service.delete_comment(comment.id, &user("x@x.io")).await.unwrap_err();
        assert!(matches!(again, CommentError::NotFound(m) if m == "Comment not found"));
    }

    #[tokio::test]
    async fn replies_stop_at_three_levels() {
        let (service, _, lesson_id) = setup().await;
        let comment = service.create_comment(lesson_id, &user("x@x.io"), Some("root")).await.unwrap();
        let mut parent = NodePath::comment(comment.id);
        for depth in 1..=3 {
            let (_, id) = service
                .add_reply(&parent, &user("x@x.io"), Some(&format!("depth {}", depth)))
                .await
                .unwrap();
            parent = parent.child(id).unwrap();
        }
        assert_eq!(parent.depth(), 3);

        let err = service.add_reply(&parent, &user("x@x.io"), Some("too deep")).await.unwrap_err();
        assert!(matches!(err, CommentError::Tree(TreeError::DepthExceeded)));
        assert_eq!(service.load(comment.id).await.unwrap().depth(), 3);
    }

    #[tokio::test]
    async fn deleting_a_reply_drops_its_subtree() {
        let (service, _, lesson_id) = setup().await;
        let comment = service.create_comment(lesson_id, &user("x@x.io"), Some("root")).await.unwrap();
        let root = NodePath::comment(comment.id);
        let (_, r1) = service.add_reply(&root, &user("x@x.io"), Some("r1")).await.unwrap();
        let r1_path = root.child(r1).unwrap();
        let (_, n1) = service.add_reply(&r1_path, &user("y@x.io"), Some("n1")).await.unwrap();

        let after = service.delete_reply(&r1_path, &user("x@x.io")).await.unwrap();
        assert!(after.replies.is_empty());

        let n1_path = r1_path.child(n1).unwrap();
        let err = service.toggle_reaction(&n1_path, &user("y@x.io"), Emoji::Heart).await.unwrap_err();
        assert!(matches!(err, CommentError::Tree(TreeError::NotFound(Level::Reply))));
    }

    /// Change log that rejects every write
    struct BrokenLog;

    #[async_trait]
    impl ChangeLogStore for BrokenLog {
        async fn insert(&self, _record: &ChangeRecord) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("change log offline".to_string()))
        }
        async fn list(&self, _filter: &ChangeFilter, _offset: u64, _limit: u64) -> Result<Vec<ChangeRecord>, StoreError> {
            Ok(Vec::new())
        }
        async fn count(&self, _filter: &ChangeFilter) -> Result<u64, StoreError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn failing_change_log_does_not_fail_the_write() {
        let (_, store, lesson_id) = setup().await;
        let shared = Arc::new(store.clone());
        let service = CommentService::new(
            shared.clone(),
            shared.clone(),
            RequesterResolver::new(shared),
            AuditService::new(Arc::new(BrokenLog), true),
            limits(),
        );

        let comment = service.create_comment(lesson_id, &user("x@x.io"), Some("still saved")).await.unwrap();
        assert!(store.get(comment.id).await.unwrap().is_some());

        service.delete_comment(comment.id, &user("x@x.io")).await.unwrap();
        assert!(store.get(comment.id).await.unwrap().is_none());
    }

    /// Store whose saves always lose the race
    struct ContendedStore {
        inner: MemoryStore,
        saves: AtomicU32,
    }

    #[async_trait]
    impl CommentStore for ContendedStore {
        async fn insert(&self, comment: &Comment) -> Result<(), StoreError> {
            CommentStore::insert(&self.inner, comment).await
        }
        async fn get(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
            self.inner.get(id).await
        }
        async fn save(&self, _comment: &Comment, _expected_version: i64) -> Result<bool, StoreError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        }
        async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
            self.inner.delete(id).await
        }
        async fn list_by_lesson(&self, lesson_id: Uuid, offset: u64, limit: u64) -> Result<Vec<Comment>, StoreError> {
            self.inner.list_by_lesson(lesson_id, offset, limit).await
        }
        async fn count_by_lesson(&self, lesson_id: Uuid) -> Result<u64, StoreError> {
            self.inner.count_by_lesson(lesson_id).await
        }
        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn gives_up_after_repeated_conflicts() {
        let (_, store, lesson_id) = setup().await;
        let contended = Arc::new(ContendedStore {
            inner: store.clone(),
            saves: AtomicU32::new(0),
        });
        let shared = Arc::new(store);
        let service = CommentService::new(
            contended.clone(),
            shared.clone(),
            RequesterResolver::new(shared.clone()),
            AuditService::new(shared, false),
            limits(),
        );

        let comment = service.create_comment(lesson_id, &user("x@x.io"), Some("hot")).await.unwrap();
        let err = service
            .toggle_reaction(&NodePath::comment(comment.id), &user("y@x.io"), Emoji::Wow)
            .await
            .unwrap_err();

        assert!(matches!(err, CommentError::Conflict));
        assert_eq!(contended.saves.load(Ordering::SeqCst), 3);
    }
}
