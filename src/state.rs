use std::sync::Arc;

use crate::config::{AppConfig, DataBackend};
use crate::database::{
    ChangeLogStore, CommentStore, DatabaseManager, LessonDirectory, MemoryStore, PgStore, StoreError, UserDirectory,
};
use crate::services::{AuditService, CommentLimits, CommentService, RequesterResolver};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub comments: CommentService,
    pub audit: AuditService,
    pub requesters: RequesterResolver,
    store: Arc<dyn CommentStore>,
}

impl AppState {
    /// Build state on the configured backend
    pub async fn new(config: AppConfig) -> Result<Self, StoreError> {
        match config.database.backend {
            DataBackend::Postgres => {
                let pool = DatabaseManager::connect(&config.database).await?;
                let store = Arc::new(PgStore::new(pool));
                Ok(Self::from_parts(config, store.clone(), store.clone(), store.clone(), store))
            }
            DataBackend::Memory => {
                tracing::warn!("Using in-memory store; data is lost on restart");
                Ok(Self::with_memory(config, MemoryStore::new()))
            }
        }
    }

    pub fn with_memory(config: AppConfig, store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self::from_parts(config, store.clone(), store.clone(), store.clone(), store)
    }

    pub fn from_parts(
        config: AppConfig,
        comments: Arc<dyn CommentStore>,
        lessons: Arc<dyn LessonDirectory>,
        users: Arc<dyn UserDirectory>,
        changes: Arc<dyn ChangeLogStore>,
    ) -> Self {
        let requesters = RequesterResolver::new(users);
        let audit = AuditService::new(changes, config.security.enable_audit_logging);
        let service = CommentService::new(
            comments.clone(),
            lessons,
            requesters.clone(),
            audit.clone(),
            CommentLimits::from(&config),
        );

        Self {
            config: Arc::new(config),
            comments: service,
            audit,
            requesters,
            store: comments,
        }
    }

    /// Store connectivity probe
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }
}
