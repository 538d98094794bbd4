use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, Executor, PgPool};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::StoreError;

/// Schema for the comment, audit and read-only directory tables
const SCHEMA: &str = include_str!("../../sql/schema.sql");

/// Connection pool construction and schema management
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool against `database.url`
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool for: {}", Self::redact_url(url));
        Ok(pool)
    }

    /// Apply the schema. Every statement is idempotent.
    pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
        pool.execute(SCHEMA).await?;
        info!("Database schema is up to date");
        Ok(())
    }

    /// Strip credentials from a connection string before logging it
    pub fn redact_url(raw: &str) -> String {
        match url::Url::parse(raw) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(Some("****"));
                }
                url.into()
            }
            Err(_) => "<invalid database url>".to_string(),
        }
    }
}
