use serde_json::json;

use crate::cli::{utils::output_success, OutputFormat};
use crate::config::AppConfig;
use crate::database::DatabaseManager;

pub async fn handle(config: AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;
    pool.close().await;

    let target = config
        .database
        .url
        .as_deref()
        .map(DatabaseManager::redact_url)
        .unwrap_or_default();
    output_success(output_format, "Schema applied", Some(json!({ "database": target })))
}
