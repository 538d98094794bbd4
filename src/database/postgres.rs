use async_trait::async_trait;
use sqlx::{postgres::PgRow, types::Json, PgPool, QueryBuilder, Postgres, Row};
use uuid::Uuid;

use crate::comment::Comment;
use crate::database::models::{ChangeFilter, ChangeRecord, LessonSummary, UserProfile};
use crate::database::store::{ChangeLogStore, CommentStore, LessonDirectory, StoreError, UserDirectory};

/// PostgreSQL backend for every store port
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn comment_from_row(row: &PgRow) -> Result<Comment, StoreError> {
    let Json(mut comment): Json<Comment> = row.try_get("document")?;
    // The column is authoritative for optimistic locking.
    comment.version = row.try_get("version")?;
    Ok(comment)
}

fn parse_column<T: std::str::FromStr<Err = String>>(row: &PgRow, column: &str) -> Result<T, StoreError> {
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(StoreError::Query)
}

fn change_from_row(row: &PgRow) -> Result<ChangeRecord, StoreError> {
    let Json(metadata): Json<serde_json::Value> = row.try_get("metadata")?;
    Ok(ChangeRecord {
        id: row.try_get("id")?,
        actor_email: row.try_get("actor_email")?,
        actor_name: row.try_get("actor_name")?,
        actor_role: parse_column(row, "actor_role")?,
        target_type: parse_column(row, "target_type")?,
        target_id: row.try_get("target_id")?,
        target_owner_email: row.try_get("target_owner_email")?,
        action: parse_column(row, "action")?,
        summary: row.try_get("summary")?,
        metadata,
        created_at: row.try_get("created_at")?,
    })
}

fn push_change_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ChangeFilter) {
    qb.push(" WHERE TRUE");
    if let Some(role) = filter.actor_role {
        qb.push(" AND actor_role = ").push_bind(role.as_str());
    }
    if let Some(target_type) = filter.target_type {
        qb.push(" AND target_type = ").push_bind(target_type.as_str());
    }
    if let Some(email) = &filter.involving {
        qb.push(" AND (actor_email = ")
            .push_bind(email.clone())
            .push(" OR target_owner_email = ")
            .push_bind(email.clone())
            .push(")");
    }
}

#[async_trait]
impl CommentStore for PgStore {
    async fn insert(&self, comment: &Comment) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, lesson_id, author_email, document, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(comment.id)
        .bind(comment.lesson_id)
        .bind(&comment.author.email)
        .bind(Json(comment))
        .bind(comment.version)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        let row = sqlx::query("SELECT document, version FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(comment_from_row).transpose()
    }

    async fn save(&self, comment: &Comment, expected_version: i64) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE comments
            SET document = $2, version = $3, updated_at = $4
            WHERE id = $1 AND version = $5
            "#,
        )
        .bind(comment.id)
        .bind(Json(comment))
        .bind(comment.version)
        .bind(comment.updated_at)
        .bind(expected_version)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_by_lesson(&self, lesson_id: Uuid, offset: u64, limit: u64) -> Result<Vec<Comment>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT document, version FROM comments
            WHERE lesson_id = $1
            ORDER BY created_at DESC, id DESC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(lesson_id)
        .bind(offset as i64)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(comment_from_row).collect()
    }

    async fn count_by_lesson(&self, lesson_id: Uuid) -> Result<u64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments WHERE lesson_id = $1")
            .bind(lesson_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl LessonDirectory for PgStore {
    async fn find_lesson(&self, id: Uuid) -> Result<Option<LessonSummary>, StoreError> {
        let lesson = sqlx::query_as::<_, LessonSummary>(
            "SELECT id, title, creator_email FROM lessons WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(lesson)
    }
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn find_user(&self, email: &str) -> Result<Option<UserProfile>, StoreError> {
        let row = sqlx::query(
            "SELECT email, name, photo_url, role, is_premium FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(UserProfile {
            email: row.try_get("email")?,
            name: row.try_get("name")?,
            photo_url: row.try_get("photo_url")?,
            role: parse_column(&row, "role")?,
            is_premium: row.try_get("is_premium")?,
        }))
    }
}

#[async_trait]
impl ChangeLogStore for PgStore {
    async fn insert(&self, record: &ChangeRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO change_logs
                (id, actor_email, actor_name, actor_role, target_type, target_id,
                 target_owner_email, action, summary, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(record.id)
        .bind(&record.actor_email)
        .bind(&record.actor_name)
        .bind(record.actor_role.as_str())
        .bind(record.target_type.as_str())
        .bind(&record.target_id)
        .bind(&record.target_owner_email)
        .bind(record.action.as_str())
        .bind(&record.summary)
        .bind(Json(&record.metadata))
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self, filter: &ChangeFilter, offset: u64, limit: u64) -> Result<Vec<ChangeRecord>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT id, actor_email, actor_name, actor_role, target_type, target_id, \
             target_owner_email, action, summary, metadata, created_at FROM change_logs",
        );
        push_change_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC OFFSET ")
            .push_bind(offset as i64)
            .push(" LIMIT ")
            .push_bind(limit as i64);

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(change_from_row).collect()
    }

    async fn count(&self, filter: &ChangeFilter) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM change_logs");
        push_change_filter(&mut qb, filter);
        let (count,): (i64,) = qb.build_query_as().fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }
}
