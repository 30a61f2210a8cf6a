//! PostgreSQL diagram store.
//!
//! Uses sqlx for database operations and implements the DiagramStore trait.

use super::{StorageError, traits::DiagramStore};
use crate::models::{DiagramRecord, DiagramStyle, NewDiagram, SharingUpdate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const SELECT_COLUMNS: &str = "id, user_id, prompt, style, diagram_data, created_at, is_public, share_token, expires_at";

#[derive(sqlx::FromRow)]
struct DiagramRow {
    id: Uuid,
    user_id: Uuid,
    prompt: String,
    style: String,
    diagram_data: String,
    created_at: DateTime<Utc>,
    is_public: bool,
    share_token: String,
    expires_at: Option<DateTime<Utc>>,
}

impl From<DiagramRow> for DiagramRecord {
    fn from(row: DiagramRow) -> Self {
        DiagramRecord {
            id: row.id,
            user_id: row.user_id,
            prompt: row.prompt,
            style: DiagramStyle::from_tag(&row.style),
            diagram_data: row.diagram_data,
            created_at: row.created_at,
            is_public: row.is_public,
            share_token: row.share_token,
            expires_at: row.expires_at,
        }
    }
}

fn connection_error(e: sqlx::Error) -> StorageError {
    StorageError::ConnectionError(e.to_string())
}

/// PostgreSQL storage backend implementation.
pub struct PostgresDiagramStore {
    pool: PgPool,
}

impl PostgresDiagramStore {
    /// Create a new PostgreSQL storage backend.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DiagramStore for PostgresDiagramStore {
    async fn insert(
        &self,
        user_id: Uuid,
        diagram: NewDiagram,
    ) -> Result<DiagramRecord, StorageError> {
        let record = DiagramRecord::new(user_id, diagram);

        sqlx::query(
            r#"
            INSERT INTO diagrams (id, user_id, prompt, style, diagram_data, created_at, is_public, share_token, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.prompt)
        .bind(record.style.as_tag())
        .bind(&record.diagram_data)
        .bind(record.created_at)
        .bind(record.is_public)
        .bind(&record.share_token)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await
        .map_err(connection_error)?;

        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Option<DiagramRecord>, StorageError> {
        let row = sqlx::query_as::<_, DiagramRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM diagrams WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(connection_error)?;

        Ok(row.map(DiagramRecord::from))
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<DiagramRecord>, StorageError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, DiagramRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM diagrams WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(connection_error)?;

        Ok(rows.into_iter().map(DiagramRecord::from).collect())
    }

    async fn update_sharing(
        &self,
        id: Uuid,
        user_id: Uuid,
        update: SharingUpdate,
    ) -> Result<DiagramRecord, StorageError> {
        let row = sqlx::query_as::<_, DiagramRow>(&format!(
            r#"
            UPDATE diagrams
            SET is_public = $3, expires_at = $4
            WHERE id = $1 AND user_id = $2
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(update.is_public)
        .bind(update.expires_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(connection_error)?;

        row.map(DiagramRecord::from)
            .ok_or_else(|| StorageError::diagram_not_found(id))
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM diagrams WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(connection_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::diagram_not_found(id));
        }
        Ok(())
    }

    async fn find_by_share_token(
        &self,
        share_token: &str,
    ) -> Result<Option<DiagramRecord>, StorageError> {
        let row = sqlx::query_as::<_, DiagramRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM diagrams WHERE share_token = $1"
        ))
        .bind(share_token)
        .fetch_optional(&self.pool)
        .await
        .map_err(connection_error)?;

        Ok(row.map(DiagramRecord::from))
    }
}
