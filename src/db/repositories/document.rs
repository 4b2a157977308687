//! Document repository

use crate::db::{Backend, DynDatabasePool};
use crate::models::{Document, DocumentStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{mysql::MySqlRow, sqlite::SqliteRow, MySqlPool, Row, SqlitePool};
use std::sync::Arc;

const SELECT_COLUMNS: &str =
    "SELECT id, title, student_name, status, created_at, updated_at, reviewed_at FROM documents";

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn create(&self, document: &Document) -> Result<Document>;
    async fn get_by_id(&self, id: &str) -> Result<Option<Document>>;
    /// List documents, newest first, optionally restricted to one status
    async fn list(&self, status: Option<DocumentStatus>) -> Result<Vec<Document>>;
    /// Move a document from `from` to `to`.
    ///
    /// The update only applies while the stored status still equals `from`;
    /// returns whether a row was changed.
    async fn update_status(
        &self,
        id: &str,
        from: DocumentStatus,
        to: DocumentStatus,
        reviewed_at: DateTime<Utc>,
    ) -> Result<bool>;
    /// Number of documents per status (statuses with no documents are omitted)
    async fn count_by_status(&self) -> Result<Vec<(DocumentStatus, i64)>>;
}

pub struct SqlxDocumentRepository {
    pool: DynDatabasePool,
}

impl SqlxDocumentRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn DocumentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl DocumentRepository for SqlxDocumentRepository {
    async fn create(&self, document: &Document) -> Result<Document> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => create_sqlite(pool, document).await,
            Backend::Mysql(pool) => create_mysql(pool, document).await,
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Document>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => get_by_id_sqlite(pool, id).await,
            Backend::Mysql(pool) => get_by_id_mysql(pool, id).await,
        }
    }

    async fn list(&self, status: Option<DocumentStatus>) -> Result<Vec<Document>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => list_sqlite(pool, status).await,
            Backend::Mysql(pool) => list_mysql(pool, status).await,
        }
    }

    async fn update_status(
        &self,
        id: &str,
        from: DocumentStatus,
        to: DocumentStatus,
        reviewed_at: DateTime<Utc>,
    ) -> Result<bool> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => update_status_sqlite(pool, id, from, to, reviewed_at).await,
            Backend::Mysql(pool) => update_status_mysql(pool, id, from, to, reviewed_at).await,
        }
    }

    async fn count_by_status(&self) -> Result<Vec<(DocumentStatus, i64)>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => count_by_status_sqlite(pool).await,
            Backend::Mysql(pool) => count_by_status_mysql(pool).await,
        }
    }
}

// SQLite implementations
async fn create_sqlite(pool: &SqlitePool, document: &Document) -> Result<Document> {
    sqlx::query(
        "INSERT INTO documents (id, title, student_name, status, created_at, updated_at, reviewed_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&document.id)
    .bind(&document.title)
    .bind(&document.student_name)
    .bind(document.status.as_str())
    .bind(document.created_at)
    .bind(document.updated_at)
    .bind(document.reviewed_at)
    .execute(pool)
    .await
    .context("Failed to create document")?;

    Ok(document.clone())
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Document>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get document by id")?;

    row.map(|r| row_to_document_sqlite(&r)).transpose()
}

async fn list_sqlite(pool: &SqlitePool, status: Option<DocumentStatus>) -> Result<Vec<Document>> {
    let rows = match status {
        Some(status) => {
            sqlx::query(&format!("{} WHERE status = ? ORDER BY created_at DESC", SELECT_COLUMNS))
                .bind(status.as_str())
                .fetch_all(pool)
                .await
        }
        None => {
            sqlx::query(&format!("{} ORDER BY created_at DESC", SELECT_COLUMNS))
                .fetch_all(pool)
                .await
        }
    }
    .context("Failed to list documents")?;

    rows.iter().map(row_to_document_sqlite).collect()
}

async fn update_status_sqlite(
    pool: &SqlitePool,
    id: &str,
    from: DocumentStatus,
    to: DocumentStatus,
    reviewed_at: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE documents SET status = ?, reviewed_at = ?, updated_at = ? WHERE id = ? AND status = ?",
    )
    .bind(to.as_str())
    .bind(reviewed_at)
    .bind(reviewed_at)
    .bind(id)
    .bind(from.as_str())
    .execute(pool)
    .await
    .context("Failed to update document status")?;

    Ok(result.rows_affected() > 0)
}

async fn count_by_status_sqlite(pool: &SqlitePool) -> Result<Vec<(DocumentStatus, i64)>> {
    let rows = sqlx::query("SELECT status, COUNT(*) AS count FROM documents GROUP BY status")
        .fetch_all(pool)
        .await
        .context("Failed to count documents by status")?;

    rows.iter()
        .map(|row| {
            let status: String = row.get("status");
            Ok::<_, anyhow::Error>((status.parse::<DocumentStatus>()?, row.get::<i64, _>("count")))
        })
        .collect()
}

fn row_to_document_sqlite(row: &SqliteRow) -> Result<Document> {
    let status: String = row.get("status");
    Ok(Document {
        id: row.get("id"),
        title: row.get("title"),
        student_name: row.get("student_name"),
        status: status.parse()?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        reviewed_at: row.get("reviewed_at"),
    })
}

// MySQL implementations
async fn create_mysql(pool: &MySqlPool, document: &Document) -> Result<Document> {
    sqlx::query(
        "INSERT INTO documents (id, title, student_name, status, created_at, updated_at, reviewed_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&document.id)
    .bind(&document.title)
    .bind(&document.student_name)
    .bind(document.status.as_str())
    .bind(document.created_at)
    .bind(document.updated_at)
    .bind(document.reviewed_at)
    .execute(pool)
    .await
    .context("Failed to create document")?;

    Ok(document.clone())
}

async fn get_by_id_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Document>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get document by id")?;

    row.map(|r| row_to_document_mysql(&r)).transpose()
}

async fn list_mysql(pool: &MySqlPool, status: Option<DocumentStatus>) -> Result<Vec<Document>> {
    let rows = match status {
        Some(status) => {
            sqlx::query(&format!("{} WHERE status = ? ORDER BY created_at DESC", SELECT_COLUMNS))
                .bind(status.as_str())
                .fetch_all(pool)
                .await
        }
        None => {
            sqlx::query(&format!("{} ORDER BY created_at DESC", SELECT_COLUMNS))
                .fetch_all(pool)
                .await
        }
    }
    .context("Failed to list documents")?;

    rows.iter().map(row_to_document_mysql).collect()
}

async fn update_status_mysql(
    pool: &MySqlPool,
    id: &str,
    from: DocumentStatus,
    to: DocumentStatus,
    reviewed_at: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE documents SET status = ?, reviewed_at = ?, updated_at = ? WHERE id = ? AND status = ?",
    )
    .bind(to.as_str())
    .bind(reviewed_at)
    .bind(reviewed_at)
    .bind(id)
    .bind(from.as_str())
    .execute(pool)
    .await
    .context("Failed to update document status")?;

    Ok(result.rows_affected() > 0)
}

async fn count_by_status_mysql(pool: &MySqlPool) -> Result<Vec<(DocumentStatus, i64)>> {
    let rows = sqlx::query("SELECT status, COUNT(*) AS count FROM documents GROUP BY status")
        .fetch_all(pool)
        .await
        .context("Failed to count documents by status")?;

    rows.iter()
        .map(|row| {
            let status: String = row.get("status");
            Ok::<_, anyhow::Error>((status.parse::<DocumentStatus>()?, row.get::<i64, _>("count")))
        })
        .collect()
}

fn row_to_document_mysql(row: &MySqlRow) -> Result<Document> {
    let status: String = row.get("status");
    Ok(Document {
        id: row.get("id"),
        title: row.get("title"),
        student_name: row.get("student_name"),
        status: status.parse()?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        reviewed_at: row.get("reviewed_at"),
    })
}
