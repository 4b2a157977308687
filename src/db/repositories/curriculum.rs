//! Curriculum repository

use crate::db::{Backend, DynDatabasePool};
use crate::models::Curriculum;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait CurriculumRepository: Send + Sync {
    async fn create(&self, curriculum: &Curriculum) -> Result<Curriculum>;
    async fn get_by_id(&self, id: i64) -> Result<Option<Curriculum>>;
    async fn list(&self) -> Result<Vec<Curriculum>>;
    /// Set or clear the credit cap; returns whether the curriculum exists
    async fn set_max_credits(&self, id: i64, max_credits: Option<i32>) -> Result<bool>;
}

pub struct SqlxCurriculumRepository {
    pool: DynDatabasePool,
}

impl SqlxCurriculumRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CurriculumRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CurriculumRepository for SqlxCurriculumRepository {
    async fn create(&self, curriculum: &Curriculum) -> Result<Curriculum> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => create_sqlite(pool, curriculum).await,
            Backend::Mysql(pool) => create_mysql(pool, curriculum).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Curriculum>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => get_by_id_sqlite(pool, id).await,
            Backend::Mysql(pool) => get_by_id_mysql(pool, id).await,
        }
    }

    async fn list(&self) -> Result<Vec<Curriculum>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => list_sqlite(pool).await,
            Backend::Mysql(pool) => list_mysql(pool).await,
        }
    }

    async fn set_max_credits(&self, id: i64, max_credits: Option<i32>) -> Result<bool> {
        let result = match self.pool.backend() {
            Backend::Sqlite(pool) => {
                sqlx::query("UPDATE curriculums SET max_credits = ? WHERE id = ?")
                    .bind(max_credits)
                    .bind(id)
                    .execute(pool)
                    .await
                    .map(|r| r.rows_affected())
            }
            Backend::Mysql(pool) => {
                sqlx::query("UPDATE curriculums SET max_credits = ? WHERE id = ?")
                    .bind(max_credits)
                    .bind(id)
                    .execute(pool)
                    .await
                    .map(|r| r.rows_affected())
            }
        }
        .context("Failed to update curriculum max credits")?;

        // MySQL reports 0 affected rows when the value is unchanged
        if result > 0 {
            return Ok(true);
        }
        Ok(self.get_by_id(id).await?.is_some())
    }
}

// SQLite implementations
async fn create_sqlite(pool: &SqlitePool, curriculum: &Curriculum) -> Result<Curriculum> {
    let result = sqlx::query("INSERT INTO curriculums (name, max_credits, created_at) VALUES (?, ?, ?)")
        .bind(&curriculum.name)
        .bind(curriculum.max_credits)
        .bind(curriculum.created_at)
        .execute(pool)
        .await
        .context("Failed to create curriculum")?;

    Ok(Curriculum {
        id: result.last_insert_rowid(),
        ..curriculum.clone()
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Curriculum>> {
    let row = sqlx::query("SELECT id, name, max_credits, created_at FROM curriculums WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get curriculum by id")?;

    Ok(row.map(|r| Curriculum {
        id: r.get("id"),
        name: r.get("name"),
        max_credits: r.get("max_credits"),
        created_at: r.get("created_at"),
    }))
}

async fn list_sqlite(pool: &SqlitePool) -> Result<Vec<Curriculum>> {
    let rows = sqlx::query("SELECT id, name, max_credits, created_at FROM curriculums ORDER BY name")
        .fetch_all(pool)
        .await
        .context("Failed to list curriculums")?;

    Ok(rows
        .into_iter()
        .map(|r| Curriculum {
            id: r.get("id"),
            name: r.get("name"),
            max_credits: r.get("max_credits"),
            created_at: r.get("created_at"),
        })
        .collect())
}

// MySQL implementations
async fn create_mysql(pool: &MySqlPool, curriculum: &Curriculum) -> Result<Curriculum> {
    let result = sqlx::query("INSERT INTO curriculums (name, max_credits, created_at) VALUES (?, ?, ?)")
        .bind(&curriculum.name)
        .bind(curriculum.max_credits)
        .bind(curriculum.created_at)
        .execute(pool)
        .await
        .context("Failed to create curriculum")?;

    Ok(Curriculum {
        id: result.last_insert_id() as i64,
        ..curriculum.clone()
    })
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Curriculum>> {
    let row = sqlx::query("SELECT id, name, max_credits, created_at FROM curriculums WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get curriculum by id")?;

    Ok(row.map(|r| Curriculum {
        id: r.get("id"),
        name: r.get("name"),
        max_credits: r.get("max_credits"),
        created_at: r.get("created_at"),
    }))
}

async fn list_mysql(pool: &MySqlPool) -> Result<Vec<Curriculum>> {
    let rows = sqlx::query("SELECT id, name, max_credits, created_at FROM curriculums ORDER BY name")
        .fetch_all(pool)
        .await
        .context("Failed to list curriculums")?;

    Ok(rows
        .into_iter()
        .map(|r| Curriculum {
            id: r.get("id"),
            name: r.get("name"),
            max_credits: r.get("max_credits"),
            created_at: r.get("created_at"),
        })
        .collect())
}
