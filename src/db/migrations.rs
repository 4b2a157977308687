//! Database migrations
//!
//! Migrations are embedded in the binary as SQL strings for SQLite and
//! MySQL. Each one carries an `up` and a `down` script so it can be
//! reverted. Applied versions are tracked in the `_migrations` table.
//!
//! ```ignore
//! use logbook_admin::db::{create_pool, migrations};
//!
//! let pool = create_pool(&config).await?;
//! migrations::run_migrations(&pool).await?;
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};

use super::pool::Backend;
use super::DynDatabasePool;
use crate::config::DatabaseDriver;

/// A reversible database migration with SQL for both SQLite and MySQL
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version number (unique, ascending)
    pub version: i32,
    /// Human-readable migration name
    pub name: &'static str,
    pub up_sqlite: &'static str,
    pub up_mysql: &'static str,
    pub down_sqlite: &'static str,
    pub down_mysql: &'static str,
}

impl Migration {
    fn up_sql(&self, driver: DatabaseDriver) -> &'static str {
        match driver {
            DatabaseDriver::Sqlite => self.up_sqlite,
            DatabaseDriver::Mysql => self.up_mysql,
        }
    }

    fn down_sql(&self, driver: DatabaseDriver) -> &'static str {
        match driver {
            DatabaseDriver::Sqlite => self.down_sqlite,
            DatabaseDriver::Mysql => self.down_mysql,
        }
    }
}

/// Migration record stored in the database
#[derive(Debug, Clone)]
pub struct MigrationRecord {
    pub version: i64,
    pub name: String,
    pub applied_at: DateTime<Utc>,
}

/// All migrations, in application order.
pub const MIGRATIONS: &[Migration] = &[
    // Migration 1: Logbook documents under review
    Migration {
        version: 1,
        name: "create_documents",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS documents (
                id VARCHAR(64) PRIMARY KEY,
                title VARCHAR(255) NOT NULL,
                student_name VARCHAR(255) NOT NULL,
                status VARCHAR(20) NOT NULL DEFAULT 'pending',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                reviewed_at TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_documents_status ON documents(status);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS documents (
                id VARCHAR(64) PRIMARY KEY,
                title VARCHAR(255) NOT NULL,
                student_name VARCHAR(255) NOT NULL,
                status VARCHAR(20) NOT NULL DEFAULT 'pending',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
                reviewed_at TIMESTAMP NULL
            );
            CREATE INDEX idx_documents_status ON documents(status);
        "#,
        down_sqlite: r#"
            DROP INDEX IF EXISTS idx_documents_status;
            DROP TABLE IF EXISTS documents;
        "#,
        down_mysql: r#"
            DROP TABLE IF EXISTS documents;
        "#,
    },
    // Migration 2: Curriculums (owned by curriculum management)
    Migration {
        version: 2,
        name: "create_curriculums",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS curriculums (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(255) NOT NULL UNIQUE,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS curriculums (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                name VARCHAR(255) NOT NULL UNIQUE,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
        "#,
        down_sqlite: "DROP TABLE IF EXISTS curriculums;",
        down_mysql: "DROP TABLE IF EXISTS curriculums;",
    },
    // Migration 3: Optional credit cap; NULL means no cap is enforced
    Migration {
        version: 3,
        name: "add_curriculum_max_credits",
        up_sqlite: "ALTER TABLE curriculums ADD COLUMN max_credits INTEGER NULL;",
        up_mysql: "ALTER TABLE curriculums ADD COLUMN max_credits INT NULL;",
        down_sqlite: "ALTER TABLE curriculums DROP COLUMN max_credits;",
        down_mysql: "ALTER TABLE curriculums DROP COLUMN max_credits;",
    },
];

/// Run all pending migrations
///
/// Creates the tracking table if needed, then applies every migration
/// whose version is not yet recorded, in order.
///
/// # Returns
///
/// Number of migrations applied
///
/// # Errors
///
/// Returns an error if any migration fails to apply. The failing migration
/// is not recorded and later migrations are not attempted.
pub async fn run_migrations(pool: &DynDatabasePool) -> Result<usize> {
    create_migrations_table(pool).await?;

    let applied = get_applied_migrations(pool).await?;
    let applied_versions: Vec<i32> = applied.iter().map(|m| m.version as i32).collect();

    let mut count = 0;

    for migration in MIGRATIONS {
        if !applied_versions.contains(&migration.version) {
            tracing::info!("Applying migration {}: {}", migration.version, migration.name);
            apply_migration(pool, migration)
                .await
                .with_context(|| format!("Failed to apply migration: {}", migration.name))?;
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Applied {} migration(s)", count);
    } else {
        tracing::debug!("No pending migrations");
    }

    Ok(count)
}

/// Revert a single applied migration by running its down script
///
/// Returns `false` when the version is known but not currently applied.
pub async fn revert_migration(pool: &DynDatabasePool, version: i32) -> Result<bool> {
    let migration = get_migration(version)
        .with_context(|| format!("Unknown migration version: {}", version))?;

    create_migrations_table(pool).await?;
    let applied = get_applied_migrations(pool).await?;
    if !applied.iter().any(|m| m.version == i64::from(version)) {
        tracing::debug!("Migration {} is not applied, nothing to revert", version);
        return Ok(false);
    }

    tracing::info!("Reverting migration {}: {}", migration.version, migration.name);
    unapply_migration(pool, migration)
        .await
        .with_context(|| format!("Failed to revert migration: {}", migration.name))?;

    Ok(true)
}

/// Revert the most recently applied migration
///
/// Returns the reverted version, or `None` if nothing is applied.
pub async fn rollback_last(pool: &DynDatabasePool) -> Result<Option<i32>> {
    create_migrations_table(pool).await?;
    let applied = get_applied_migrations(pool).await?;

    let Some(last) = applied.iter().map(|m| m.version as i32).max() else {
        return Ok(None);
    };

    revert_migration(pool, last).await?;
    Ok(Some(last))
}

/// Create the migrations tracking table if it doesn't exist
async fn create_migrations_table(pool: &DynDatabasePool) -> Result<()> {
    let sql = match pool.driver() {
        DatabaseDriver::Sqlite => {
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                name VARCHAR(255) NOT NULL UNIQUE,
                applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#
        }
        DatabaseDriver::Mysql => {
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version INT PRIMARY KEY,
                name VARCHAR(255) NOT NULL UNIQUE,
                applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#
        }
    };

    pool.execute(sql).await?;
    Ok(())
}

/// Get list of already applied migrations
pub async fn get_applied_migrations(pool: &DynDatabasePool) -> Result<Vec<MigrationRecord>> {
    match pool.backend() {
        Backend::Sqlite(pool) => get_applied_migrations_sqlite(pool).await,
        Backend::Mysql(pool) => get_applied_migrations_mysql(pool).await,
    }
}

async fn get_applied_migrations_sqlite(pool: &SqlitePool) -> Result<Vec<MigrationRecord>> {
    let rows = sqlx::query("SELECT version, name, applied_at FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| MigrationRecord {
            version: row.get("version"),
            name: row.get("name"),
            applied_at: row.get("applied_at"),
        })
        .collect())
}

async fn get_applied_migrations_mysql(pool: &MySqlPool) -> Result<Vec<MigrationRecord>> {
    let rows = sqlx::query("SELECT version, name, applied_at FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| MigrationRecord {
            version: i64::from(row.get::<i32, _>("version")),
            name: row.get("name"),
            applied_at: row.get("applied_at"),
        })
        .collect())
}

async fn apply_migration(pool: &DynDatabasePool, migration: &Migration) -> Result<()> {
    let sql = migration.up_sql(pool.driver());
    match pool.backend() {
        Backend::Sqlite(pool) => {
            execute_statements_sqlite(pool, sql).await?;
            sqlx::query("INSERT INTO _migrations (version, name, applied_at) VALUES (?, ?, ?)")
                .bind(migration.version)
                .bind(migration.name)
                .bind(Utc::now())
                .execute(pool)
                .await?;
        }
        Backend::Mysql(pool) => {
            execute_statements_mysql(pool, sql).await?;
            sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
                .bind(migration.version)
                .bind(migration.name)
                .execute(pool)
                .await?;
        }
    }
    Ok(())
}

async fn unapply_migration(pool: &DynDatabasePool, migration: &Migration) -> Result<()> {
    let sql = migration.down_sql(pool.driver());
    match pool.backend() {
        Backend::Sqlite(pool) => {
            execute_statements_sqlite(pool, sql).await?;
            sqlx::query("DELETE FROM _migrations WHERE version = ?")
                .bind(migration.version)
                .execute(pool)
                .await?;
        }
        Backend::Mysql(pool) => {
            execute_statements_mysql(pool, sql).await?;
            sqlx::query("DELETE FROM _migrations WHERE version = ?")
                .bind(migration.version)
                .execute(pool)
                .await?;
        }
    }
    Ok(())
}

async fn execute_statements_sqlite(pool: &SqlitePool, sql: &str) -> Result<()> {
    for statement in split_sql_statements(sql) {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
    }
    Ok(())
}

async fn execute_statements_mysql(pool: &MySqlPool, sql: &str) -> Result<()> {
    for statement in split_sql_statements(sql) {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
    }
    Ok(())
}

/// Truncate SQL for error messages
fn truncate_sql(sql: &str) -> String {
    match sql.char_indices().nth(100) {
        Some((idx, _)) => format!("{}...", &sql[..idx]),
        None => sql.to_string(),
    }
}

/// Split SQL into individual statements, skipping comment-only fragments
fn split_sql_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty() && !is_comment_only(stmt))
        .collect()
}

/// Check if a string contains only SQL comments
fn is_comment_only(s: &str) -> bool {
    s.lines().all(|line| {
        let trimmed = line.trim();
        trimmed.is_empty() || trimmed.starts_with("--")
    })
}

/// Get pending migrations count
pub async fn pending_count(pool: &DynDatabasePool) -> Result<usize> {
    create_migrations_table(pool).await?;

    let applied = get_applied_migrations(pool).await?;
    Ok(MIGRATIONS
        .iter()
        .filter(|m| !applied.iter().any(|a| a.version == i64::from(m.version)))
        .count())
}

/// Get migration by version
pub fn get_migration(version: i32) -> Option<&'static Migration> {
    MIGRATIONS.iter().find(|m| m.version == version)
}
