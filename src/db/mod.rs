//! Database layer
//!
//! SQLite (default, single-file deployment) and MySQL are supported behind
//! the [`DatabasePool`] trait. The driver is selected by configuration.
//!
//! ```ignore
//! use logbook_admin::config::DatabaseConfig;
//! use logbook_admin::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, Backend, DatabasePool, DynDatabasePool, MysqlDatabase,
    SqliteDatabase,
};
