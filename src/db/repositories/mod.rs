//! Database repositories
//!
//! Each repository handles persistence for a single entity and dispatches
//! to SQLite or MySQL queries based on the pool backend.

pub mod curriculum;
pub mod document;

pub use curriculum::{CurriculumRepository, SqlxCurriculumRepository};
pub use document::{DocumentRepository, SqlxDocumentRepository};
