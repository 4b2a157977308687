//! Data models
//!
//! Database entities and the derived admin statistics snapshot.

mod curriculum;
mod document;
mod stats;

pub use curriculum::{Curriculum, UpdateMaxCreditsInput};
pub use document::{CreateDocumentInput, Document, DocumentStatus, ReviewAction};
pub use stats::AdminStats;
