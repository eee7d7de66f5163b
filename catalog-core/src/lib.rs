//! Catalog Core Library
//!
//! Relational model for course types, courses, offerings and student
//! registrations, with cascade-delete rules and whole-snapshot persistence
//! over pluggable key-value storage.

pub mod catalog;
pub mod error;
pub mod ids;
pub mod model;
pub mod snapshot;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use catalog::{CascadeReport, Catalog};
pub use error::{CatalogError, Result};
pub use model::{Course, CourseOffering, CourseType, EntityId, Registration};
pub use snapshot::Snapshot;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStorage;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::CatalogStore;
