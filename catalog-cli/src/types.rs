// Shared types for the catalog CLI

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// User input rejected before any store operation runs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Please select a course and a course type.")]
    MissingOfferingSelection,

    #[error("Please enter a {0}.")]
    Missing(&'static str),

    #[error("Invalid {field} '{value}': expected a numeric id")]
    NotNumeric { field: &'static str, value: String },

    #[error("Unknown storage backend '{0}'. Valid backends: files, sqlite")]
    UnknownBackend(String),
}

// ============================================================================
// Entity Kinds
// ============================================================================

/// The two parent entity kinds, which share add/rename/rm/list commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedKind {
    CourseType,
    Course,
}

impl NamedKind {
    /// Human-readable label used in messages
    pub fn label(&self) -> &'static str {
        match self {
            NamedKind::CourseType => "course type",
            NamedKind::Course => "course",
        }
    }
}

// ============================================================================
// Constants
// ============================================================================

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "COURSE_CATALOG_DIR";

/// Directory name under the platform data directory
pub const APP_DIR_NAME: &str = "course-catalog";

/// Used when the platform has no data directory
pub const FALLBACK_DATA_DIR: &str = ".course-catalog";

/// Database file name for the sqlite backend
pub const SQLITE_FILE: &str = "catalog.db";

/// Shown when an offering has no registrations
pub const NO_STUDENTS: &str = "No students registered.";
