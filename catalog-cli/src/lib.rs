//! Catalog CLI Library
//!
//! Input parsing, configuration and rendering helpers for the `catalog`
//! command-line tool.

pub mod config;
pub mod render;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use config::{Backend, CatalogConfig};
pub use types::{InputError, NamedKind};
