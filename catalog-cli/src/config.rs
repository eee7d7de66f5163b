//! Storage configuration for the catalog CLI
//!
//! Data directory resolution, first match wins:
//!
//! 1. `--data-dir` flag
//! 2. `COURSE_CATALOG_DIR` environment variable
//! 3. `<platform data dir>/course-catalog` (via `dirs`)
//! 4. `./.course-catalog`

use crate::types::{InputError, APP_DIR_NAME, DATA_DIR_ENV, FALLBACK_DATA_DIR, SQLITE_FILE};
use catalog_core::{CatalogError, FileStorage, KeyValueStorage};
use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

/// Where the four collections are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// One JSON file per collection
    #[default]
    Files,
    /// A single SQLite database (requires the `sqlite` feature)
    Sqlite,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Files => write!(f, "files"),
            Backend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for Backend {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "files" | "file" | "json" => Ok(Backend::Files),
            "sqlite" => Ok(Backend::Sqlite),
            _ => Err(InputError::UnknownBackend(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub data_dir: PathBuf,
    pub backend: Backend,
}

impl CatalogConfig {
    /// Resolve configuration from the flag, the environment and the platform
    pub fn resolve(data_dir_flag: Option<PathBuf>, backend: Backend) -> Self {
        let data_dir = resolve_data_dir(data_dir_flag, env::var_os(DATA_DIR_ENV), dirs::data_dir());
        debug!("Using {} storage in {}", backend, data_dir.display());
        Self { data_dir, backend }
    }

    /// Open the configured storage backend
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be opened, or if `sqlite` was
    /// requested from a build without the `sqlite` feature
    pub fn open_storage(&self) -> Result<Box<dyn KeyValueStorage>, CatalogError> {
        match self.backend {
            Backend::Files => Ok(Box::new(FileStorage::new(&self.data_dir))),
            Backend::Sqlite => open_sqlite(self.data_dir.join(SQLITE_FILE)),
        }
    }
}

/// Pick the data directory from already-read inputs
pub fn resolve_data_dir(
    flag: Option<PathBuf>,
    env_value: Option<OsString>,
    platform_dir: Option<PathBuf>,
) -> PathBuf {
    if let Some(dir) = flag {
        return dir;
    }
    if let Some(value) = env_value.filter(|v| !v.is_empty()) {
        return PathBuf::from(value);
    }
    match platform_dir {
        Some(dir) => dir.join(APP_DIR_NAME),
        None => PathBuf::from(FALLBACK_DATA_DIR),
    }
}

#[cfg(feature = "sqlite")]
fn open_sqlite(path: PathBuf) -> Result<Box<dyn KeyValueStorage>, CatalogError> {
    Ok(Box::new(catalog_core::SqliteStorage::open(path)?))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(_path: PathBuf) -> Result<Box<dyn KeyValueStorage>, CatalogError> {
    Err(CatalogError::Storage(
        "this build has no sqlite support; rebuild with --features sqlite".to_string(),
    ))
}
