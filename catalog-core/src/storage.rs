//! Key-value storage backends
//!
//! The catalog persists through a tiny string-to-string interface, so the
//! same snapshot logic works against memory, a directory of JSON files, or
//! (with the `sqlite` feature) a SQLite database.

use crate::error::{CatalogError, Result};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

/// String key-value store holding the serialized collections
pub trait KeyValueStorage {
    /// Read the value stored under `key`, or `None` if absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Store several values as one write
    ///
    /// Backends with transactions override this so a snapshot lands together.
    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<()> {
        (**self).set_many(entries)
    }
}

/// In-memory storage, lost when dropped
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls performed so far
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// Directory-backed storage: one `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir` as the storage root
    ///
    /// The directory is created lazily on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(CatalogError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStorage for FileStorage {
    /// A file that is not valid UTF-8 is malformed content, reported as absent
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        match String::from_utf8(bytes) {
            Ok(content) => Ok(Some(content)),
            Err(err) => {
                warn!("Ignoring non-UTF-8 content in {}: {}", path.display(), err);
                Ok(None)
            }
        }
    }

    /// Atomic write (temp file + rename), so a crash mid-write never leaves a
    /// truncated collection behind.
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        use tempfile::NamedTempFile;

        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        // Temp file must live in the same directory for the rename to be atomic
        let mut temp_file = NamedTempFile::new_in(&self.dir)?;
        temp_file.write_all(value.as_bytes())?;
        temp_file.as_file().sync_all()?;
        temp_file
            .persist(&path)
            .map_err(|err| CatalogError::Io(err.error))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_get_missing() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("courses").unwrap(), None);
    }

    #[test]
    fn test_memory_set_overwrites() {
        let mut storage = MemoryStorage::new();
        storage.set("courses", "[]").unwrap();
        storage.set("courses", "[1]").unwrap();

        assert_eq!(storage.get("courses").unwrap().as_deref(), Some("[1]"));
        assert_eq!(storage.write_count(), 2);
    }

    #[test]
    fn test_boxed_storage_delegates() {
        let mut storage: Box<dyn KeyValueStorage> = Box::new(MemoryStorage::new());
        storage
            .set_many(&[("a", "1".to_string()), ("b", "2".to_string())])
            .unwrap();

        assert_eq!(storage.get("b").unwrap().as_deref(), Some("2"));
    }

    // Integration tests for file I/O
    mod integration {
        use super::*;
        use tempfile::TempDir;

        #[test]
        fn test_write_read_roundtrip() {
            let temp_dir = TempDir::new().unwrap();
            let mut storage = FileStorage::new(temp_dir.path());

            storage.set("courseTypes", r#"[{"id":1,"name":"Lecture"}]"#).unwrap();

            assert_eq!(
                storage.get("courseTypes").unwrap().as_deref(),
                Some(r#"[{"id":1,"name":"Lecture"}]"#)
            );
            assert!(temp_dir.path().join("courseTypes.json").exists());
        }

        #[test]
        fn test_missing_file_is_none() {
            let temp_dir = TempDir::new().unwrap();
            let storage = FileStorage::new(temp_dir.path());

            assert_eq!(storage.get("courses").unwrap(), None);
        }

        #[test]
        fn test_non_utf8_file_is_none() {
            let temp_dir = TempDir::new().unwrap();
            fs::write(temp_dir.path().join("courses.json"), [0xff, 0xfe, b'[', b']']).unwrap();
            let storage = FileStorage::new(temp_dir.path());

            assert_eq!(storage.get("courses").unwrap(), None);
        }

        #[test]
        fn test_directory_creation() {
            let temp_dir = TempDir::new().unwrap();
            let nested = temp_dir.path().join("nested/deep/catalog");
            let mut storage = FileStorage::new(&nested);

            storage.set("courses", "[]").unwrap();

            assert!(nested.join("courses.json").exists());
        }

        #[test]
        fn test_rejects_path_like_keys() {
            let temp_dir = TempDir::new().unwrap();
            let mut storage = FileStorage::new(temp_dir.path());

            let result = storage.set("../escape", "[]");
            assert!(matches!(result, Err(CatalogError::InvalidKey(_))));
            assert!(storage.get("").is_err());
        }

        #[test]
        fn test_atomic_write_no_partial_files() {
            let temp_dir = TempDir::new().unwrap();
            let mut storage = FileStorage::new(temp_dir.path());

            storage.set("courses", "[]").unwrap();
            storage.set("courses", "[]").unwrap();

            let entries: Vec<_> = fs::read_dir(temp_dir.path())
                .unwrap()
                .filter_map(|e| e.ok())
                .collect();

            // Should only be courses.json, no temp files
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].file_name(), "courses.json");
        }
    }
}
