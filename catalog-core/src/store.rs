//! Persistent catalog store
//!
//! [`CatalogStore`] pairs a [`Catalog`] with an injected [`KeyValueStorage`].
//! The dataset is loaded once on [`CatalogStore::open`], and after every
//! mutation that changed something the whole snapshot is written back.
//! Declined mutations (blank names, unknown ids, missing parents) do not
//! touch storage. A mutation whose save fails is rolled back in memory.
//!
//! # Example
//!
//! ```
//! use catalog_core::{CatalogStore, MemoryStorage};
//!
//! # fn main() -> catalog_core::Result<()> {
//! let mut store = CatalogStore::open(MemoryStorage::new())?;
//!
//! let lecture = store.create_course_type("Lecture")?.expect("non-blank name");
//! let algorithms = store.create_course("Algorithms")?.expect("non-blank name");
//! let offering = store
//!     .create_course_offering(algorithms.id, lecture.id)?
//!     .expect("both parents exist");
//! assert_eq!(offering.name, "Lecture - Algorithms");
//!
//! store.register_student(offering.id, "Alice")?;
//! store.delete_course_type(lecture.id)?;
//! assert!(store.catalog().list_registered_students(offering.id).is_empty());
//! # Ok(())
//! # }
//! ```

use crate::catalog::{CascadeReport, Catalog};
use crate::error::Result;
use crate::model::{Course, CourseOffering, CourseType, EntityId, Registration};
use crate::snapshot::Snapshot;
use crate::storage::KeyValueStorage;
use tracing::{debug, warn};

/// A [`Catalog`] persisted through `S` after every change
pub struct CatalogStore<S: KeyValueStorage> {
    catalog: Catalog,
    storage: S,
}

impl<S: KeyValueStorage> CatalogStore<S> {
    /// Load the dataset from `storage`
    ///
    /// Absent or malformed collections start empty.
    ///
    /// # Errors
    ///
    /// Returns error if the storage backend cannot be read
    pub fn open(storage: S) -> Result<Self> {
        let snapshot = Snapshot::load(&storage)?;
        Ok(Self {
            catalog: Catalog::from_snapshot(snapshot),
            storage,
        })
    }

    /// Read-only view of the current dataset
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Write the whole dataset to storage
    pub fn save(&mut self) -> Result<()> {
        self.catalog.snapshot().save(&mut self.storage)?;
        debug!("Saved catalog snapshot");
        Ok(())
    }

    /// Run a mutation and persist it if `changed` says it did something
    ///
    /// If the save fails the dataset is put back as it was before the
    /// mutation. Ids issued by the failed mutation stay used.
    fn apply<T>(
        &mut self,
        mutate: impl FnOnce(&mut Catalog) -> T,
        changed: impl FnOnce(&T) -> bool,
    ) -> Result<T> {
        let before = self.catalog.snapshot().clone();
        let outcome = mutate(&mut self.catalog);

        if changed(&outcome) {
            if let Err(err) = self.save() {
                warn!("Save failed, rolling back last change: {}", err);
                self.catalog.restore(before);
                return Err(err);
            }
        }
        Ok(outcome)
    }

    pub fn create_course_type(&mut self, name: &str) -> Result<Option<CourseType>> {
        self.apply(|c| c.create_course_type(name), Option::is_some)
    }

    pub fn update_course_type(&mut self, id: EntityId, new_name: &str) -> Result<bool> {
        self.apply(|c| c.update_course_type(id, new_name), |changed| *changed)
    }

    pub fn delete_course_type(&mut self, id: EntityId) -> Result<CascadeReport> {
        self.apply(|c| c.delete_course_type(id), CascadeReport::changed)
    }

    pub fn create_course(&mut self, name: &str) -> Result<Option<Course>> {
        self.apply(|c| c.create_course(name), Option::is_some)
    }

    pub fn update_course(&mut self, id: EntityId, new_name: &str) -> Result<bool> {
        self.apply(|c| c.update_course(id, new_name), |changed| *changed)
    }

    pub fn delete_course(&mut self, id: EntityId) -> Result<CascadeReport> {
        self.apply(|c| c.delete_course(id), CascadeReport::changed)
    }

    pub fn create_course_offering(
        &mut self,
        course_id: EntityId,
        course_type_id: EntityId,
    ) -> Result<Option<CourseOffering>> {
        self.apply(
            |c| c.create_course_offering(course_id, course_type_id),
            Option::is_some,
        )
    }

    pub fn update_course_offering(
        &mut self,
        id: EntityId,
        new_course_id: EntityId,
        new_course_type_id: EntityId,
    ) -> Result<bool> {
        self.apply(
            |c| c.update_course_offering(id, new_course_id, new_course_type_id),
            |changed| *changed,
        )
    }

    pub fn delete_course_offering(&mut self, id: EntityId) -> Result<CascadeReport> {
        self.apply(|c| c.delete_course_offering(id), CascadeReport::changed)
    }

    pub fn register_student(
        &mut self,
        course_offering_id: EntityId,
        student_name: &str,
    ) -> Result<Option<Registration>> {
        self.apply(
            |c| c.register_student(course_offering_id, student_name),
            Option::is_some,
        )
    }
}
