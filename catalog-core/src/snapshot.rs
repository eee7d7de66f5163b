//! Whole-dataset snapshots
//!
//! The dataset is stored as four independent JSON values under fixed keys.
//! Loading is forgiving: a key that is absent or holds malformed JSON yields
//! an empty collection. Saving always writes all four keys.

use crate::error::Result;
use crate::model::{Course, CourseOffering, CourseType, EntityId, Registration};
use crate::storage::KeyValueStorage;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Storage keys for the four collections
pub mod keys {
    pub const COURSE_TYPES: &str = "courseTypes";
    pub const COURSES: &str = "courses";
    pub const COURSE_OFFERINGS: &str = "courseOfferings";
    pub const REGISTRATIONS: &str = "registrations";

    /// All keys, in the order they are written
    pub const ALL: &[&str] = &[COURSE_TYPES, COURSES, COURSE_OFFERINGS, REGISTRATIONS];
}

/// The four collections, each in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub course_types: Vec<CourseType>,

    #[serde(default)]
    pub courses: Vec<Course>,

    #[serde(default)]
    pub course_offerings: Vec<CourseOffering>,

    #[serde(default)]
    pub registrations: Vec<Registration>,
}

impl Snapshot {
    /// Load all four collections from storage
    ///
    /// # Errors
    ///
    /// Returns error only if the storage itself cannot be read. Malformed
    /// values are logged and treated as empty.
    pub fn load<S: KeyValueStorage + ?Sized>(storage: &S) -> Result<Self> {
        let snapshot = Snapshot {
            course_types: load_collection(storage, keys::COURSE_TYPES)?,
            courses: load_collection(storage, keys::COURSES)?,
            course_offerings: load_collection(storage, keys::COURSE_OFFERINGS)?,
            registrations: load_collection(storage, keys::REGISTRATIONS)?,
        };

        info!(
            "Loaded catalog: {} course types, {} courses, {} offerings, {} registrations",
            snapshot.course_types.len(),
            snapshot.courses.len(),
            snapshot.course_offerings.len(),
            snapshot.registrations.len()
        );

        Ok(snapshot)
    }

    /// Write all four collections to storage
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails or storage rejects a write
    pub fn save<S: KeyValueStorage + ?Sized>(&self, storage: &mut S) -> Result<()> {
        let values = [
            (keys::COURSE_TYPES, serde_json::to_string(&self.course_types)?),
            (keys::COURSES, serde_json::to_string(&self.courses)?),
            (
                keys::COURSE_OFFERINGS,
                serde_json::to_string(&self.course_offerings)?,
            ),
            (
                keys::REGISTRATIONS,
                serde_json::to_string(&self.registrations)?,
            ),
        ];

        storage.set_many(&values)
    }

    /// Every entity id across the four collections
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        let type_ids = self.course_types.iter().map(|t| t.id);
        let course_ids = self.courses.iter().map(|c| c.id);
        let offering_ids = self.course_offerings.iter().map(|o| o.id);
        let registration_ids = self.registrations.iter().map(|r| r.id);

        type_ids
            .chain(course_ids)
            .chain(offering_ids)
            .chain(registration_ids)
    }

    /// Largest id across every collection, if any entity exists
    pub fn max_id(&self) -> Option<EntityId> {
        self.ids().max()
    }

    pub fn is_empty(&self) -> bool {
        self.course_types.is_empty()
            && self.courses.is_empty()
            && self.course_offerings.is_empty()
            && self.registrations.is_empty()
    }
}

fn load_collection<T, S>(storage: &S, key: &str) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    S: KeyValueStorage + ?Sized,
{
    let Some(raw) = storage.get(key)? else {
        return Ok(Vec::new());
    };

    match serde_json::from_str::<Option<Vec<T>>>(&raw) {
        Ok(items) => Ok(items.unwrap_or_default()),
        Err(err) => {
            warn!("Ignoring malformed '{}' collection: {}", key, err);
            Ok(Vec::new())
        }
    }
}
