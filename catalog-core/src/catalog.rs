//! In-memory relational model
//!
//! [`Catalog`] holds the four collections and enforces referential integrity:
//!
//! - an offering is only created or re-pointed when both its course and its
//!   course type exist
//! - deleting a course or course type deletes the offerings that use it, and
//!   the registrations of those offerings
//! - deleting an offering deletes its registrations
//!
//! Nothing here fails. Blank names and unknown ids are declined silently,
//! reported through `Option`, `bool` or an empty [`CascadeReport`]. A create
//! is also declined in the unlikely case that no unused id is left.

use crate::ids::IdGenerator;
use crate::model::{is_blank, Course, CourseOffering, CourseType, EntityId, Registration};
use crate::snapshot::Snapshot;
use std::collections::HashSet;
use tracing::{debug, warn};

/// What a delete removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    /// Whether the target entity existed
    pub removed: bool,
    /// Offerings removed by the cascade (or the target itself, for offerings)
    pub offerings_removed: usize,
    /// Registrations removed by the cascade
    pub registrations_removed: usize,
}

impl CascadeReport {
    /// Whether anything at all was removed
    pub fn changed(&self) -> bool {
        self.removed || self.offerings_removed > 0 || self.registrations_removed > 0
    }
}

/// The four collections plus the session's id source
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    data: Snapshot,
    ids: IdGenerator,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a loaded snapshot; new ids never collide with any id in it
    pub fn from_snapshot(data: Snapshot) -> Self {
        let ids = IdGenerator::for_existing(data.ids());
        Self { data, ids }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.data
    }

    /// Replace the collections, keeping the id source
    ///
    /// Ids handed out before the restore stay used.
    pub(crate) fn restore(&mut self, data: Snapshot) {
        self.data = data;
    }

    /// The highest sequence id issued (or loaded) so far
    pub fn last_issued_id(&self) -> EntityId {
        self.ids.last()
    }

    pub fn into_snapshot(self) -> Snapshot {
        self.data
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn course_types(&self) -> &[CourseType] {
        &self.data.course_types
    }

    pub fn courses(&self) -> &[Course] {
        &self.data.courses
    }

    pub fn course_offerings(&self) -> &[CourseOffering] {
        &self.data.course_offerings
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.data.registrations
    }

    pub fn course_type(&self, id: EntityId) -> Option<&CourseType> {
        self.data.course_types.iter().find(|t| t.id == id)
    }

    pub fn course(&self, id: EntityId) -> Option<&Course> {
        self.data.courses.iter().find(|c| c.id == id)
    }

    pub fn course_offering(&self, id: EntityId) -> Option<&CourseOffering> {
        self.data.course_offerings.iter().find(|o| o.id == id)
    }

    // ------------------------------------------------------------------
    // Course types
    // ------------------------------------------------------------------

    /// Append a course type, or return `None` if `name` is blank
    pub fn create_course_type(&mut self, name: &str) -> Option<CourseType> {
        if is_blank(name) {
            return None;
        }

        let course_type = CourseType {
            id: self.fresh_id()?,
            name: name.to_string(),
        };
        debug!("Created course type {} '{}'", course_type.id, course_type.name);
        self.data.course_types.push(course_type.clone());
        Some(course_type)
    }

    /// Rename a course type
    ///
    /// Offerings keep their existing display names. Returns false if the id
    /// is unknown or the new name is blank.
    pub fn update_course_type(&mut self, id: EntityId, new_name: &str) -> bool {
        if is_blank(new_name) {
            return false;
        }

        match self.data.course_types.iter_mut().find(|t| t.id == id) {
            Some(course_type) => {
                course_type.name = new_name.to_string();
                debug!("Renamed course type {} to '{}'", id, new_name);
                true
            }
            None => false,
        }
    }

    /// Delete a course type and every offering (and registration) using it
    pub fn delete_course_type(&mut self, id: EntityId) -> CascadeReport {
        let before = self.data.course_types.len();
        self.data.course_types.retain(|t| t.id != id);

        let mut report = self.remove_offerings(|o| o.course_type_id == id);
        report.removed = self.data.course_types.len() != before;
        debug!("Deleted course type {}: {:?}", id, report);
        report
    }

    // ------------------------------------------------------------------
    // Courses
    // ------------------------------------------------------------------

    /// Append a course, or return `None` if `name` is blank
    pub fn create_course(&mut self, name: &str) -> Option<Course> {
        if is_blank(name) {
            return None;
        }

        let course = Course {
            id: self.fresh_id()?,
            name: name.to_string(),
        };
        debug!("Created course {} '{}'", course.id, course.name);
        self.data.courses.push(course.clone());
        Some(course)
    }

    /// Rename a course; see [`Catalog::update_course_type`]
    pub fn update_course(&mut self, id: EntityId, new_name: &str) -> bool {
        if is_blank(new_name) {
            return false;
        }

        match self.data.courses.iter_mut().find(|c| c.id == id) {
            Some(course) => {
                course.name = new_name.to_string();
                debug!("Renamed course {} to '{}'", id, new_name);
                true
            }
            None => false,
        }
    }

    /// Delete a course and every offering (and registration) using it
    pub fn delete_course(&mut self, id: EntityId) -> CascadeReport {
        let before = self.data.courses.len();
        self.data.courses.retain(|c| c.id != id);

        let mut report = self.remove_offerings(|o| o.course_id == id);
        report.removed = self.data.courses.len() != before;
        debug!("Deleted course {}: {:?}", id, report);
        report
    }

    // ------------------------------------------------------------------
    // Offerings
    // ------------------------------------------------------------------

    /// Pair a course with a course type
    ///
    /// Returns `None` if either parent does not exist.
    pub fn create_course_offering(
        &mut self,
        course_id: EntityId,
        course_type_id: EntityId,
    ) -> Option<CourseOffering> {
        let name = self.offering_name(course_id, course_type_id)?;

        let offering = CourseOffering {
            id: self.fresh_id()?,
            course_id,
            course_type_id,
            name,
        };
        debug!("Created offering {} '{}'", offering.id, offering.name);
        self.data.course_offerings.push(offering.clone());
        Some(offering)
    }

    /// Re-point an offering at a new course and course type
    ///
    /// The display name is recomputed. Returns false (and changes nothing) if
    /// either parent is missing or the offering does not exist.
    pub fn update_course_offering(
        &mut self,
        id: EntityId,
        new_course_id: EntityId,
        new_course_type_id: EntityId,
    ) -> bool {
        let Some(name) = self.offering_name(new_course_id, new_course_type_id) else {
            return false;
        };

        match self.data.course_offerings.iter_mut().find(|o| o.id == id) {
            Some(offering) => {
                offering.course_id = new_course_id;
                offering.course_type_id = new_course_type_id;
                offering.name = name;
                debug!("Updated offering {} to '{}'", id, offering.name);
                true
            }
            None => false,
        }
    }

    /// Delete an offering and its registrations
    pub fn delete_course_offering(&mut self, id: EntityId) -> CascadeReport {
        let mut report = self.remove_offerings(|o| o.id == id);
        report.removed = report.offerings_removed > 0;
        debug!("Deleted offering {}: {:?}", id, report);
        report
    }

    /// Offerings with the given course type, or all of them for `None`
    pub fn filter_offerings_by_type(&self, type_id: Option<EntityId>) -> Vec<&CourseOffering> {
        self.data
            .course_offerings
            .iter()
            .filter(|o| type_id.map_or(true, |t| o.course_type_id == t))
            .collect()
    }

    // ------------------------------------------------------------------
    // Registrations
    // ------------------------------------------------------------------

    /// Register a student, or return `None` if the name is blank
    ///
    /// The offering id is accepted as-is, even if no such offering exists.
    pub fn register_student(
        &mut self,
        course_offering_id: EntityId,
        student_name: &str,
    ) -> Option<Registration> {
        if is_blank(student_name) {
            return None;
        }

        let registration = Registration {
            id: self.fresh_id()?,
            course_offering_id,
            student_name: student_name.to_string(),
        };
        debug!(
            "Registered '{}' for offering {}",
            registration.student_name, course_offering_id
        );
        self.data.registrations.push(registration.clone());
        Some(registration)
    }

    /// Registrations for an offering, in insertion order
    pub fn list_registered_students(&self, course_offering_id: EntityId) -> Vec<&Registration> {
        self.data
            .registrations
            .iter()
            .filter(|r| r.course_offering_id == course_offering_id)
            .collect()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn fresh_id(&mut self) -> Option<EntityId> {
        let id = self.ids.next_id();
        if id.is_none() {
            warn!("No unused id left, declining create");
        }
        id
    }

    fn offering_name(&self, course_id: EntityId, course_type_id: EntityId) -> Option<String> {
        let course = self.course(course_id)?;
        let course_type = self.course_type(course_type_id)?;
        Some(CourseOffering::display_name(course_type, course))
    }

    /// Remove matching offerings and the registrations that point at them
    fn remove_offerings<F>(&mut self, matches: F) -> CascadeReport
    where
        F: Fn(&CourseOffering) -> bool,
    {
        let doomed: HashSet<EntityId> = self
            .data
            .course_offerings
            .iter()
            .filter(|&o| matches(o))
            .map(|o| o.id)
            .collect();

        if doomed.is_empty() {
            return CascadeReport::default();
        }

        let offerings_before = self.data.course_offerings.len();
        self.data.course_offerings.retain(|o| !doomed.contains(&o.id));

        let registrations_before = self.data.registrations.len();
        self.data
            .registrations
            .retain(|r| !doomed.contains(&r.course_offering_id));

        CascadeReport {
            removed: false,
            offerings_removed: offerings_before - self.data.course_offerings.len(),
            registrations_removed: registrations_before - self.data.registrations.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Catalog with types Lecture/Seminar and courses Algorithms/Databases
    fn seeded() -> (Catalog, [EntityId; 4]) {
        let mut catalog = Catalog::new();
        let lecture = catalog.create_course_type("Lecture").unwrap().id;
        let seminar = catalog.create_course_type("Seminar").unwrap().id;
        let algorithms = catalog.create_course("Algorithms").unwrap().id;
        let databases = catalog.create_course("Databases").unwrap().id;
        (catalog, [lecture, seminar, algorithms, databases])
    }

    fn student_names(catalog: &Catalog, offering: EntityId) -> Vec<&str> {
        catalog
            .list_registered_students(offering)
            .iter()
            .map(|r| r.student_name.as_str())
            .collect()
    }

    #[test]
    fn test_blank_names_are_declined() {
        let mut catalog = Catalog::new();

        assert!(catalog.create_course_type("").is_none());
        assert!(catalog.create_course_type("   ").is_none());
        assert!(catalog.create_course("\t\n").is_none());

        assert!(catalog.course_types().is_empty());
        assert!(catalog.courses().is_empty());
    }

    #[test]
    fn test_names_are_stored_untrimmed() {
        let mut catalog = Catalog::new();
        let course_type = catalog.create_course_type(" Lecture ").unwrap();
        assert_eq!(course_type.name, " Lecture ");
    }

    #[test]
    fn test_ids_unique_across_entity_kinds() {
        let (mut catalog, ids) = seeded();
        let offering = catalog.create_course_offering(ids[2], ids[0]).unwrap();
        let registration = catalog.register_student(offering.id, "Alice").unwrap();

        let mut all = ids.to_vec();
        all.push(offering.id);
        all.push(registration.id);
        let distinct: HashSet<_> = all.iter().collect();
        assert_eq!(distinct.len(), all.len());
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let mut catalog = Catalog::new();
        let first = catalog.create_course("Algorithms").unwrap().id;
        catalog.delete_course(first);
        let second = catalog.create_course("Algorithms").unwrap().id;
        assert!(second > first);
    }

    #[test]
    fn test_update_course_type() {
        let (mut catalog, [lecture, ..]) = seeded();

        assert!(catalog.update_course_type(lecture, "Lab"));
        assert_eq!(catalog.course_type(lecture).unwrap().name, "Lab");
    }

    #[test]
    fn test_update_unknown_or_blank_is_noop() {
        let (mut catalog, [lecture, _, algorithms, _]) = seeded();

        assert!(!catalog.update_course_type(-1, "Lab"));
        assert!(!catalog.update_course(-1, "Graphs"));
        assert!(!catalog.update_course_type(lecture, "  "));
        assert!(!catalog.update_course(algorithms, ""));

        assert_eq!(catalog.course_type(lecture).unwrap().name, "Lecture");
        assert_eq!(catalog.course(algorithms).unwrap().name, "Algorithms");
    }

    #[test]
    fn test_offering_display_name() {
        let (mut catalog, [lecture, seminar, algorithms, databases]) = seeded();

        let a = catalog.create_course_offering(algorithms, lecture).unwrap();
        let b = catalog.create_course_offering(databases, seminar).unwrap();

        assert_eq!(a.name, "Lecture - Algorithms");
        assert_eq!(b.name, "Seminar - Databases");
        assert_eq!(a.course_id, algorithms);
        assert_eq!(a.course_type_id, lecture);
    }

    #[test]
    fn test_offering_requires_both_parents() {
        let (mut catalog, [lecture, _, algorithms, _]) = seeded();

        assert!(catalog.create_course_offering(-1, lecture).is_none());
        assert!(catalog.create_course_offering(algorithms, -1).is_none());
        // Ids of the wrong kind do not count as parents
        assert!(catalog.create_course_offering(lecture, algorithms).is_none());

        assert!(catalog.course_offerings().is_empty());
    }

    #[test]
    fn test_offering_name_goes_stale_on_parent_rename() {
        let (mut catalog, [lecture, _, algorithms, _]) = seeded();
        let offering = catalog.create_course_offering(algorithms, lecture).unwrap();

        catalog.update_course_type(lecture, "Lab");
        catalog.update_course(algorithms, "Graphs");

        assert_eq!(
            catalog.course_offering(offering.id).unwrap().name,
            "Lecture - Algorithms"
        );
    }

    #[test]
    fn test_update_offering_recomputes_name() {
        let (mut catalog, [lecture, seminar, algorithms, databases]) = seeded();
        let offering = catalog.create_course_offering(algorithms, lecture).unwrap();

        catalog.update_course_type(seminar, "Workshop");
        assert!(catalog.update_course_offering(offering.id, databases, seminar));

        let updated = catalog.course_offering(offering.id).unwrap();
        assert_eq!(updated.course_id, databases);
        assert_eq!(updated.course_type_id, seminar);
        assert_eq!(updated.name, "Workshop - Databases");
    }

    #[test]
    fn test_update_offering_with_missing_parent_is_noop() {
        let (mut catalog, [lecture, _, algorithms, _]) = seeded();
        let offering = catalog.create_course_offering(algorithms, lecture).unwrap();

        assert!(!catalog.update_course_offering(offering.id, -1, lecture));
        assert!(!catalog.update_course_offering(offering.id, algorithms, -1));
        assert!(!catalog.update_course_offering(-1, algorithms, lecture));

        assert_eq!(catalog.course_offering(offering.id), Some(&offering));
    }

    #[test]
    fn test_delete_course_type_cascades_transitively() {
        let (mut catalog, [lecture, seminar, algorithms, databases]) = seeded();
        let doomed_a = catalog.create_course_offering(algorithms, lecture).unwrap();
        let kept = catalog.create_course_offering(algorithms, seminar).unwrap();
        let doomed_b = catalog.create_course_offering(databases, lecture).unwrap();

        catalog.register_student(doomed_a.id, "Alice");
        catalog.register_student(kept.id, "Bob");
        catalog.register_student(doomed_b.id, "Carol");
        catalog.register_student(doomed_b.id, "Dave");

        let report = catalog.delete_course_type(lecture);

        assert_eq!(
            report,
            CascadeReport {
                removed: true,
                offerings_removed: 2,
                registrations_removed: 3,
            }
        );
        assert!(catalog.course_type(lecture).is_none());
        assert_eq!(catalog.course_offerings(), &[kept.clone()]);
        assert_eq!(student_names(&catalog, kept.id), vec!["Bob"]);
        assert_eq!(catalog.registrations().len(), 1);
        // Courses are untouched
        assert_eq!(catalog.courses().len(), 2);
    }

    #[test]
    fn test_delete_course_cascades_transitively() {
        let (mut catalog, [lecture, seminar, algorithms, databases]) = seeded();
        let doomed = catalog.create_course_offering(algorithms, lecture).unwrap();
        let kept = catalog.create_course_offering(databases, seminar).unwrap();
        catalog.register_student(doomed.id, "Alice");
        catalog.register_student(kept.id, "Bob");

        let report = catalog.delete_course(algorithms);

        assert!(report.removed);
        assert_eq!(report.offerings_removed, 1);
        assert_eq!(report.registrations_removed, 1);
        assert_eq!(catalog.course_offerings(), &[kept.clone()]);
        assert_eq!(student_names(&catalog, kept.id), vec!["Bob"]);
        assert_eq!(catalog.course_types().len(), 2);
    }

    #[test]
    fn test_delete_offering_removes_only_its_registrations() {
        let (mut catalog, [lecture, seminar, algorithms, _]) = seeded();
        let doomed = catalog.create_course_offering(algorithms, lecture).unwrap();
        let kept = catalog.create_course_offering(algorithms, seminar).unwrap();
        catalog.register_student(doomed.id, "Alice");
        catalog.register_student(kept.id, "Bob");
        catalog.register_student(doomed.id, "Carol");

        let report = catalog.delete_course_offering(doomed.id);

        assert_eq!(report.offerings_removed, 1);
        assert_eq!(report.registrations_removed, 2);
        assert!(catalog.course_offering(doomed.id).is_none());
        assert!(catalog.list_registered_students(doomed.id).is_empty());
        assert_eq!(student_names(&catalog, kept.id), vec!["Bob"]);
        // Parents are untouched
        assert_eq!(catalog.course_types().len(), 2);
        assert_eq!(catalog.courses().len(), 2);
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let (mut catalog, [lecture, _, algorithms, _]) = seeded();
        catalog.create_course_offering(algorithms, lecture).unwrap();

        assert!(!catalog.delete_course_type(-1).changed());
        assert!(!catalog.delete_course(-1).changed());
        assert!(!catalog.delete_course_offering(-1).changed());
        assert_eq!(catalog.course_offerings().len(), 1);
    }

    #[test]
    fn test_delete_type_without_offerings() {
        let (mut catalog, [_, seminar, ..]) = seeded();

        let report = catalog.delete_course_type(seminar);

        assert!(report.removed);
        assert_eq!(report.offerings_removed, 0);
        assert_eq!(catalog.course_types().len(), 1);
    }

    #[test]
    fn test_filter_offerings_by_type() {
        let (mut catalog, [lecture, seminar, algorithms, databases]) = seeded();
        let a = catalog.create_course_offering(algorithms, lecture).unwrap();
        let b = catalog.create_course_offering(algorithms, seminar).unwrap();
        let c = catalog.create_course_offering(databases, lecture).unwrap();

        assert_eq!(catalog.filter_offerings_by_type(None), vec![&a, &b, &c]);
        assert_eq!(catalog.filter_offerings_by_type(Some(lecture)), vec![&a, &c]);
        assert_eq!(catalog.filter_offerings_by_type(Some(seminar)), vec![&b]);
        assert!(catalog.filter_offerings_by_type(Some(-1)).is_empty());
    }

    #[test]
    fn test_register_and_list_in_insertion_order() {
        let (mut catalog, [lecture, _, algorithms, _]) = seeded();
        let offering = catalog.create_course_offering(algorithms, lecture).unwrap();

        catalog.register_student(offering.id, "Zoe");
        catalog.register_student(offering.id, "Alice");
        assert!(catalog.register_student(offering.id, "  ").is_none());

        assert_eq!(student_names(&catalog, offering.id), vec!["Zoe", "Alice"]);
    }

    #[test]
    fn test_register_for_unknown_offering_is_accepted() {
        // Registration does not check that the offering exists
        let mut catalog = Catalog::new();

        let registration = catalog.register_student(42, "Alice").unwrap();

        assert_eq!(registration.course_offering_id, 42);
        assert_eq!(student_names(&catalog, 42), vec!["Alice"]);
    }

    #[test]
    fn test_from_snapshot_ids_stay_above_loaded() {
        let far_future = chrono::Utc::now().timestamp_millis() + 10_000_000;
        let snapshot = Snapshot {
            courses: vec![Course {
                id: far_future,
                name: "Algorithms".to_string(),
            }],
            ..Default::default()
        };

        let mut catalog = Catalog::from_snapshot(snapshot);
        let created = catalog.create_course_type("Lecture").unwrap();

        assert_eq!(created.id, far_future + 1);
        assert_eq!(catalog.courses().len(), 1);
    }

    #[test]
    fn test_ids_stay_distinct_after_max_id_loaded() {
        let snapshot = Snapshot {
            courses: vec![Course {
                id: EntityId::MAX,
                name: "Algorithms".to_string(),
            }],
            ..Default::default()
        };

        let mut catalog = Catalog::from_snapshot(snapshot);
        let lecture = catalog.create_course_type("Lecture").unwrap();
        let seminar = catalog.create_course_type("Seminar").unwrap();

        assert_ne!(lecture.id, EntityId::MAX);
        assert_ne!(seminar.id, EntityId::MAX);
        assert_ne!(lecture.id, seminar.id);

        let all: HashSet<EntityId> = catalog.snapshot().ids().collect();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_restore_keeps_id_source() {
        let mut catalog = Catalog::new();
        let before = catalog.snapshot().clone();
        let lecture = catalog.create_course_type("Lecture").unwrap();

        catalog.restore(before);
        assert!(catalog.course_types().is_empty());

        let seminar = catalog.create_course_type("Seminar").unwrap();
        assert!(seminar.id > lecture.id);
    }

    #[test]
    fn test_lecture_algorithms_scenario() {
        let mut catalog = Catalog::new();
        let lecture = catalog.create_course_type("Lecture").unwrap();
        let algorithms = catalog.create_course("Algorithms").unwrap();

        let offering = catalog
            .create_course_offering(algorithms.id, lecture.id)
            .unwrap();
        assert_eq!(offering.name, "Lecture - Algorithms");

        catalog.register_student(offering.id, "Alice").unwrap();
        assert_eq!(student_names(&catalog, offering.id), vec!["Alice"]);

        catalog.delete_course_type(lecture.id);

        assert!(catalog.course_offering(offering.id).is_none());
        assert!(catalog.registrations().is_empty());
        assert!(catalog.list_registered_students(offering.id).is_empty());
    }
}
