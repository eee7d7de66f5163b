//! Entity definitions for the four catalog collections
//!
//! Field names serialize in camelCase so the stored JSON has exactly the
//! shape of the original tables (`courseId`, `courseTypeId`, ...).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier shared by every entity kind
///
/// Signed 64-bit so snapshots keyed by millisecond timestamps load unchanged.
pub type EntityId = i64;

/// A category of teaching (e.g. "Lecture", "Seminar")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseType {
    pub id: EntityId,
    pub name: String,
}

/// A subject that can be taught (e.g. "Algorithms")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: EntityId,
    pub name: String,
}

/// An enrollable pairing of a course and a course type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseOffering {
    pub id: EntityId,
    pub course_id: EntityId,
    pub course_type_id: EntityId,

    /// Display name, computed from the parents when the offering was last
    /// created or updated. Not refreshed when a parent is renamed.
    pub name: String,
}

impl CourseOffering {
    /// Build the display name `"{type} - {course}"`
    pub fn display_name(course_type: &CourseType, course: &Course) -> String {
        format!("{} - {}", course_type.name, course.name)
    }
}

/// A student enrolled in an offering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: EntityId,
    pub course_offering_id: EntityId,
    pub student_name: String,
}

impl fmt::Display for CourseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Display for CourseOffering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Returns true if the name is empty or only whitespace
pub(crate) fn is_blank(name: &str) -> bool {
    name.trim().is_empty()
}
