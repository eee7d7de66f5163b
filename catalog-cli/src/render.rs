//! Text rendering for catalog listings
//!
//! Plain strings only; colors are applied by the binary.

use catalog_core::{CascadeReport, CourseOffering, EntityId, Registration};
use serde::Serialize;

use crate::types::NO_STUDENTS;

/// JSON shape for `student list --json`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster<'a> {
    pub course_offering_id: EntityId,
    pub students: Vec<&'a str>,
}

impl<'a> Roster<'a> {
    pub fn new(course_offering_id: EntityId, registrations: &[&'a Registration]) -> Self {
        Self {
            course_offering_id,
            students: registrations
                .iter()
                .map(|r| r.student_name.as_str())
                .collect(),
        }
    }
}

/// Student names joined by `, `, or a notice when there are none
pub fn format_roster(registrations: &[&Registration]) -> String {
    if registrations.is_empty() {
        return NO_STUDENTS.to_string();
    }

    registrations
        .iter()
        .map(|r| r.student_name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One list row: `<id>  <name>`
pub fn format_row(id: EntityId, name: &str) -> String {
    format!("{:>15}  {}", id, name)
}

/// One offering row with its foreign keys
pub fn format_offering(offering: &CourseOffering) -> String {
    format!(
        "{}  (course {}, type {})",
        format_row(offering.id, &offering.name),
        offering.course_id,
        offering.course_type_id
    )
}

/// Summary of what a cascading delete removed, e.g. "2 offerings, 3 registrations"
pub fn format_cascade(report: &CascadeReport) -> String {
    format!(
        "{} {}, {} {}",
        report.offerings_removed,
        plural(report.offerings_removed, "offering", "offerings"),
        report.registrations_removed,
        plural(report.registrations_removed, "registration", "registrations")
    )
}

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 {
        one
    } else {
        many
    }
}
