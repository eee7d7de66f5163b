//! Input parsing for the catalog CLI
//!
//! Identifiers arrive as text (command-line arguments or prompt answers) and
//! are parsed here, so a missing or non-numeric value is rejected before the
//! store is touched.

use crate::types::InputError;
use catalog_core::EntityId;

/// Parse a required numeric id
pub fn parse_id(field: &'static str, raw: &str) -> Result<EntityId, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InputError::Missing(field));
    }

    trimmed.parse().map_err(|_| InputError::NotNumeric {
        field,
        value: raw.to_string(),
    })
}

/// Parse an optional id filter; `None` or blank means "no filter"
pub fn parse_optional_id(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<EntityId>, InputError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_id(field, value).map(Some),
    }
}

/// Parse the course / course type pair used to create or update an offering
///
/// Either selection missing is reported as a single alert, mirroring the
/// pair of dropdowns it stands in for.
pub fn parse_offering_selection(
    course: Option<&str>,
    course_type: Option<&str>,
) -> Result<(EntityId, EntityId), InputError> {
    let (Some(course), Some(course_type)) = (course, course_type) else {
        return Err(InputError::MissingOfferingSelection);
    };
    if course.trim().is_empty() || course_type.trim().is_empty() {
        return Err(InputError::MissingOfferingSelection);
    }

    Ok((
        parse_id("course id", course)?,
        parse_id("course type id", course_type)?,
    ))
}
