//! Intake form validation.
//!
//! Pure function over the patient record: returns field-keyed error messages.
//! Only the three demographic fields gate submission; symptoms, labs, history
//! and imaging are all optional. Re-run on every submit attempt, never cached.

use std::collections::BTreeMap;

use crate::models::PatientRecord;

/// Upper bound for a plausible age, inclusive.
const MAX_AGE: u32 = 120;

/// Validate a record for submission.
///
/// Empty map means the record is submittable. Keys are the form field names
/// (`age`, `gender`, `location`); values are the messages shown inline.
pub fn validate(record: &PatientRecord) -> BTreeMap<&'static str, String> {
    let mut errors = BTreeMap::new();

    if record.age.is_empty() {
        errors.insert("age", "Age is required.".to_string());
    } else {
        match record.age.parse::<u32>() {
            Ok(age) if age <= MAX_AGE => {}
            _ => {
                errors.insert("age", "Please enter a valid age.".to_string());
            }
        }
    }

    if record.gender.is_none() {
        errors.insert("gender", "Gender is required.".to_string());
    }

    if record.location.trim().is_empty() {
        errors.insert("location", "Location is required.".to_string());
    }

    errors
}

/// Whether a validated field currently holds a value.
///
/// The workflow clears a field's stored error as soon as the field becomes
/// non-empty, without re-running full validation; this is the emptiness check
/// it uses. Unknown field names count as present so stale keys always clear.
pub fn field_is_present(record: &PatientRecord, field: &str) -> bool {
    match field {
        "age" => !record.age.is_empty(),
        "gender" => record.gender.is_some(),
        "location" => !record.location.trim().is_empty(),
        _ => true,
    }
}
