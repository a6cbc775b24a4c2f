//! Field validation helpers shared by the request payload types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors};

/// A single rejected field, as returned to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field name as it appears in the request body
    pub field: String,
    /// Human-readable reason
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    #[must_use]
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Flattens `validator` output into one entry per failed rule, sorted by field.
#[must_use]
pub fn collect_field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, failures)| {
            failures.iter().map(move |failure| FieldError {
                field: field.to_string(),
                message: failure
                    .message
                    .as_ref()
                    .map_or_else(|| format!("Invalid {field}"), ToString::to_string),
            })
        })
        .collect();

    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

/// Accepts RFC 3339 datetimes such as `2024-12-01T00:00:00.000Z`.
pub fn validate_iso_datetime(value: &str) -> Result<(), ValidationError> {
    if DateTime::parse_from_rfc3339(value).is_ok() {
        return Ok(());
    }

    let mut error = ValidationError::new("datetime");
    error.message = Some(Cow::from("Date must be an ISO-8601 datetime"));
    Err(error)
}

/// Parses an RFC 3339 datetime into UTC.
pub fn parse_iso_datetime(field: &str, value: &str) -> crate::errors::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| crate::errors::Error::invalid_field(field, "Date must be an ISO-8601 datetime"))
}

/// Trims a description and drops it when nothing is left.
#[must_use]
pub fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
