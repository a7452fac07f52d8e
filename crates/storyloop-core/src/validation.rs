//! Validation utilities.

use crate::{FieldError, StoryError};
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns a `StoryError` on failure.
    fn validate_request(&self) -> Result<(), StoryError> {
        self.validate().map_err(validation_errors_to_story_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Flattens `validator` output into field errors.
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: (*field).to_string(),
                message: error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string),
                code: error.code.to_string(),
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

/// Converts `validator::ValidationErrors` to `StoryError`.
#[must_use]
pub fn validation_errors_to_story_error(errors: ValidationErrors) -> StoryError {
    let fields = field_errors(&errors);
    let message = fields
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");

    StoryError::invalid_fields(message, fields)
}

/// Common validation functions.
pub mod rules {
    use crate::domain::session::parse_session_date;
    use std::borrow::Cow;
    use validator::ValidationError;

    fn error(code: &'static str, message: &'static str) -> ValidationError {
        let mut error = ValidationError::new(code);
        error.message = Some(Cow::Borrowed(message));
        error
    }

    /// Validates that a string is not blank (not empty after trimming).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(error("not_blank", "must not be blank"));
        }
        Ok(())
    }

    /// Validates a `YYYY-MM-DD` session date.
    pub fn session_date(value: &str) -> Result<(), ValidationError> {
        parse_session_date(value)
            .map(|_| ())
            .ok_or_else(|| error("session_date", "Invalid session parameters"))
    }

    /// Validates a UUID string.
    pub fn uuid(value: &str) -> Result<(), ValidationError> {
        uuid::Uuid::parse_str(value.trim())
            .map(|_| ())
            .map_err(|_| error("uuid", "must be a UUID"))
    }

    /// Validates an absolute http(s) URL.
    pub fn http_url(value: &str) -> Result<(), ValidationError> {
        let value = value.trim();
        let has_scheme = value.starts_with("https://") || value.starts_with("http://");
        if !has_scheme || value.contains(char::is_whitespace) {
            return Err(error("http_url", "must be an http(s) URL"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::rules::*;
    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(custom(function = "not_blank"))]
        fingerprint: String,
        #[validate(custom(function = "session_date"))]
        date: String,
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("hello").is_ok());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("").is_err());
    }

    #[test]
    fn test_session_date() {
        assert!(session_date("2024-05-01").is_ok());
        assert!(session_date("2024-13-01").is_err());
        assert!(session_date("yesterday").is_err());
    }

    #[test]
    fn test_uuid() {
        assert!(uuid("0190f1a4-8a1b-7c3d-9e2f-0123456789ab").is_ok());
        assert!(uuid("0190f1a4").is_err());
    }

    #[test]
    fn test_http_url() {
        assert!(http_url("https://cdn.example/video.mp4").is_ok());
        assert!(http_url("ftp://cdn.example/video.mp4").is_err());
        assert!(http_url("https://cdn.example/a b.mp4").is_err());
    }

    #[test]
    fn test_validate_request_collects_fields() {
        let sample = Sample {
            fingerprint: " ".into(),
            date: "nope".into(),
        };
        let err = sample.validate_request().unwrap_err();
        let fields = err.field_errors().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].field, "date");
        assert_eq!(fields[1].code, "not_blank");
    }
}
