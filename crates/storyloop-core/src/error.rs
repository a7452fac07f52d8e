//! Unified error types for all layers of the application.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for all layers of Storyloop.
///
/// Domain variants carry the message shown to API clients verbatim, so
/// they render without a prefix.
#[derive(Error, Debug)]
pub enum StoryError {
    // ============ Domain Errors ============
    /// Resource not found
    #[error("{resource_type} not found")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Validation error
    #[error("{0}")]
    Validation(String),

    /// Validation error with per-field details
    #[error("{message}")]
    InvalidFields {
        message: String,
        fields: Vec<FieldError>,
    },

    /// Conflict error (e.g., duplicate entry)
    #[error("{0}")]
    Conflict(String),

    /// Business rule violation
    #[error("{0}")]
    BusinessRule(String),

    // ============ Authentication/Authorization Errors ============
    /// Unauthorized access
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden access
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Invalid token
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token expired
    #[error("Token expired")]
    TokenExpired,

    /// Invalid credentials
    #[error("Invalid credentials")]
    InvalidCredentials,

    // ============ Infrastructure Errors ============
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Redis/Cache error
    #[error("Cache error: {0}")]
    Cache(String),

    // ============ Resilience Errors ============
    /// Rate limit exceeded
    #[error("{0}")]
    RateLimitExceeded(String),

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoryError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation(_) | Self::InvalidFields { .. } | Self::BusinessRule(_) => 400,
            Self::Conflict(_) => 409,
            Self::Unauthorized(_) | Self::InvalidToken(_) | Self::TokenExpired | Self::InvalidCredentials => 401,
            Self::Forbidden(_) => 403,
            Self::RateLimitExceeded(_) => 429,
            Self::Database(_)
            | Self::Configuration(_)
            | Self::Cache(_)
            | Self::Internal(_)
            | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) | Self::InvalidFields { .. } => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvalidToken(_) => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::RateLimitExceeded(_) => "RATE_LIMIT_EXCEEDED",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a validation error carrying field-level details.
    #[must_use]
    pub fn invalid_fields<T: Into<String>>(message: T, fields: Vec<FieldError>) -> Self {
        Self::InvalidFields {
            message: message.into(),
            fields,
        }
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict<T: Into<String>>(message: T) -> Self {
        Self::Conflict(message.into())
    }

    /// Creates a business rule error.
    #[must_use]
    pub fn business_rule<T: Into<String>>(message: T) -> Self {
        Self::BusinessRule(message.into())
    }

    /// Creates a rate limit error.
    #[must_use]
    pub fn rate_limited<T: Into<String>>(message: T) -> Self {
        Self::RateLimitExceeded(message.into())
    }

    /// Creates an unauthorized error.
    #[must_use]
    pub fn unauthorized<T: Into<String>>(message: T) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Creates a forbidden error.
    #[must_use]
    pub fn forbidden<T: Into<String>>(message: T) -> Self {
        Self::Forbidden(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Field-level details, if this error has any.
    #[must_use]
    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            Self::InvalidFields { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// Checks if this error is retriable.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Cache(_))
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for StoryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound {
                resource_type: "Row",
                id: "unknown".to_string(),
            },
            sqlx::Error::Database(db_err) => {
                // PostgreSQL unique violation
                if db_err.code().as_deref() == Some("23505") {
                    return Self::Conflict(db_err.message().to_string());
                }
                Self::Database(err.to_string())
            }
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}

/// Serializable error response for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional field-level errors for validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
    /// Request trace ID for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// Field-level validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FieldError {
    /// Field name
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
}

impl FieldError {
    /// Creates a field error.
    #[must_use]
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

impl ErrorResponse {
    /// Creates a new error response from a `StoryError`.
    #[must_use]
    pub fn from_error(error: &StoryError) -> Self {
        Self {
            code: error.error_code().to_string(),
            message: error.to_string(),
            details: error.field_errors().map(<[FieldError]>::to_vec),
            trace_id: None,
        }
    }

    /// Sets the trace ID.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Sets field-level validation errors.
    #[must_use]
    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&StoryError> for ErrorResponse {
    fn from(error: &StoryError) -> Self {
        Self::from_error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(StoryError::not_found("Submission", 1).status_code(), 404);
        assert_eq!(StoryError::validation("Invalid user ID").status_code(), 400);
        assert_eq!(StoryError::business_rule("Cannot vote on your own submission").status_code(), 400);
        assert_eq!(StoryError::unauthorized("missing token").status_code(), 401);
        assert_eq!(StoryError::forbidden("admin only").status_code(), 403);
        assert_eq!(StoryError::conflict("duplicate").status_code(), 409);
        assert_eq!(StoryError::rate_limited("slow down").status_code(), 429);
        assert_eq!(StoryError::Database("down".to_string()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(StoryError::not_found("Story", 1).error_code(), "NOT_FOUND");
        assert_eq!(StoryError::invalid_fields("Invalid phrase", vec![]).error_code(), "VALIDATION_ERROR");
        assert_eq!(StoryError::TokenExpired.error_code(), "TOKEN_EXPIRED");
        assert_eq!(StoryError::rate_limited("x").error_code(), "RATE_LIMIT_EXCEEDED");
    }

    #[test]
    fn test_domain_messages_render_verbatim() {
        assert_eq!(StoryError::not_found("Submission", "abc").to_string(), "Submission not found");
        assert_eq!(
            StoryError::conflict("You have already voted in this session").to_string(),
            "You have already voted in this session"
        );
    }

    #[test]
    fn test_retriable_errors() {
        assert!(StoryError::Database("connection lost".to_string()).is_retriable());
        assert!(StoryError::Cache("redis unavailable".to_string()).is_retriable());
        assert!(!StoryError::not_found("Story", 1).is_retriable());
        assert!(!StoryError::conflict("dup").is_retriable());
    }

    #[test]
    fn test_error_response_carries_field_details() {
        let err = StoryError::invalid_fields(
            "Invalid phrase",
            vec![FieldError::new("phrase", "too_many_words", "Maximum 10 words allowed")],
        );
        let response = ErrorResponse::from_error(&err);
        assert_eq!(response.message, "Invalid phrase");
        assert_eq!(response.details.map(|d| d.len()), Some(1));
    }

    #[test]
    fn test_error_response_with_trace_id() {
        let err = StoryError::not_found("Episode", 1);
        let response = ErrorResponse::from_error(&err).with_trace_id("trace-123");
        assert_eq!(response.trace_id, Some("trace-123".to_string()));
        assert!(response.details.is_none());
    }
}
