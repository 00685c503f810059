//! Error types for Kinero.
//!
//! This module provides [`KineroError`], the tagged failure type returned by
//! stores, services, and pipeline stages, and [`CanonicalError`], the single
//! response body shape every failure is normalized into.
//!
//! # Failure taxonomy
//!
//! | `KineroError` variant | Status | [`ErrorKind`] |
//! |---|---|---|
//! | `Validation` | 400 | `BadRequest` |
//! | `Unauthorized` | 401 | `Unauthorized` |
//! | `NotFound` | 404 | `NotFound` |
//! | `AlreadyExists` | 409 | `Conflict` |
//! | `Unclassified` | 500 | `InternalServerError` |
//!
//! Failures are plain values. Nothing in the request path panics or unwinds
//! to signal "not found" or "already exists"; the normalizer pattern-matches
//! on the variant instead.

use chrono::{DateTime, Utc};
use http::StatusCode;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`KineroError`].
pub type KineroResult<T> = Result<T, KineroError>;

/// Placeholder message used when a failure carries no message of its own.
pub const PLACEHOLDER_MESSAGE: &str = "An unexpected error occurred";

/// Normalized classification of a failure, as exposed in the error body.
///
/// Serialized as the HTTP reason phrase (`"Bad Request"`, `"Unauthorized"`,
/// ...) which is the `error` field of the canonical body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed input (400).
    #[serde(rename = "Bad Request")]
    BadRequest,
    /// Missing, bad, or expired credentials (401).
    #[serde(rename = "Unauthorized")]
    Unauthorized,
    /// Resource absent (404).
    #[serde(rename = "Not Found")]
    NotFound,
    /// Uniqueness violation (409).
    #[serde(rename = "Conflict")]
    Conflict,
    /// Anything unclassified (500).
    #[serde(rename = "Internal Server Error")]
    InternalServerError,
}

impl ErrorKind {
    /// Returns the HTTP status code for this kind.
    #[must_use]
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the label written to the `error` field of the body.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BadRequest => "Bad Request",
            Self::Unauthorized => "Unauthorized",
            Self::NotFound => "Not Found",
            Self::Conflict => "Conflict",
            Self::InternalServerError => "Internal Server Error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Standard failure type for Kinero.
///
/// # Example
///
/// ```
/// use kinero_core::{KineroError, ErrorKind};
///
/// fn require_email(email: &str) -> Result<(), KineroError> {
///     if email.is_empty() {
///         return Err(KineroError::validation("Email is required"));
///     }
///     Ok(())
/// }
///
/// let err = require_email("").unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::BadRequest);
/// ```
#[derive(Error, Debug)]
pub enum KineroError {
    /// Request validation failed.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
        /// Field-specific validation errors, in registration order.
        field_errors: Option<FieldErrors>,
    },

    /// The caller could not be authenticated.
    ///
    /// The message is the public, generic phrase. Precise reasons (bad
    /// signature, expiry, unknown subject) are logged, never carried here.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Generic public message.
        message: String,
    },

    /// A business resource does not exist.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
        /// The type of resource that was looked up.
        resource_type: Option<String>,
        /// The field used for the lookup.
        field: Option<String>,
    },

    /// A resource with the same unique key already exists.
    #[error("Conflict: {message}")]
    AlreadyExists {
        /// Human-readable error message naming the conflicting field.
        message: String,
        /// The type of resource.
        resource_type: Option<String>,
        /// The conflicting field.
        field: Option<String>,
    },

    /// Anything that does not fit another variant.
    #[error("Unclassified error: {}", message.as_deref().unwrap_or(PLACEHOLDER_MESSAGE))]
    Unclassified {
        /// The failure's own message, if it has one.
        message: Option<String>,
        /// The underlying error (never exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl KineroError {
    /// Creates a validation error with a message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    /// Creates a validation error with field-specific errors.
    #[must_use]
    pub fn validation_with_fields(message: impl Into<String>, field_errors: FieldErrors) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: Some(field_errors),
        }
    }

    /// Creates an unauthorized error with a generic public message.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            resource_type: None,
            field: None,
        }
    }

    /// Creates a not found error for a lookup by `field = value`.
    ///
    /// ```
    /// use kinero_core::KineroError;
    ///
    /// let err = KineroError::not_found_resource("User", "id", "42");
    /// assert_eq!(err.public_message(), "User not found with id: '42'");
    /// ```
    #[must_use]
    pub fn not_found_resource(
        resource_type: impl Into<String>,
        field: impl Into<String>,
        value: impl std::fmt::Display,
    ) -> Self {
        let resource_type = resource_type.into();
        let field = field.into();
        Self::NotFound {
            message: format!("{resource_type} not found with {field}: '{value}'"),
            resource_type: Some(resource_type),
            field: Some(field),
        }
    }

    /// Creates a conflict error for a duplicate `field = value`.
    ///
    /// ```
    /// use kinero_core::{ErrorKind, KineroError};
    ///
    /// let err = KineroError::already_exists("User", "email", "a@b.io");
    /// assert_eq!(err.kind(), ErrorKind::Conflict);
    /// assert!(err.public_message().contains("email"));
    /// ```
    #[must_use]
    pub fn already_exists(
        resource_type: impl Into<String>,
        field: impl Into<String>,
        value: impl std::fmt::Display,
    ) -> Self {
        let resource_type = resource_type.into();
        let field = field.into();
        Self::AlreadyExists {
            message: format!("{resource_type} already exists with {field}: '{value}'"),
            resource_type: Some(resource_type),
            field: Some(field),
        }
    }

    /// Creates an unclassified error with a message.
    #[must_use]
    pub fn unclassified(message: impl Into<String>) -> Self {
        Self::Unclassified {
            message: Some(message.into()),
            source: None,
        }
    }

    /// Creates an unclassified error wrapping a source error.
    pub fn unclassified_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Unclassified {
            message: Some(message.into()),
            source: Some(source.into()),
        }
    }

    /// Wraps an arbitrary error, using its display text as the message.
    pub fn from_source(source: impl Into<anyhow::Error>) -> Self {
        let source = source.into();
        let message = source.to_string();
        Self::Unclassified {
            message: (!message.is_empty()).then_some(message),
            source: Some(source),
        }
    }

    /// Returns the normalized kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::BadRequest,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::Conflict,
            Self::Unclassified { .. } => ErrorKind::InternalServerError,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    /// Returns the message for the canonical body.
    ///
    /// Validation failures use the first registered field message when
    /// field errors are present. Empty messages fall back to
    /// [`PLACEHOLDER_MESSAGE`]; the result is never empty.
    #[must_use]
    pub fn public_message(&self) -> &str {
        let message = match self {
            Self::Validation {
                message,
                field_errors,
            } => field_errors
                .as_ref()
                .and_then(FieldErrors::first_message)
                .unwrap_or(message.as_str()),
            Self::Unauthorized { message }
            | Self::NotFound { message, .. }
            | Self::AlreadyExists { message, .. } => message.as_str(),
            Self::Unclassified { message, .. } => message.as_deref().unwrap_or(PLACEHOLDER_MESSAGE),
        };

        if message.trim().is_empty() {
            PLACEHOLDER_MESSAGE
        } else {
            message
        }
    }

    /// Builds the canonical body for this failure.
    #[must_use]
    pub fn to_canonical(
        &self,
        path: impl Into<String>,
        correlation_id: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> CanonicalError {
        CanonicalError::new(
            self.kind(),
            self.public_message(),
            path,
            correlation_id,
            timestamp,
        )
    }
}

/// Field-specific validation errors.
///
/// Fields keep their registration order, so "the first validation message"
/// is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors {
    /// Map of field name to error messages, in registration order.
    pub fields: IndexMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Creates a new empty `FieldErrors`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Returns the first message of the first registered field.
    #[must_use]
    pub fn first_message(&self) -> Option<&str> {
        self.fields
            .values()
            .flat_map(|messages| messages.iter())
            .map(String::as_str)
            .next()
    }

    /// Returns `true` if there are no field errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Converts into a validation error, or `Ok(())` when empty.
    pub fn into_result(self) -> KineroResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(KineroError::validation_with_fields("Validation failed", self))
        }
    }
}

/// The canonical error body.
///
/// Every field is always present. Serialized as:
///
/// ```json
/// {
///   "timestamp": "2026-01-01T00:00:00Z",
///   "status": 401,
///   "error": "Unauthorized",
///   "message": "Invalid token",
///   "path": "/api/users/me",
///   "correlationId": "abc-123"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalError {
    /// When the error body was built.
    pub timestamp: DateTime<Utc>,
    /// HTTP status code.
    pub status: u16,
    /// Normalized error kind.
    pub error: ErrorKind,
    /// Public message; never empty.
    pub message: String,
    /// Request path that failed.
    pub path: String,
    /// Correlation id of the failing request (empty if none was assigned).
    pub correlation_id: String,
}

impl CanonicalError {
    /// Creates a canonical error, substituting the placeholder for an empty message.
    #[must_use]
    pub fn new(
        kind: ErrorKind,
        message: impl Into<String>,
        path: impl Into<String>,
        correlation_id: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = PLACEHOLDER_MESSAGE.to_string();
        }

        Self {
            timestamp,
            status: kind.status_code().as_u16(),
            error: kind,
            message,
            path: path.into(),
            correlation_id: correlation_id.into(),
        }
    }

    /// Serializes the body to JSON bytes.
    #[must_use]
    pub fn to_json(&self) -> Vec<u8> {
        // All fields are strings, integers, or RFC 3339 timestamps.
        serde_json::to_vec(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_taxonomy_status_codes() {
        let cases = [
            (KineroError::validation("bad"), 400, ErrorKind::BadRequest),
            (KineroError::unauthorized("Invalid token"), 401, ErrorKind::Unauthorized),
            (KineroError::not_found("gone"), 404, ErrorKind::NotFound),
            (KineroError::already_exists("User", "email", "x"), 409, ErrorKind::Conflict),
            (KineroError::unclassified("boom"), 500, ErrorKind::InternalServerError),
        ];

        for (error, status, kind) in cases {
            assert_eq!(error.status_code().as_u16(), status);
            assert_eq!(error.kind(), kind);
        }
    }

    #[test]
    fn test_first_registered_field_error_wins() {
        let mut fields = FieldErrors::new();
        fields.add("password", "Password must be at least 6 characters long");
        fields.add("email", "Email is required");
        fields.add("password", "Password is required");

        let error = KineroError::validation_with_fields("Validation failed", fields);
        assert_eq!(
            error.public_message(),
            "Password must be at least 6 characters long"
        );
    }

    #[test]
    fn test_validation_without_fields_uses_own_message() {
        let error = KineroError::validation("Malformed JSON body");
        assert_eq!(error.public_message(), "Malformed JSON body");
    }

    #[test]
    fn test_unclassified_without_message_uses_placeholder() {
        let error = KineroError::Unclassified {
            message: None,
            source: None,
        };
        assert_eq!(error.public_message(), PLACEHOLDER_MESSAGE);
    }

    #[test]
    fn test_empty_message_uses_placeholder() {
        let error = KineroError::not_found("  ");
        assert_eq!(error.public_message(), PLACEHOLDER_MESSAGE);
    }

    #[test]
    fn test_from_source_keeps_message() {
        let error = KineroError::from_source(anyhow::anyhow!("disk full"));
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.public_message(), "disk full");
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_already_exists_names_field() {
        let error = KineroError::already_exists("User", "email", "alice@example.com");
        assert_eq!(
            error.public_message(),
            "User already exists with email: 'alice@example.com'"
        );
    }

    #[test]
    fn test_canonical_error_serialization() {
        let error = KineroError::unauthorized("Invalid token");
        let body = error.to_canonical("/api/users/me", "abc-123", fixed_time());

        let json: serde_json::Value = serde_json::from_slice(&body.to_json()).unwrap();
        assert_eq!(json["status"], 401);
        assert_eq!(json["error"], "Unauthorized");
        assert_eq!(json["message"], "Invalid token");
        assert_eq!(json["path"], "/api/users/me");
        assert_eq!(json["correlationId"], "abc-123");
        assert_eq!(json["timestamp"], "2026-01-02T03:04:05Z");
    }

    #[test]
    fn test_canonical_error_fields_never_missing() {
        let body = CanonicalError::new(
            ErrorKind::InternalServerError,
            "",
            "/x",
            "",
            fixed_time(),
        );
        let json: serde_json::Value = serde_json::from_slice(&body.to_json()).unwrap();
        let object = json.as_object().unwrap();

        for key in ["timestamp", "status", "error", "message", "path", "correlationId"] {
            assert!(object.contains_key(key), "missing {key}");
            assert!(!object[key].is_null(), "null {key}");
        }
        assert_eq!(json["message"], PLACEHOLDER_MESSAGE);
        assert_eq!(json["correlationId"], "");
    }

    #[test]
    fn test_canonical_error_round_trip() {
        let body = KineroError::already_exists("User", "email", "a@b.io").to_canonical(
            "/api/users/register",
            "cid",
            fixed_time(),
        );
        let parsed: CanonicalError = serde_json::from_slice(&body.to_json()).unwrap();
        assert_eq!(parsed, body);
        assert_eq!(parsed.error, ErrorKind::Conflict);
    }

    #[test]
    fn test_field_errors_into_result() {
        assert!(FieldErrors::new().into_result().is_ok());

        let mut fields = FieldErrors::new();
        fields.add("email", "Must be a valid email address");
        let error = fields.into_result().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.public_message(), "Must be a valid email address");
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(ErrorKind::BadRequest.to_string(), "Bad Request");
        assert_eq!(ErrorKind::InternalServerError.label(), "Internal Server Error");
    }
}
