//! User error types.

use crate::password::PasswordHashError;
use kinero_core::{FieldErrors, KineroError, StoreError};
use thiserror::Error;

/// Result type for user operations.
pub type UserResult<T> = Result<T, UserError>;

/// Message for failed logins, whichever credential was wrong.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Errors raised by the user service.
#[derive(Debug, Error)]
pub enum UserError {
    /// The request failed field validation.
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// Another account already uses this unique value.
    #[error("User already exists with {field}: '{value}'")]
    AlreadyExists {
        /// The conflicting field.
        field: &'static str,
        /// The conflicting value.
        value: String,
    },

    /// No account matches the lookup.
    #[error("User not found with {field}: '{value}'")]
    NotFound {
        /// The lookup field.
        field: &'static str,
        /// The lookup value.
        value: String,
    },

    /// Unknown email or wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The password KDF failed.
    #[error(transparent)]
    Hashing(#[from] PasswordHashError),
}

impl From<UserError> for KineroError {
    fn from(error: UserError) -> Self {
        match error {
            UserError::Validation(fields) => {
                KineroError::validation_with_fields("Validation failed", fields)
            }
            UserError::AlreadyExists { field, value } => {
                KineroError::already_exists("User", field, value)
            }
            UserError::NotFound { field, value } => {
                KineroError::not_found_resource("User", field, value)
            }
            UserError::InvalidCredentials => KineroError::unauthorized(INVALID_CREDENTIALS),
            UserError::Store(e) => KineroError::unclassified_with_source("User store failure", e),
            UserError::Hashing(e) => {
                KineroError::unclassified_with_source("Password hashing failure", e)
            }
        }
    }
}
