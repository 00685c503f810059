//! Core middleware stages.
//!
//! The standard pipeline runs these in order:
//!
//! 1. [`correlation`] - assign and echo the correlation id
//! 2. [`error_normalization`] - convert failures to canonical bodies
//! 3. [`authentication`] - verify bearer tokens and attach the identity

pub mod authentication;
pub mod correlation;
pub mod error_normalization;

pub use authentication::AuthenticationMiddleware;
pub use correlation::CorrelationMiddleware;
pub use error_normalization::{ErrorNormalizationMiddleware, ErrorNormalizer};
