//! # Kinero Core
//!
//! Core types and traits shared by every Kinero crate.
//!
//! - [`KineroError`] - Tagged failure type with a fixed HTTP taxonomy
//! - [`CanonicalError`] - The single error body shape clients see
//! - [`CorrelationId`] - Per-request correlation token
//! - [`RequestContext`] - Read-only request snapshot for handlers
//! - [`IdentityRecord`] / [`AuthenticatedIdentity`] - Authenticated caller
//! - [`IdentityStore`] - Lookup of user records by subject

#![doc(html_root_url = "https://docs.rs/kinero-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod identity;
mod store;

pub use context::{CorrelationId, RequestContext, CORRELATION_ID_HEADER};
pub use error::{
    CanonicalError, ErrorKind, FieldErrors, KineroError, KineroResult, PLACEHOLDER_MESSAGE,
};
pub use identity::{AuthenticatedIdentity, IdentityRecord};
pub use store::{IdentityStore, StoreError};
