//! Identity store contract.
//!
//! The authentication stage only needs "find the user with this subject".
//! Any backend that can answer that question implements [`IdentityStore`].

use crate::identity::IdentityRecord;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors a store can report while looking up a subject.
///
/// A missing user is not an error; it is `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached.
    #[error("identity store unavailable: {0}")]
    Unavailable(String),

    /// The backend failed while serving the lookup.
    #[error("identity store failure: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl StoreError {
    /// Creates a backend failure wrapping a source error.
    pub fn backend(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Backend {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Looks up user records by subject.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use kinero_core::{IdentityRecord, IdentityStore, StoreError};
///
/// #[derive(Clone)]
/// struct Account(String);
///
/// impl IdentityRecord for Account {
///     fn subject(&self) -> &str {
///         &self.0
///     }
/// }
///
/// struct SingleAccount(Account);
///
/// #[async_trait]
/// impl IdentityStore for SingleAccount {
///     type Record = Account;
///
///     async fn find_by_subject(&self, subject: &str) -> Result<Option<Account>, StoreError> {
///         Ok((self.0 .0 == subject).then(|| self.0.clone()))
///     }
/// }
/// ```
#[async_trait]
pub trait IdentityStore: Send + Sync + 'static {
    /// The record type this store returns.
    type Record: IdentityRecord + Clone;

    /// Finds the record whose subject is exactly `subject`.
    async fn find_by_subject(&self, subject: &str) -> Result<Option<Self::Record>, StoreError>;
}

#[async_trait]
impl<S: IdentityStore> IdentityStore for Arc<S> {
    type Record = S::Record;

    async fn find_by_subject(&self, subject: &str) -> Result<Option<Self::Record>, StoreError> {
        (**self).find_by_subject(subject).await
    }
}
