//! Authenticated caller identity.
//!
//! An [`IdentityRecord`] is whatever the application stores for a user.
//! Once a token has been verified and the record loaded, it is wrapped in an
//! [`AuthenticatedIdentity`] and published to the request context.

use chrono::{DateTime, Utc};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A stored user record that can back an authenticated request.
///
/// # Example
///
/// ```rust
/// use kinero_core::IdentityRecord;
///
/// struct Account {
///     email: String,
/// }
///
/// impl IdentityRecord for Account {
///     fn subject(&self) -> &str {
///         &self.email
///     }
/// }
/// ```
pub trait IdentityRecord: Send + Sync + 'static {
    /// The unique login identifier this record is looked up by.
    fn subject(&self) -> &str;

    /// Tokens issued at or before this instant are no longer accepted.
    ///
    /// Returns `None` when the record has never revoked its tokens.
    fn tokens_invalidated_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// The identity attached to a request after successful authentication.
///
/// Holds the subject and the full user record behind an `Arc`, so cloning is
/// cheap and handlers can downcast to their concrete record type.
#[derive(Clone)]
pub struct AuthenticatedIdentity {
    subject: String,
    user: Arc<dyn Any + Send + Sync>,
}

impl AuthenticatedIdentity {
    /// Wraps a loaded record.
    pub fn new<R: IdentityRecord>(record: R) -> Self {
        Self {
            subject: record.subject().to_string(),
            user: Arc::new(record),
        }
    }

    /// Returns the authenticated subject.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the user record if it is of type `T`.
    #[must_use]
    pub fn user<T: 'static>(&self) -> Option<&T> {
        self.user.downcast_ref::<T>()
    }

    /// Returns a string identifier suitable for logging.
    ///
    /// Never includes tokens or other secrets.
    #[must_use]
    pub fn log_id(&self) -> String {
        format!("user:{}", self.subject)
    }
}

impl fmt::Debug for AuthenticatedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedIdentity")
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Account {
        email: String,
        plan: &'static str,
    }

    impl IdentityRecord for Account {
        fn subject(&self) -> &str {
            &self.email
        }
    }

    #[test]
    fn test_identity_exposes_subject_and_record() {
        let identity = AuthenticatedIdentity::new(Account {
            email: "bob@example.com".to_string(),
            plan: "pro",
        });

        assert_eq!(identity.subject(), "bob@example.com");
        assert_eq!(identity.user::<Account>().unwrap().plan, "pro");
        assert!(identity.user::<u32>().is_none());
    }

    #[test]
    fn test_log_id() {
        let identity = AuthenticatedIdentity::new(Account {
            email: "bob@example.com".to_string(),
            plan: "free",
        });
        assert_eq!(identity.log_id(), "user:bob@example.com");
    }

    #[test]
    fn test_default_tokens_invalidated_at_is_none() {
        let account = Account {
            email: "x@y.z".to_string(),
            plan: "free",
        };
        assert!(account.tokens_invalidated_at().is_none());
    }

    #[test]
    fn test_debug_omits_record() {
        let identity = AuthenticatedIdentity::new(Account {
            email: "bob@example.com".to_string(),
            plan: "secret-plan",
        });
        let debug = format!("{identity:?}");
        assert!(debug.contains("bob@example.com"));
        assert!(!debug.contains("secret-plan"));
    }
}
