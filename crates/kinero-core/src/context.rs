//! Request context types.
//!
//! [`CorrelationId`] tags one request end to end: it is echoed in the
//! response header, attached to every log line, and copied into any error
//! body. [`RequestContext`] is the immutable snapshot handlers receive once
//! the pipeline has run.

use crate::identity::AuthenticatedIdentity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The default header carrying the correlation id.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// An opaque per-request correlation token.
///
/// Incoming values are adopted unchanged when usable. Generated values are
/// UUID v7 strings, which are time-ordered and sort naturally in logs.
///
/// # Example
///
/// ```
/// use kinero_core::CorrelationId;
///
/// let kept = CorrelationId::assign(Some("abc-123"));
/// assert_eq!(kept.as_str(), "abc-123");
///
/// let fresh = CorrelationId::assign(None);
/// assert!(!fresh.as_str().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Generates a fresh correlation id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Returns the incoming id unchanged if usable, otherwise a fresh one.
    ///
    /// An incoming value is usable when it is non-empty and is itself a
    /// valid header value, so it can be echoed back byte for byte.
    #[must_use]
    pub fn assign(incoming: Option<&str>) -> Self {
        match incoming {
            Some(value) if Self::is_usable(value) => Self(value.to_string()),
            _ => Self::generate(),
        }
    }

    /// Returns `true` if `value` can be adopted as a correlation id.
    #[must_use]
    pub fn is_usable(value: &str) -> bool {
        !value.is_empty() && http::HeaderValue::from_str(value).is_ok()
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the id as a header value.
    #[must_use]
    pub fn header_value(&self) -> http::HeaderValue {
        // Adopted ids are checked by `is_usable`; generated ids are UUID text.
        http::HeaderValue::from_str(&self.0).expect("valid header value")
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CorrelationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Read-only per-request state handed to handlers.
///
/// Built from the mutable pipeline context after authentication. Nothing
/// writes to it afterwards, so it can be cloned freely into spawned work.
///
/// # Example
///
/// ```
/// use kinero_core::{CorrelationId, RequestContext};
///
/// let ctx = RequestContext::new(CorrelationId::assign(Some("cid-1")), "/api/users/me");
/// assert_eq!(ctx.correlation_id().as_str(), "cid-1");
/// assert!(ctx.identity().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    correlation_id: CorrelationId,
    path: String,
    identity: Option<AuthenticatedIdentity>,
}

impl RequestContext {
    /// Creates an unauthenticated context.
    #[must_use]
    pub fn new(correlation_id: CorrelationId, path: impl Into<String>) -> Self {
        Self {
            correlation_id,
            path: path.into(),
            identity: None,
        }
    }

    /// Returns a new context carrying the given identity.
    #[must_use]
    pub fn with_identity(mut self, identity: AuthenticatedIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Returns the correlation id.
    #[must_use]
    pub const fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    /// Returns the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the authenticated identity, if any.
    #[must_use]
    pub const fn identity(&self) -> Option<&AuthenticatedIdentity> {
        self.identity.as_ref()
    }

    /// Returns the authenticated user record, downcast to `T`.
    #[must_use]
    pub fn user<T: 'static>(&self) -> Option<&T> {
        self.identity.as_ref().and_then(AuthenticatedIdentity::user)
    }
}
