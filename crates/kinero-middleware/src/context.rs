//! Middleware context types.
//!
//! The [`MiddlewareContext`] carries per-request state through the pipeline.
//! It is separate from [`RequestContext`] so stages can enrich it before the
//! handler reads an immutable snapshot.

use crate::cancel::CancellationSignal;
use kinero_core::{AuthenticatedIdentity, CorrelationId, KineroError, RequestContext};
use std::time::{Duration, Instant};

/// Message returned when a handler requires an identity and none was set.
pub const AUTHENTICATION_REQUIRED: &str = "Authentication required";

/// Context that flows through the middleware pipeline.
///
/// Exactly one context exists per request. The correlation stage fills in
/// the correlation id and the authentication stage fills in the identity;
/// nothing else writes to them.
///
/// # Example
///
/// ```
/// use kinero_middleware::MiddlewareContext;
///
/// let ctx = MiddlewareContext::new();
/// assert!(ctx.identity().is_none());
/// assert!(!ctx.is_cancelled());
/// ```
#[derive(Debug)]
pub struct MiddlewareContext {
    correlation_id: Option<CorrelationId>,
    identity: Option<AuthenticatedIdentity>,
    path: String,
    cancellation: CancellationSignal,
    started_at: Instant,
}

impl MiddlewareContext {
    /// Creates a fresh context with its own cancellation signal.
    #[must_use]
    pub fn new() -> Self {
        Self::with_cancellation(CancellationSignal::new())
    }

    /// Creates a context observing an existing cancellation signal.
    #[must_use]
    pub fn with_cancellation(cancellation: CancellationSignal) -> Self {
        Self {
            correlation_id: None,
            identity: None,
            path: String::new(),
            cancellation,
            started_at: Instant::now(),
        }
    }

    /// Returns the correlation id, once the correlation stage has run.
    #[must_use]
    pub const fn correlation_id(&self) -> Option<&CorrelationId> {
        self.correlation_id.as_ref()
    }

    /// Returns the correlation id as a log field value, or `""` if unset.
    #[must_use]
    pub fn correlation_id_str(&self) -> &str {
        self.correlation_id.as_ref().map_or("", CorrelationId::as_str)
    }

    pub(crate) fn set_correlation_id(&mut self, id: CorrelationId) {
        self.correlation_id = Some(id);
    }

    /// Returns the verified identity, if the request authenticated.
    #[must_use]
    pub const fn identity(&self) -> Option<&AuthenticatedIdentity> {
        self.identity.as_ref()
    }

    pub(crate) fn set_identity(&mut self, identity: AuthenticatedIdentity) {
        self.identity = Some(identity);
    }

    /// Returns the identity or the `Unauthorized` failure for protected routes.
    pub fn require_identity(&self) -> Result<&AuthenticatedIdentity, KineroError> {
        self.identity
            .as_ref()
            .ok_or_else(|| KineroError::unauthorized(AUTHENTICATION_REQUIRED))
    }

    /// Returns the request path recorded by the pipeline.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    /// Returns the request's cancellation signal.
    #[must_use]
    pub const fn cancellation(&self) -> &CancellationSignal {
        &self.cancellation
    }

    /// Returns `true` if the request has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Returns the time since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Builds the handler-facing snapshot of this context.
    ///
    /// Assigns a fresh correlation id if the correlation stage did not run.
    pub fn to_request_context(&mut self) -> RequestContext {
        let correlation_id = self
            .correlation_id
            .get_or_insert_with(CorrelationId::generate)
            .clone();

        let context = RequestContext::new(correlation_id, self.path.clone());
        match &self.identity {
            Some(identity) => context.with_identity(identity.clone()),
            None => context,
        }
    }
}

impl Default for MiddlewareContext {
    fn default() -> Self {
        Self::new()
    }
}
