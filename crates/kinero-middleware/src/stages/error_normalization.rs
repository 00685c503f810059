//! Error normalization middleware.
//!
//! Converts every failure raised further down the chain into the canonical
//! error body, exactly once per request.
//!
//! # Pipeline Position
//!
//! ```text
//! Correlation → [ErrorNormalization] → Authentication → Handler
//! ```
//!
//! # Body Format
//!
//! ```json
//! {
//!   "timestamp": "2026-01-01T12:00:00Z",
//!   "status": 404,
//!   "error": "Not Found",
//!   "message": "User not found with id: '42'",
//!   "path": "/api/users/42",
//!   "correlationId": "abc-123"
//! }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use kinero_middleware::stages::ErrorNormalizationMiddleware;
//!
//! // Hide 500 details from clients
//! let errors = ErrorNormalizationMiddleware::new()
//!     .expose_internal_errors(false);
//! ```

use crate::{
    context::MiddlewareContext,
    middleware::{BoxFuture, Middleware, Next},
    types::{MiddlewareResult, Request, Response, ResponseExt},
};
use chrono::{DateTime, Utc};
use kinero_config::ErrorConfig;
use kinero_core::{CanonicalError, ErrorKind, KineroError, PLACEHOLDER_MESSAGE};

/// Maps failures to canonical error bodies.
#[derive(Debug, Clone)]
pub struct ErrorNormalizer {
    expose_internal_errors: bool,
    internal_error_message: String,
}

impl Default for ErrorNormalizer {
    fn default() -> Self {
        Self {
            expose_internal_errors: true,
            internal_error_message: PLACEHOLDER_MESSAGE.to_string(),
        }
    }
}

impl ErrorNormalizer {
    /// Builds the canonical body for `error` as of `timestamp`.
    #[must_use]
    pub fn normalize(
        &self,
        error: &KineroError,
        path: &str,
        correlation_id: &str,
        timestamp: DateTime<Utc>,
    ) -> CanonicalError {
        let kind = error.kind();
        if kind == ErrorKind::InternalServerError && !self.expose_internal_errors {
            return CanonicalError::new(
                kind,
                self.internal_error_message.as_str(),
                path,
                correlation_id,
                timestamp,
            );
        }

        error.to_canonical(path, correlation_id, timestamp)
    }

    /// Logs `error` and builds its JSON response.
    ///
    /// Server errors are logged at `error` with their source chain, client
    /// errors at `warn`.
    pub fn respond(&self, error: &KineroError, path: &str, correlation_id: &str) -> Response {
        let body = self.normalize(error, path, correlation_id, Utc::now());

        if body.error == ErrorKind::InternalServerError {
            tracing::error!(
                correlation_id = %correlation_id,
                error.kind = body.error.label(),
                http.path = %path,
                error = ?error,
                "Request failed"
            );
        } else {
            tracing::warn!(
                correlation_id = %correlation_id,
                error.kind = body.error.label(),
                http.path = %path,
                message = %body.message,
                "Request rejected"
            );
        }

        Response::canonical_error(&body)
    }
}

/// Error normalization middleware that ensures consistent error responses.
#[derive(Debug, Clone, Default)]
pub struct ErrorNormalizationMiddleware {
    normalizer: ErrorNormalizer,
}

impl ErrorNormalizationMiddleware {
    /// Creates a new error normalization middleware with default settings.
    ///
    /// Internal error messages are exposed by default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the middleware from the errors config section.
    #[must_use]
    pub fn from_config(config: &ErrorConfig) -> Self {
        Self::new()
            .expose_internal_errors(config.expose_internal_errors)
            .internal_error_message(&config.internal_error_message)
    }

    /// Sets whether 500 bodies carry the failure's own message.
    #[must_use]
    pub fn expose_internal_errors(mut self, expose: bool) -> Self {
        self.normalizer.expose_internal_errors = expose;
        self
    }

    /// Sets the message used for 500 bodies when internals are hidden.
    #[must_use]
    pub fn internal_error_message(mut self, message: &str) -> Self {
        self.normalizer.internal_error_message = message.to_string();
        self
    }

    /// Returns the underlying normalizer.
    #[must_use]
    pub const fn normalizer(&self) -> &ErrorNormalizer {
        &self.normalizer
    }
}

impl Middleware for ErrorNormalizationMiddleware {
    fn name(&self) -> &'static str {
        "error_normalization"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move {
            let path = request.uri().path().to_string();

            match next.run(ctx, request).await {
                Ok(response) => Ok(response),
                Err(error) => Ok(self
                    .normalizer
                    .respond(&error, &path, ctx.correlation_id_str())),
            }
        })
    }
}
