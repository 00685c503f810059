//! Correlation id middleware.
//!
//! Assigns every request a correlation id and echoes it on the response.
//!
//! ## Sources
//!
//! 1. **Incoming header**: kept verbatim when it is non-blank visible ASCII
//! 2. **Generated UUID v7**: otherwise
//!
//! Everything logged while the rest of the chain runs is recorded inside a
//! `request` span that carries the id.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{MiddlewareResult, Request};
use http::header::InvalidHeaderName;
use http::HeaderName;
use kinero_config::CorrelationConfig;
use kinero_core::{CorrelationId, CORRELATION_ID_HEADER};
use kinero_telemetry::{log_request_complete, log_request_start};
use tracing::Instrument;

/// Middleware that assigns and propagates correlation ids.
///
/// # Example
///
/// ```
/// use kinero_middleware::stages::CorrelationMiddleware;
///
/// let middleware = CorrelationMiddleware::new();
/// assert_eq!(middleware.header_name().as_str(), "x-correlation-id");
/// ```
#[derive(Debug, Clone)]
pub struct CorrelationMiddleware {
    header_name: HeaderName,
}

impl CorrelationMiddleware {
    /// Creates the middleware using the `x-correlation-id` header.
    #[must_use]
    pub fn new() -> Self {
        Self {
            header_name: HeaderName::from_static(CORRELATION_ID_HEADER),
        }
    }

    /// Creates the middleware using a custom header.
    pub fn with_header_name(name: &str) -> Result<Self, InvalidHeaderName> {
        Ok(Self {
            header_name: HeaderName::try_from(name)?,
        })
    }

    /// Creates the middleware from the correlation config section.
    pub fn from_config(config: &CorrelationConfig) -> Result<Self, InvalidHeaderName> {
        Self::with_header_name(&config.header_name)
    }

    /// Returns the header read from requests and written to responses.
    #[must_use]
    pub const fn header_name(&self) -> &HeaderName {
        &self.header_name
    }

    fn incoming<'r>(&self, request: &'r Request) -> Option<&'r str> {
        request
            .headers()
            .get(&self.header_name)
            .and_then(|value| value.to_str().ok())
    }
}

impl Default for CorrelationMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for CorrelationMiddleware {
    fn name(&self) -> &'static str {
        "correlation"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move {
            let correlation_id = CorrelationId::assign(self.incoming(&request));
            ctx.set_correlation_id(correlation_id.clone());

            let span = tracing::info_span!("request", correlation_id = %correlation_id);
            span.in_scope(|| {
                log_request_start!(correlation_id, request.method(), request.uri().path());
            });

            let result = next.run(ctx, request).instrument(span.clone()).await;

            let status = match &result {
                Ok(response) => response.status().as_u16(),
                Err(error) => error.status_code().as_u16(),
            };
            let duration_ms = u64::try_from(ctx.elapsed().as_millis()).unwrap_or(u64::MAX);
            span.in_scope(|| {
                log_request_complete!(correlation_id, status, duration_ms);
            });

            result.map(|mut response| {
                response
                    .headers_mut()
                    .insert(self.header_name.clone(), correlation_id.header_value());
                response
            })
        })
    }
}
