//! Ordered middleware pipeline.
//!
//! Every request flows through the same stages in the same order:
//!
//! 1. **Correlation** - assign the correlation id, echo it on the response
//! 2. **Error Normalization** - turn any failure into the canonical body
//! 3. **Authentication** - verify the bearer token and attach the identity
//!
//! Correlation wraps error normalization so that error responses carry the
//! correlation header too. Authentication sits inside error normalization so
//! its rejections come out as canonical 401 bodies.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::stages::authentication::AuthenticationMiddleware;
use crate::stages::correlation::CorrelationMiddleware;
use crate::stages::error_normalization::{ErrorNormalizationMiddleware, ErrorNormalizer};
use crate::types::{MiddlewareResult, Request, Response};
use http::HeaderName;
use kinero_core::{IdentityStore, CORRELATION_ID_HEADER};
use std::sync::Arc;

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// The middleware pipeline.
///
/// Immutable once built and shared by all requests.
///
/// # Example
///
/// ```ignore
/// use kinero_middleware::{Pipeline, MiddlewareContext};
///
/// let pipeline = Pipeline::standard(correlation, errors, authentication);
/// let response = pipeline
///     .process(MiddlewareContext::new(), request, |ctx, _req| {
///         let identity = ctx.require_identity().cloned();
///         Box::pin(async move { /* ... */ })
///     })
///     .await;
/// ```
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
    fallback: ErrorNormalizer,
    correlation_header: HeaderName,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Builds the standard three-stage pipeline.
    pub fn standard<S: IdentityStore>(
        correlation: CorrelationMiddleware,
        errors: ErrorNormalizationMiddleware,
        authentication: AuthenticationMiddleware<S>,
    ) -> Self {
        let correlation_header = correlation.header_name().clone();
        let fallback = errors.normalizer().clone();

        let mut pipeline = Self::builder()
            .add_stage(correlation)
            .add_stage(errors)
            .add_stage(authentication)
            .build();
        pipeline.fallback = fallback;
        pipeline.correlation_header = correlation_header;
        pipeline
    }

    /// Processes a request through every stage, then the handler.
    ///
    /// Always produces a response. A failure that escapes the chain (only
    /// possible in a pipeline without an error normalization stage) is
    /// normalized here. Its body carries the correlation id from the context,
    /// or `""` when no correlation stage ran, and the header is only added
    /// when an id exists.
    pub async fn process<H>(
        &self,
        mut ctx: MiddlewareContext,
        request: Request,
        handler: H,
    ) -> Response
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, MiddlewareResult>
            + Send
            + 'static,
    {
        ctx.set_path(request.uri().path());

        let next = self.build_chain(handler);
        match next.run(&mut ctx, request).await {
            Ok(response) => response,
            Err(error) => {
                let mut response =
                    self.fallback
                        .respond(&error, ctx.path(), ctx.correlation_id_str());
                if let Some(correlation_id) = ctx.correlation_id() {
                    response
                        .headers_mut()
                        .insert(self.correlation_header.clone(), correlation_id.header_value());
                }
                response
            }
        }
    }

    /// Builds the middleware chain for a request.
    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, MiddlewareResult>
            + Send
            + 'a,
    {
        let mut next = Next::handler(handler);

        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }

        next
    }

    /// Returns the names of all middleware stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|mw| mw.name()).collect()
    }

    /// Returns the number of middleware stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish_non_exhaustive()
    }
}

/// Builder for constructing a [`Pipeline`].
///
/// Stages run in the order they are added.
pub struct PipelineBuilder {
    stages: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    /// Creates a new empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Appends a stage.
    pub fn add_stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
            fallback: ErrorNormalizer::default(),
            correlation_header: HeaderName::from_static(CORRELATION_ID_HEADER),
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The standard stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Stage {
    /// Stage 1: Correlation id assignment and echo
    Correlation = 1,
    /// Stage 2: Error normalization
    ErrorNormalization = 2,
    /// Stage 3: Bearer token authentication
    Authentication = 3,
}

impl Stage {
    /// Returns the stage name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Correlation => "correlation",
            Self::ErrorNormalization => "error_normalization",
            Self::Authentication => "authentication",
        }
    }

    /// Returns all stages in order.
    #[must_use]
    pub const fn all() -> [Stage; 3] {
        [
            Self::Correlation,
            Self::ErrorNormalization,
            Self::Authentication,
        ]
    }
}
