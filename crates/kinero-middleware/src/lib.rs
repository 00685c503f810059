//! # Kinero Middleware
//!
//! The request pipeline of the Kinero gateway.
//!
//! Every request passes through the same stages in the same order:
//!
//! ```text
//! Request → Correlation → ErrorNormalization → Authentication → Handler
//!                                                                  ↓
//! Response ← Correlation ← ErrorNormalization ←────────────────────┘
//! ```
//!
//! | Stage | Middleware          | Purpose                                    |
//! |-------|---------------------|--------------------------------------------|
//! | 1     | Correlation         | Keep or generate the correlation id        |
//! | 2     | Error Normalization | Convert failures to the canonical body     |
//! | 3     | Authentication      | Verify the bearer token, attach identity   |
//!
//! Stages and handlers return [`MiddlewareResult`]. Failures travel up as
//! `Err` until error normalization turns them into a JSON response, and the
//! correlation stage stamps the response header on the way out.
//!
//! ## Example
//!
//! ```
//! use kinero_middleware::pipeline::Stage;
//!
//! let stages = Stage::all();
//! assert_eq!(stages.len(), 3);
//! assert_eq!(stages[0].name(), "correlation");
//! assert_eq!(stages[2].name(), "authentication");
//! ```

#![doc(html_root_url = "https://docs.rs/kinero-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cancel;
pub mod context;
pub mod middleware;
pub mod pipeline;
pub mod stages;
pub mod types;

pub use cancel::CancellationSignal;
pub use context::{MiddlewareContext, AUTHENTICATION_REQUIRED};
pub use middleware::{BoxFuture, Handler, Middleware, Next};
pub use pipeline::{Pipeline, PipelineBuilder, Stage};
pub use stages::{
    AuthenticationMiddleware, CorrelationMiddleware, ErrorNormalizationMiddleware,
    ErrorNormalizer,
};
pub use types::{MiddlewareResult, Request, Response, ResponseExt};
