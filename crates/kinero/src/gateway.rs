//! Configured request pipeline.

use http::header::InvalidHeaderName;
use kinero_config::{ConfigError, KineroConfig};
use kinero_core::IdentityStore;
use kinero_middleware::{
    AuthenticationMiddleware, BoxFuture, CancellationSignal, CorrelationMiddleware,
    ErrorNormalizationMiddleware, MiddlewareContext, MiddlewareResult, Pipeline, Request,
    Response,
};
use kinero_telemetry::{init_logging, init_metrics, LogConfig, TelemetryError};
use kinero_token::TokenCodec;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while building a [`Gateway`].
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The correlation header name is not a valid HTTP header name.
    #[error("invalid correlation header: {0}")]
    CorrelationHeader(#[from] InvalidHeaderName),

    /// Logging could not be initialized.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

/// The standard pipeline built from a [`KineroConfig`].
///
/// # Example
///
/// ```ignore
/// use kinero::prelude::*;
///
/// let gateway = Gateway::from_config(KineroConfig::development(), store)?;
/// let response = gateway
///     .handle(request, |ctx, _req| {
///         let caller = ctx.require_identity().map(|i| i.subject().to_string());
///         Box::pin(async move {
///             Ok(Response::json(StatusCode::OK, &serde_json::json!({ "caller": caller? })))
///         })
///     })
///     .await;
/// ```
pub struct Gateway {
    pipeline: Pipeline,
    codec: Arc<TokenCodec>,
    config: KineroConfig,
}

impl Gateway {
    /// Validates `config` and builds the pipeline over `store`.
    pub fn from_config<S: IdentityStore>(
        config: KineroConfig,
        store: S,
    ) -> Result<Self, GatewayError> {
        config.validate()?;

        let codec = Arc::new(TokenCodec::from_config(&config.auth));
        let pipeline = Pipeline::standard(
            CorrelationMiddleware::from_config(&config.correlation)?,
            ErrorNormalizationMiddleware::from_config(&config.errors),
            AuthenticationMiddleware::from_config(codec.clone(), store, &config.auth),
        );

        tracing::debug!(stages = ?pipeline.stage_names(), "Gateway pipeline built");

        Ok(Self {
            pipeline,
            codec,
            config,
        })
    }

    /// Installs the global log subscriber described by the telemetry section.
    pub fn init_telemetry(&self) -> Result<(), GatewayError> {
        init_logging(&LogConfig::from(&self.config.telemetry))?;
        Ok(())
    }

    /// Installs the global Prometheus recorder.
    ///
    /// Render the returned handle to expose the metrics.
    pub fn init_metrics(&self) -> Result<PrometheusHandle, GatewayError> {
        Ok(init_metrics()?)
    }

    /// Runs `request` through the pipeline and `handler`.
    pub async fn handle<H>(&self, request: Request, handler: H) -> Response
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, MiddlewareResult>
            + Send
            + 'static,
    {
        self.pipeline
            .process(MiddlewareContext::new(), request, handler)
            .await
    }

    /// Like [`handle`](Self::handle), observing a caller-held cancellation signal.
    pub async fn handle_cancellable<H>(
        &self,
        request: Request,
        cancellation: CancellationSignal,
        handler: H,
    ) -> Response
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, MiddlewareResult>
            + Send
            + 'static,
    {
        self.pipeline
            .process(MiddlewareContext::with_cancellation(cancellation), request, handler)
            .await
    }

    /// Returns the codec used to verify (and issue) tokens.
    #[must_use]
    pub fn codec(&self) -> Arc<TokenCodec> {
        self.codec.clone()
    }

    /// Returns the configuration the gateway was built from.
    #[must_use]
    pub const fn config(&self) -> &KineroConfig {
        &self.config
    }

    /// Returns the pipeline.
    #[must_use]
    pub const fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("pipeline", &self.pipeline)
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}
