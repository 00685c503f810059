//! Structured logging and metrics for Kinero.
//!
//! - **Logging**: JSON (production) or pretty (development) output through
//!   `tracing-subscriber`, filtered with `EnvFilter` directives; every line
//!   of a request can be joined on `correlation_id`
//! - **Metrics**: counters recorded through the `metrics` facade and
//!   rendered by a Prometheus recorder
//!
//! # Example
//!
//! ```rust,ignore
//! use kinero_config::KineroConfig;
//! use kinero_telemetry::{init_logging, LogConfig};
//!
//! let config = KineroConfig::production();
//! init_logging(&LogConfig::from(&config.telemetry))?;
//!
//! tracing::info!(correlation_id = "abc-123", "ready");
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};
pub use metrics::{init_metrics, record_user_registration, render_metrics, USER_REGISTRATION_COUNT};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
