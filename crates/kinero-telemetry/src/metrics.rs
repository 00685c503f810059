//! Application metrics.
//!
//! | Metric                    | Type    | Description                    |
//! |---------------------------|---------|--------------------------------|
//! | `user.registration.count` | Counter | Accounts successfully created  |
//!
//! Recording goes through the `metrics` facade, so it is a no-op until a
//! recorder is installed. [`init_metrics`] installs a Prometheus recorder;
//! dots in metric names render as underscores (`user_registration_count`).
//!
//! # Example
//!
//! ```rust,ignore
//! use kinero_telemetry::metrics::{init_metrics, record_user_registration, render_metrics};
//!
//! init_metrics()?;
//! record_user_registration();
//! println!("{}", render_metrics().unwrap_or_default());
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Counter incremented once per registered account.
pub const USER_REGISTRATION_COUNT: &str = "user.registration.count";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the global Prometheus recorder and describes the standard metrics.
///
/// # Errors
///
/// Returns `TelemetryError::MetricsInit` if a global recorder is already installed.
pub fn init_metrics() -> TelemetryResult<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    describe_metrics();
    let _ = METRICS_HANDLE.set(handle.clone());
    Ok(handle)
}

/// Registers descriptions for the standard metrics with the current recorder.
pub fn describe_metrics() {
    describe_counter!(
        USER_REGISTRATION_COUNT,
        "Number of user accounts successfully registered"
    );
}

/// Renders the global recorder in Prometheus text format.
///
/// Returns `None` until [`init_metrics`] has succeeded.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

/// Records one successful account registration.
pub fn record_user_registration() {
    counter!(USER_REGISTRATION_COUNT).increment(1);
}
