//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Minimum accepted length of a signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Longest accepted token lifetime, in seconds (one year).
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Largest accepted expiry leeway, in seconds.
pub const MAX_LEEWAY_SECS: u64 = 60 * 60;

/// Authentication configuration section.
///
/// Controls token signing, token lifetime, and identity lookups.
///
/// # Example
///
/// ```
/// use kinero_config::AuthConfig;
///
/// let config = AuthConfig {
///     secret: "0123456789abcdef0123456789abcdef".to_string(),
///     retired_secrets: Vec::new(),
///     token_ttl_secs: 3600,
///     leeway_secs: 0,
///     lookup_timeout_ms: 2000,
/// };
/// assert!(!format!("{config:?}").contains("0123456789"));
/// ```
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Current signing secret. New tokens are signed with it.
    #[serde(default)]
    pub secret: String,

    /// Previous secrets still accepted for verification, in order.
    #[serde(default)]
    pub retired_secrets: Vec<String>,

    /// Lifetime of issued tokens in seconds.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,

    /// Clock-skew allowance for expiry checks in seconds.
    #[serde(default)]
    pub leeway_secs: u64,

    /// Upper bound on a single identity lookup in milliseconds.
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_ms: u64,
}

impl AuthConfig {
    /// Returns the token lifetime.
    #[must_use]
    pub const fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    /// Returns the expiry leeway.
    #[must_use]
    pub const fn leeway(&self) -> Duration {
        Duration::from_secs(self.leeway_secs)
    }

    /// Returns the identity lookup timeout.
    #[must_use]
    pub const fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            retired_secrets: Vec::new(),
            token_ttl_secs: default_token_ttl(),
            leeway_secs: 0,
            lookup_timeout_ms: default_lookup_timeout(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"[REDACTED]")
            .field("retired_secrets", &self.retired_secrets.len())
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("lookup_timeout_ms", &self.lookup_timeout_ms)
            .finish()
    }
}

fn default_token_ttl() -> u64 {
    3600
}

fn default_lookup_timeout() -> u64 {
    2000
}

/// Correlation id configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CorrelationConfig {
    /// Header read from requests and written to responses.
    #[serde(default = "default_correlation_header")]
    pub header_name: String,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            header_name: default_correlation_header(),
        }
    }
}

fn default_correlation_header() -> String {
    "x-correlation-id".to_string()
}

/// Error body configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ErrorConfig {
    /// Put the failure's own message in 500 bodies.
    ///
    /// When `false`, 500 bodies carry `internal_error_message` instead.
    #[serde(default = "default_true")]
    pub expose_internal_errors: bool,

    /// Message used for 500 bodies when internals are hidden.
    #[serde(default = "default_internal_error_message")]
    pub internal_error_message: String,
}

impl Default for ErrorConfig {
    fn default() -> Self {
        Self {
            expose_internal_errors: true,
            internal_error_message: default_internal_error_message(),
        }
    }
}

fn default_internal_error_message() -> String {
    "An unexpected error occurred".to_string()
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telemetry configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfigSection {
    /// Service name attached to log output.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Service version.
    #[serde(default)]
    pub service_version: Option<String>,

    /// Deployment environment (e.g., "development", "staging", "production").
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TelemetryConfigSection {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            service_version: None,
            environment: default_environment(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_service_name() -> String {
    "kinero-backend".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_true() -> bool {
    true
}
