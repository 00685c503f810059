//! Typed configuration for Kinero.
//!
//! This crate provides a strongly-typed configuration system with support for:
//! - TOML and JSON configuration files
//! - `.env` files and environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → `.env` → env)
//!
//! # Overview
//!
//! [`KineroConfig`] holds every section:
//!
//! - [`AuthConfig`] - Signing secrets, token lifetime, identity lookup timeout
//! - [`CorrelationConfig`] - Correlation id header
//! - [`ErrorConfig`] - How 500 bodies are worded
//! - [`TelemetryConfigSection`] - Logging
//!
//! # Example
//!
//! ```no_run
//! use kinero_config::ConfigLoader;
//!
//! # fn main() -> Result<(), kinero_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_production()
//!     .with_optional_file("kinero.toml")?
//!     .with_env_prefix("KINERO")
//!     .load()?;
//!
//! println!("Tokens live for {}s", config.auth.token_ttl_secs);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [auth]
//! secret = "change-me-to-at-least-32-bytes-of-entropy"
//! retired_secrets = []
//! token_ttl_secs = 3600
//! leeway_secs = 0
//! lookup_timeout_ms = 2000
//!
//! [correlation]
//! header_name = "x-correlation-id"
//!
//! [errors]
//! expose_internal_errors = false
//! internal_error_message = "An unexpected error occurred"
//!
//! [telemetry]
//! service_name = "kinero-backend"
//! environment = "production"
//!
//! [telemetry.logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with `PREFIX__SECTION__KEY` variables:
//!
//! - `KINERO__AUTH__SECRET=...`
//! - `KINERO__AUTH__RETIRED_SECRETS=old-one,older-one`
//! - `KINERO__TELEMETRY__LOGGING__LEVEL=debug`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = KineroConfig::default();
        assert_eq!(config.auth.lookup_timeout_ms, 2000);
        assert_eq!(config.correlation.header_name, "x-correlation-id");
    }

    #[test]
    fn test_config_builder() {
        let config = KineroConfig::builder()
            .auth(AuthConfig {
                token_ttl_secs: 60,
                ..Default::default()
            })
            .build();

        assert_eq!(config.auth.token_ttl_secs, 60);
    }
}
