//! Main configuration types.
//!
//! This module provides the top-level [`KineroConfig`] struct and its builder.

use serde::{Deserialize, Serialize};

use crate::{
    AuthConfig, CorrelationConfig, ErrorConfig, TelemetryConfigSection, MAX_LEEWAY_SECS,
    MAX_TOKEN_TTL_SECS, MIN_SECRET_LEN,
};

/// Complete Kinero configuration.
///
/// This is the root configuration type that contains all configuration sections.
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use kinero_config::KineroConfig;
///
/// let config = KineroConfig::default();
/// assert_eq!(config.correlation.header_name, "x-correlation-id");
/// assert_eq!(config.auth.token_ttl_secs, 3600);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct KineroConfig {
    /// Token signing and identity lookup.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Correlation id propagation.
    #[serde(default)]
    pub correlation: CorrelationConfig,

    /// Error body rendering.
    #[serde(default)]
    pub errors: ErrorConfig,

    /// Telemetry configuration (logging).
    #[serde(default)]
    pub telemetry: TelemetryConfigSection,
}

impl KineroConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use kinero_config::{AuthConfig, KineroConfig};
    ///
    /// let config = KineroConfig::builder()
    ///     .auth(AuthConfig {
    ///         secret: "0123456789abcdef0123456789abcdef".to_string(),
    ///         ..Default::default()
    ///     })
    ///     .build();
    ///
    /// assert!(config.validate().is_ok());
    /// ```
    #[must_use]
    pub fn builder() -> KineroConfigBuilder {
        KineroConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The signing secret (or a retired secret) is shorter than 32 bytes
    /// - The token TTL or lookup timeout is zero
    /// - The token TTL exceeds [`MAX_TOKEN_TTL_SECS`] or the leeway exceeds
    ///   [`MAX_LEEWAY_SECS`]
    /// - The correlation header name is not a valid header name
    pub fn validate(&self) -> Result<(), crate::ConfigError> {
        if self.auth.secret.is_empty() {
            return Err(crate::ConfigError::invalid_value(
                "auth.secret",
                "a signing secret is required",
            ));
        }

        if self.auth.secret.len() < MIN_SECRET_LEN {
            return Err(crate::ConfigError::invalid_value(
                "auth.secret",
                format!("must be at least {MIN_SECRET_LEN} bytes"),
            ));
        }

        if let Some(index) = self
            .auth
            .retired_secrets
            .iter()
            .position(|s| s.len() < MIN_SECRET_LEN)
        {
            return Err(crate::ConfigError::invalid_value(
                format!("auth.retired_secrets[{index}]"),
                format!("must be at least {MIN_SECRET_LEN} bytes"),
            ));
        }

        if self.auth.token_ttl_secs == 0 {
            return Err(crate::ConfigError::invalid_value(
                "auth.token_ttl_secs",
                "must be greater than zero",
            ));
        }

        if self.auth.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(crate::ConfigError::invalid_value(
                "auth.token_ttl_secs",
                format!("must be at most {MAX_TOKEN_TTL_SECS}"),
            ));
        }

        if self.auth.leeway_secs > MAX_LEEWAY_SECS {
            return Err(crate::ConfigError::invalid_value(
                "auth.leeway_secs",
                format!("must be at most {MAX_LEEWAY_SECS}"),
            ));
        }

        if self.auth.lookup_timeout_ms == 0 {
            return Err(crate::ConfigError::invalid_value(
                "auth.lookup_timeout_ms",
                "must be greater than zero",
            ));
        }

        if !is_header_name(&self.correlation.header_name) {
            return Err(crate::ConfigError::invalid_value(
                "correlation.header_name",
                format!("invalid header name: {}", self.correlation.header_name),
            ));
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// - Pretty log formatting with ANSI colors
    /// - Debug log level
    /// - Internal error messages exposed
    ///
    /// # Example
    ///
    /// ```
    /// use kinero_config::KineroConfig;
    ///
    /// let config = KineroConfig::development();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = crate::LogFormat::Pretty;
        config.telemetry.logging.ansi_enabled = true;
        config.telemetry.logging.include_location = true;
        config.telemetry.environment = "development".to_string();

        config.errors.expose_internal_errors = true;

        config
    }

    /// Create a production configuration preset.
    ///
    /// - JSON log formatting
    /// - Info log level
    /// - Internal error messages hidden behind a generic message
    ///
    /// # Example
    ///
    /// ```
    /// use kinero_config::KineroConfig;
    ///
    /// let config = KineroConfig::production();
    /// assert_eq!(config.telemetry.logging.format, kinero_config::LogFormat::Json);
    /// assert!(!config.errors.expose_internal_errors);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = crate::LogFormat::Json;
        config.telemetry.logging.ansi_enabled = false;
        config.telemetry.environment = "production".to_string();

        config.errors.expose_internal_errors = false;

        config
    }
}

fn is_header_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}

/// Builder for [`KineroConfig`].
#[derive(Debug, Default)]
pub struct KineroConfigBuilder {
    auth: Option<AuthConfig>,
    correlation: Option<CorrelationConfig>,
    errors: Option<ErrorConfig>,
    telemetry: Option<TelemetryConfigSection>,
}

impl KineroConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the authentication configuration.
    #[must_use]
    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Set the correlation configuration.
    #[must_use]
    pub fn correlation(mut self, correlation: CorrelationConfig) -> Self {
        self.correlation = Some(correlation);
        self
    }

    /// Set the error configuration.
    #[must_use]
    pub fn errors(mut self, errors: ErrorConfig) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Set the telemetry configuration.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetryConfigSection) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Build the configuration.
    ///
    /// Any unset sections will use their default values.
    #[must_use]
    pub fn build(self) -> KineroConfig {
        KineroConfig {
            auth: self.auth.unwrap_or_default(),
            correlation: self.correlation.unwrap_or_default(),
            errors: self.errors.unwrap_or_default(),
            telemetry: self.telemetry.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<KineroConfig, crate::ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
