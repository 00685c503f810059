//! File and `.env` loading tests.

use kinero_config::{ConfigError, ConfigLoader, LogFormat};
use std::io::Write;
use tempfile::{Builder, NamedTempFile};

fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn loads_toml_file() {
    let file = temp_file(
        ".toml",
        r#"
            [auth]
            secret = "0123456789abcdef0123456789abcdef"
            retired_secrets = ["fedcba9876543210fedcba9876543210"]
            token_ttl_secs = 1800

            [telemetry.logging]
            format = "pretty"
        "#,
    );

    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();

    assert_eq!(config.auth.token_ttl_secs, 1800);
    assert_eq!(config.auth.retired_secrets.len(), 1);
    assert_eq!(config.telemetry.logging.format, LogFormat::Pretty);
}

#[test]
fn loads_json_file() {
    let file = temp_file(
        ".json",
        r#"{"auth": {"secret": "0123456789abcdef0123456789abcdef", "lookup_timeout_ms": 250}}"#,
    );

    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
    assert_eq!(config.auth.lookup_timeout_ms, 250);
}

#[test]
fn rejects_unknown_extension() {
    let file = temp_file(".yaml", "auth: {}");
    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
}

#[test]
fn rejects_unknown_fields_in_file() {
    let file = temp_file(
        ".toml",
        r#"
            [auth]
            secret = "0123456789abcdef0123456789abcdef"
            issuer = "kinero"
        "#,
    );

    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::TomlError(_))));
}

#[test]
fn short_secret_in_file_fails_validation() {
    let file = temp_file(".toml", "[auth]\nsecret = \"short\"\n");

    let result = ConfigLoader::new().with_file(file.path()).unwrap().load();
    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
}

#[test]
fn dotenv_file_feeds_env_overrides() {
    let file = temp_file(
        ".env",
        "KINERO_DOTENV_TEST__AUTH__SECRET=dotenv-secret-dotenv-secret-dotenv\n\
         KINERO_DOTENV_TEST__AUTH__LEEWAY_SECS=7\n",
    );

    let config = ConfigLoader::new()
        .with_dotenv_path(file.path())
        .unwrap()
        .with_env_prefix("KINERO_DOTENV_TEST")
        .load()
        .unwrap();

    assert_eq!(config.auth.secret, "dotenv-secret-dotenv-secret-dotenv");
    assert_eq!(config.auth.leeway_secs, 7);
}

#[test]
fn missing_dotenv_path_is_an_error() {
    let result = ConfigLoader::new().with_dotenv_path("/nonexistent/.env");
    assert!(matches!(result, Err(ConfigError::Dotenv(_))));
}
