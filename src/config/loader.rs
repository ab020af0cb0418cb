//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `listener.bind_address`.
pub const ENV_BIND_ADDRESS: &str = "PRODUCT_API_BIND_ADDRESS";
/// Environment variable overriding `database.url`.
pub const ENV_DATABASE_URL: &str = "PRODUCT_API_DATABASE_URL";
/// Environment variable overriding `timeouts.request_secs`.
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "PRODUCT_API_REQUEST_TIMEOUT_SECS";
/// Standard OpenTelemetry endpoint variable.
pub const ENV_OTLP_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";
/// Standard OpenTelemetry service name variable.
pub const ENV_SERVICE_NAME: &str = "OTEL_SERVICE_NAME";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value '{value}' for {var}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl AppConfig {
    /// Apply overrides from an environment lookup.
    ///
    /// The lookup is injected so tests do not have to mutate the process
    /// environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(ENV_BIND_ADDRESS) {
            self.listener.bind_address = addr;
        }
        if let Some(url) = lookup(ENV_DATABASE_URL) {
            self.database.url = url;
        }
        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
            self.timeouts.request_secs = raw.parse().map_err(|_| ConfigError::Env {
                var: ENV_REQUEST_TIMEOUT_SECS,
                value: raw.clone(),
            })?;
        }
        if let Some(endpoint) = lookup(ENV_OTLP_ENDPOINT) {
            self.observability.otlp_endpoint = endpoint;
        }
        if let Some(name) = lookup(ENV_SERVICE_NAME) {
            self.observability.service_name = name;
        }
        Ok(())
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    finish(config)
}

/// Load from `path` when given, otherwise start from defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => finish(AppConfig::default()),
    }
}

fn finish(mut config: AppConfig) -> Result<AppConfig, ConfigError> {
    config.apply_env_overrides(|key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
