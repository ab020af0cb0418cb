//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, pool size > 0)
//! - Validate addresses and the database URL scheme
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::{AppConfig, ExporterKind};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// `host:port` as accepted by `TcpListener::bind`; the host is resolved at bind time.
fn is_host_port(addr: &str) -> bool {
    if addr.parse::<SocketAddr>().is_ok() {
        return true;
    }
    match addr.rsplit_once(':') {
        Some((host, port)) => !host.trim().is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !is_host_port(&config.listener.bind_address) {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a host:port address", config.listener.bind_address),
        ));
    }

    let url = config.database.url.as_str();
    if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
        errors.push(ValidationError::new(
            "database.url",
            "expected a postgres:// or postgresql:// connection string",
        ));
    }
    if config.database.max_connections == 0 {
        errors.push(ValidationError::new(
            "database.max_connections",
            "must be greater than 0",
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            "must be greater than 0",
        ));
    }

    let observability = &config.observability;
    if observability.service_name.trim().is_empty() {
        errors.push(ValidationError::new(
            "observability.service_name",
            "must not be empty",
        ));
    }
    if observability.exporter == ExporterKind::Otlp && observability.otlp_endpoint.trim().is_empty()
    {
        errors.push(ValidationError::new(
            "observability.otlp_endpoint",
            "required when exporter is otlp",
        ));
    }
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "not-an-addr".into();
        config.database.url = "mysql://localhost/db".into();
        config.database.max_connections = 0;
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "database.url",
                "database.max_connections",
                "timeouts.request_secs",
            ]
        );
    }

    #[test]
    fn test_bind_address_accepts_hostnames() {
        let mut config = AppConfig::default();
        for addr in ["localhost:8080", "127.0.0.1:0", "[::1]:8080", "api.internal:443"] {
            config.listener.bind_address = addr.into();
            assert!(validate_config(&config).is_ok(), "{addr}");
        }
        for addr in ["localhost", ":8080", "localhost:http", "localhost:70000"] {
            config.listener.bind_address = addr.into();
            assert!(validate_config(&config).is_err(), "{addr}");
        }
    }

    #[test]
    fn test_otlp_requires_endpoint() {
        let mut config = AppConfig::default();
        config.observability.exporter = ExporterKind::Otlp;
        config.observability.otlp_endpoint = " ".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "observability.otlp_endpoint");
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = AppConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
