//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, retry bounds, status codes)
//! - Check that addresses and the upstream base URL parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// One semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_socket_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_socket_addr(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    let upstream = &config.upstream;
    match Url::parse(&upstream.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "upstream.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("upstream.base_url", e.to_string())),
    }
    if upstream.timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.timeout_secs", "must be greater than 0"));
    }
    if upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "upstream.connect_timeout_secs",
            "must be greater than 0",
        ));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    let retry = &upstream.retry;
    if retry.max_attempts == 0 {
        errors.push(ValidationError::new("upstream.retry.max_attempts", "must be at least 1"));
    }
    if retry.base_delay_ms > retry.max_delay_ms {
        errors.push(ValidationError::new(
            "upstream.retry.base_delay_ms",
            "must not exceed max_delay_ms",
        ));
    }
    for code in &retry.status_forcelist {
        if !(100..=599).contains(code) {
            errors.push(ValidationError::new(
                "upstream.retry.status_forcelist",
                format!("{code} is not an HTTP status code"),
            ));
        }
    }

    if config.digipos.username.is_empty() {
        errors.push(ValidationError::new("digipos.username", "must not be empty"));
    }
    if config.digipos.password.is_empty() {
        errors.push(ValidationError::new("digipos.password", "must not be empty"));
    }
    for (command, endpoint) in config.digipos.endpoints.iter() {
        let field = format!("digipos.endpoints.{command}");
        if endpoint.is_empty() {
            errors.push(ValidationError::new(field, "must not be empty"));
        } else if endpoint.starts_with('/') || endpoint.contains("://") {
            errors.push(ValidationError::new(field, "must be relative to upstream.base_url"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_socket_addr(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(field, format!("'{value}' is not a socket address")));
    }
}
