//! Gateway error types.
//!
//! Only the outer layers fail: request parsing, transport, credential
//! checks and client construction. The response pipeline itself is total
//! and reports failures as data inside the envelope.

use thiserror::Error;

/// Errors surfaced by the gateway outside the response pipeline.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Upstream could not be reached after the retry budget was spent.
    #[error("upstream request to '{endpoint}' failed after {attempts} attempt(s): {source}")]
    Transport {
        endpoint: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    /// Endpoint path could not be joined onto the upstream base URL.
    #[error("invalid upstream endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// Inbound query could not be read.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Static credential comparison failed.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// HTTP client could not be constructed from configuration.
    #[error("upstream client error: {0}")]
    Client(String),
}

impl GatewayError {
    /// Short machine-readable tag used in error bodies and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Transport { .. } => "transport",
            GatewayError::InvalidEndpoint { .. } => "invalid_endpoint",
            GatewayError::InvalidRequest(_) => "invalid_request",
            GatewayError::Authentication(_) => "authentication",
            GatewayError::Client(_) => "client",
        }
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GatewayError::Authentication("unknown username".into());
        assert_eq!(err.to_string(), "authentication failed: unknown username");
        assert_eq!(err.kind(), "authentication");

        let err = GatewayError::InvalidEndpoint {
            endpoint: "/abs".into(),
            reason: "must be relative".into(),
        };
        assert!(err.to_string().contains("/abs"));
    }
}
