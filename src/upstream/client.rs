//! Pooled upstream HTTP client with retries.
//!
//! # Responsibilities
//! - Build one `reqwest::Client` from config (headers, timeouts, pool)
//! - Join command endpoints onto the base URL
//! - Retry connection errors and listed statuses with backoff
//! - Hand a fully read `UpstreamResponse` to the pipeline

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use std::time::{Duration, Instant};
use url::Url;

use crate::config::{RetryConfig, UpstreamConfig};
use crate::error::{GatewayError, GatewayResult};
use crate::observability::metrics;
use crate::resilience::{is_retryable, Backoff};
use crate::upstream::response::UpstreamResponse;

/// Client for the single configured upstream.
#[derive(Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: Url,
    name: String,
    retry: RetryConfig,
    backoff: Backoff,
}

impl UpstreamClient {
    /// Create a client from upstream configuration.
    pub fn new(config: &UpstreamConfig) -> GatewayResult<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| GatewayError::Client(format!("invalid header name '{name}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| GatewayError::Client(format!("invalid value for '{name}': {e}")))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_max_idle_per_host(config.pool_max_idle)
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
            .build()
            .map_err(|e| GatewayError::Client(e.to_string()))?;

        let mut base_url = Url::parse(&config.base_url)
            .map_err(|e| GatewayError::Client(format!("invalid base URL: {e}")))?;
        // Url::join replaces the last segment unless the path ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            name: config.name.clone(),
            retry: config.retry.clone(),
            backoff: Backoff::from_config(&config.retry),
        })
    }

    /// Base URL all endpoints are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint_url(&self, endpoint: &str) -> GatewayResult<Url> {
        if endpoint.starts_with('/') {
            return Err(GatewayError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: "endpoint must be relative".to_string(),
            });
        }
        self.base_url
            .join(endpoint)
            .map_err(|e| GatewayError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })
    }

    /// Issue a GET to `endpoint` with query parameters.
    ///
    /// Retryable statuses on the last attempt are returned as responses;
    /// only connection failures surface as [`GatewayError::Transport`].
    pub async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> GatewayResult<UpstreamResponse> {
        let url = self.endpoint_url(endpoint)?;
        let max_attempts = if self.retry.enabled {
            self.retry.max_attempts.max(1)
        } else {
            1
        };

        let mut attempts = 0;
        loop {
            attempts += 1;
            let started = Instant::now();

            tracing::debug!(
                upstream = %self.name,
                endpoint,
                attempt = attempts,
                "Issuing upstream request"
            );

            let outcome = self.client.get(url.clone()).query(params).send().await;
            let reason = match &outcome {
                Ok(response) => is_retryable(Some(response.status()), false, &self.retry.status_forcelist),
                Err(e) => is_retryable(None, e.is_connect() || e.is_timeout() || e.is_request(), &[]),
            };

            if let Some(reason) = reason.filter(|_| attempts < max_attempts) {
                let delay = self.backoff.delay(attempts);
                tracing::info!(
                    upstream = %self.name,
                    endpoint,
                    attempt = attempts,
                    reason = reason.as_str(),
                    delay = ?delay,
                    "Retrying upstream request"
                );
                metrics::record_retry(reason.as_str());
                tokio::time::sleep(delay).await;
                continue;
            }

            let transport = move |source: reqwest::Error| GatewayError::Transport {
                endpoint: endpoint.to_string(),
                attempts,
                source: source.without_url(),
            };

            let response = outcome.map_err(transport)?;
            let status = response.status();
            let response = UpstreamResponse::read(response, Method::GET, started)
                .await
                .map_err(transport)?;

            tracing::debug!(
                upstream = %self.name,
                endpoint,
                status = status.as_u16(),
                attempts,
                elapsed = ?response.elapsed,
                "Upstream response received"
            );
            return Ok(response);
        }
    }

    /// Probe the base URL. Any successful status counts as reachable.
    pub async fn check_health(&self) -> bool {
        match self.client.get(self.base_url.clone()).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!(upstream = %self.name, status = response.status().as_u16(), "Upstream reachable");
                true
            }
            Ok(response) => {
                tracing::warn!(upstream = %self.name, status = response.status().as_u16(), "Upstream returned error status");
                false
            }
            Err(e) => {
                tracing::warn!(upstream = %self.name, error = %e.without_url(), "Upstream connection failed");
                false
            }
        }
    }
}
