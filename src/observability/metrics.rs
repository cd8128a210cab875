//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): inbound requests by command, status
//! - `gateway_request_duration_seconds` (histogram): inbound latency by command
//! - `gateway_pipeline_total` (counter): pipeline outcomes by content kind and validation
//! - `gateway_upstream_retries_total` (counter): upstream retries by reason

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

use crate::pipeline::{ContentKind, ValidationStatus};

/// Install the Prometheus exporter with its own HTTP listener.
///
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one inbound request.
pub fn record_request(command: &str, status: u16, started: Instant) {
    counter!(
        "gateway_requests_total",
        "command" => command.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "command" => command.to_string())
        .record(started.elapsed().as_secs_f64());
}

/// Record one pipeline run.
pub fn record_pipeline(command: &str, kind: ContentKind, validation: ValidationStatus) {
    counter!(
        "gateway_pipeline_total",
        "command" => command.to_string(),
        "content_kind" => kind.as_str(),
        "validation" => validation.as_str()
    )
    .increment(1);
}

/// Record one upstream retry.
pub fn record_retry(reason: &'static str) {
    counter!("gateway_upstream_retries_total", "reason" => reason).increment(1);
}
