//! Upstream response normalization pipeline.
//!
//! # Data Flow
//! ```text
//! UpstreamResponse
//!     → classify.rs (content-type → parser hint)
//!     → body.rs (hinted parser, then the other, then ERROR)
//!     → envelope.rs (RawEnvelope: status, query-free url, kind, data, meta)
//!     → schema.rs (SUCCESS | ERROR | SKIPPED, raw data kept on failure)
//!     → encode.rs (legacy key=value text) or structured JSON
//! ```
//!
//! # Design Decisions
//! - Every stage is total; failure is carried as data, never as an error
//! - No state survives between invocations, so calls run concurrently
//! - Instrumentation happens once, in [`process`]

pub mod body;
pub mod classify;
pub mod encode;
pub mod envelope;
pub mod schema;

use serde::Serialize;
use std::time::Instant;

use crate::observability::metrics;
use crate::upstream::UpstreamResponse;

pub use body::{ContentKind, ParsedBody};
pub use classify::{BodyHint, ParserHint};
pub use encode::{encode, encode_with, LegacyOptions, LegacyVariant};
pub use envelope::RawEnvelope;
pub use schema::{NoSchema, Payload, Schema, SerdeSchema, ValidatedResult, ValidationStatus};

/// Envelope plus the validation result derived from it.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput<T> {
    pub envelope: RawEnvelope,
    pub result: ValidatedResult<T>,
}

/// Run the full pipeline over one upstream response.
pub fn process<S: Schema>(
    command: &str,
    response: &UpstreamResponse,
    debug: bool,
    schema: Option<&S>,
) -> PipelineOutput<S::Output> {
    let started = Instant::now();
    let span = tracing::debug_span!(
        "pipeline",
        command,
        content_kind = tracing::field::Empty,
        validation = tracing::field::Empty,
    );
    let _guard = span.enter();

    let hint = classify::classify_headers(&response.headers);
    let parsed = body::parse(&response.body, hint);
    let envelope = envelope::normalize(response, parsed, debug);
    let result = schema::validate(&envelope, schema);

    span.record("content_kind", envelope.content_kind.as_str());
    span.record("validation", result.status.as_str());
    tracing::debug!(
        status_code = envelope.status_code,
        url = %envelope.url,
        parser = ?hint.parser,
        charset = hint.encoding.name(),
        payload_size = envelope.data.to_string().len(),
        elapsed_us = started.elapsed().as_micros() as u64,
        "Upstream response normalized"
    );
    metrics::record_pipeline(command, envelope.content_kind, result.status);

    PipelineOutput { envelope, result }
}
