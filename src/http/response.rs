//! Output rendering for pipeline results and gateway errors.
//!
//! # Design Decisions
//! - Pipeline outcomes always answer 200, ERROR kinds included
//! - Only malformed queries, authentication, transport and internal
//!   failures change the status
//! - Per-request `debug` / `text` flags override the configured defaults

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::config::{ResponseConfig, ResponseMode};
use crate::error::GatewayError;
use crate::pipeline::encode::{encode_output, encode_with};
use crate::pipeline::{ContentKind, LegacyOptions, Payload, PipelineOutput, ValidationStatus};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Presentation flags accepted on every command route.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct OutputFlags {
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub debug: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub text: Option<bool>,
}

/// Boolean spellings accepted in query strings, case-insensitively.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    parse_flag(&raw)
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("'{raw}' is not a boolean flag")))
}

impl OutputFlags {
    pub fn debug(&self, config: &ResponseConfig) -> bool {
        self.debug.unwrap_or(config.debug)
    }

    pub fn mode(&self, config: &ResponseConfig) -> ResponseMode {
        match self.text {
            Some(true) => ResponseMode::Legacy,
            Some(false) => ResponseMode::Structured,
            None => config.mode,
        }
    }
}

/// JSON body returned in structured mode.
#[derive(Debug, Serialize)]
pub struct StructuredResponse<'a, T> {
    pub status_code: u16,
    pub url: &'a str,
    pub content_kind: ContentKind,
    pub parse: ValidationStatus,
    pub description: &'a str,
    pub data: &'a Payload<T>,
    pub meta: &'a Map<String, Value>,
}

impl<'a, T> StructuredResponse<'a, T> {
    pub fn new(output: &'a PipelineOutput<T>) -> Self {
        Self {
            status_code: output.envelope.status_code,
            url: &output.envelope.url,
            content_kind: output.envelope.content_kind,
            parse: output.result.status,
            description: &output.result.description,
            data: &output.result.payload,
            meta: &output.envelope.meta,
        }
    }
}

/// Render a pipeline result in the requested mode.
pub fn render<T: Serialize>(output: &PipelineOutput<T>, mode: ResponseMode, options: LegacyOptions) -> Response {
    match mode {
        ResponseMode::Structured => Json(StructuredResponse::new(output)).into_response(),
        ResponseMode::Legacy => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, TEXT_PLAIN)],
            encode_output(output, options),
        )
            .into_response(),
    }
}

fn error_status(err: &GatewayError) -> StatusCode {
    match err {
        GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        GatewayError::Authentication(_) => StatusCode::UNAUTHORIZED,
        GatewayError::Transport { .. } => StatusCode::SERVICE_UNAVAILABLE,
        GatewayError::InvalidEndpoint { .. } | GatewayError::Client(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        (error_status(&self), Json(body)).into_response()
    }
}

/// Render a gateway error in the requested mode.
pub fn render_error(err: GatewayError, mode: ResponseMode, options: LegacyOptions) -> Response {
    match mode {
        ResponseMode::Structured => err.into_response(),
        ResponseMode::Legacy => {
            let mut fields = Map::new();
            fields.insert("error".into(), Value::from(err.kind()));
            fields.insert("message".into(), Value::from(err.to_string()));
            (
                error_status(&err),
                [(header::CONTENT_TYPE, TEXT_PLAIN)],
                encode_with(&fields, options.variant),
            )
                .into_response()
        }
    }
}
