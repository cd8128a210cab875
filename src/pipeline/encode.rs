//! Legacy `key=value&key=value` encoding for the Otomax router.
//!
//! Nested mappings are wrapped in braces, booleans are lowercase and the
//! joined result has its spaces (and, in the strict variant, quotes)
//! removed so it travels as a single unencoded token.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::pipeline::PipelineOutput;

/// Which characters are removed from the joined output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegacyVariant {
    /// Spaces only.
    Plain,
    /// Spaces, double quotes and single quotes.
    #[default]
    Strict,
}

impl LegacyVariant {
    fn strips(self, c: char) -> bool {
        match self {
            LegacyVariant::Plain => c == ' ',
            LegacyVariant::Strict => matches!(c, ' ' | '"' | '\''),
        }
    }
}

/// Encode a mapping with the strict variant.
pub fn encode(value: &Map<String, Value>) -> String {
    encode_with(value, LegacyVariant::Strict)
}

/// Encode a mapping, preserving its insertion order.
///
/// Sequences are rendered as compact JSON text; callers pre-flatten them
/// when another shape is wanted.
pub fn encode_with(value: &Map<String, Value>, variant: LegacyVariant) -> String {
    join_pairs(value)
        .chars()
        .filter(|c| !variant.strips(*c))
        .collect()
}

fn join_pairs(map: &Map<String, Value>) -> String {
    map.iter()
        .map(|(key, value)| format!("{key}={}", render_value(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Object(nested) => format!("{{{}}}", join_pairs(nested)),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) => value.to_string(),
    }
}

/// Options for rendering a whole pipeline result as legacy text.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyOptions {
    pub variant: LegacyVariant,
    /// Prepend `status_code`, `url` and `parse` (plus `meta` when present).
    pub include_envelope: bool,
}

/// Render a pipeline result for the legacy consumer.
///
/// Payload fields are emitted at the top level; a non-mapping payload is
/// placed under `raw`. A payload key that collides with an envelope field
/// is emitted as `payload_<key>` so neither value is lost.
pub fn encode_output<T: Serialize>(output: &PipelineOutput<T>, options: LegacyOptions) -> String {
    let mut document = Map::new();

    if options.include_envelope {
        document.insert("status_code".into(), Value::from(output.envelope.status_code));
        document.insert("url".into(), Value::String(output.envelope.url.clone()));
        document.insert("parse".into(), Value::from(output.result.status.as_str()));
        if !output.envelope.meta.is_empty() {
            document.insert("meta".into(), Value::Object(output.envelope.meta.clone()));
        }
    }

    let fields = match output.result.payload.to_value() {
        Value::Object(fields) => fields,
        other => Map::from_iter([("raw".to_string(), other)]),
    };
    for (key, value) in fields {
        let key = if document.contains_key(&key) {
            format!("payload_{key}")
        } else {
            key
        };
        document.insert(key, value);
    }

    encode_with(&document, options.variant)
}
