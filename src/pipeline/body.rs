//! Body parsing with a two-step fallback chain.
//!
//! The hinted parser runs first, then the other one, then a terminal
//! error payload. Each attempt returns a `Result`; nothing here panics or
//! propagates an error.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

use encoding_rs::Encoding;

use crate::pipeline::classify::{BodyHint, ParserHint};

/// Maximum number of body characters echoed in an error payload.
pub const PREVIEW_LIMIT: usize = 500;

/// How a response body was ultimately interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentKind {
    Dict,
    List,
    Text,
    Primitive,
    Empty,
    Error,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Dict => "DICT",
            ContentKind::List => "LIST",
            ContentKind::Text => "TEXT",
            ContentKind::Primitive => "PRIMITIVE",
            ContentKind::Empty => "EMPTY",
            ContentKind::Error => "ERROR",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of body parsing: the kind plus its map-shaped data.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBody {
    pub kind: ContentKind,
    pub data: Value,
}

impl ParsedBody {
    fn new(kind: ContentKind, data: Value) -> Self {
        Self { kind, data }
    }

    /// Terminal failure payload. Never carries partially parsed content.
    fn failure(description: String, body: &[u8], encoding: &'static Encoding) -> Self {
        let raw = if body.is_empty() {
            Value::Null
        } else {
            Value::String(preview(body, encoding))
        };
        Self::new(ContentKind::Error, json!({ "error": description, "raw": raw }))
    }
}

#[derive(Debug, Error)]
enum ParseFailure {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("body is not valid {0}")]
    Decode(&'static str),
}

/// Parse a fully read body, trying the hinted parser first.
///
/// A `text/html` body of `{}` therefore stays TEXT: declared intent wins
/// over what merely happens to be parseable. Text is decoded with the
/// declared charset.
pub fn parse(body: &[u8], hint: impl Into<BodyHint>) -> ParsedBody {
    let BodyHint { parser, encoding } = hint.into();
    let mut failures = Vec::with_capacity(2);

    for parser in [parser, parser.fallback()] {
        let attempt = match parser {
            ParserHint::Json => try_parse_json(body),
            ParserHint::Text => try_parse_text(body, encoding),
        };
        match attempt {
            Ok(parsed) => return parsed,
            Err(failure) => failures.push(failure.to_string()),
        }
    }

    ParsedBody::failure(failures.join("; "), body, encoding)
}

fn try_parse_json(body: &[u8]) -> Result<ParsedBody, ParseFailure> {
    let parsed = match serde_json::from_slice::<Value>(body)? {
        Value::Object(map) => ParsedBody::new(ContentKind::Dict, Value::Object(map)),
        Value::Array(items) => {
            let count = items.len();
            ParsedBody::new(ContentKind::List, json!({ "items": items, "count": count }))
        }
        scalar => ParsedBody::new(ContentKind::Primitive, json!({ "raw": scalar })),
    };
    Ok(parsed)
}

fn try_parse_text(body: &[u8], encoding: &'static Encoding) -> Result<ParsedBody, ParseFailure> {
    // The declared charset is authoritative; a BOM does not override it.
    let (decoded, had_errors) = encoding.decode_without_bom_handling(body);
    if had_errors {
        return Err(ParseFailure::Decode(encoding.name()));
    }
    let text = decoded.trim();
    if text.is_empty() {
        return Ok(ParsedBody::new(ContentKind::Empty, json!({ "raw": null })));
    }
    Ok(ParsedBody::new(ContentKind::Text, json!({ "raw": text })))
}

fn preview(body: &[u8], encoding: &'static Encoding) -> String {
    let (decoded, _) = encoding.decode_without_bom_handling(body);
    decoded.chars().take(PREVIEW_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::classify::classify;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_dict_is_unchanged() {
        let body = br#"{"ngrs":{"1000":"0"},"linkaja":"3230","finpay":"0"}"#;
        let parsed = parse(body, ParserHint::Json);
        assert_eq!(parsed.kind, ContentKind::Dict);
        assert_eq!(
            parsed.data,
            json!({"ngrs": {"1000": "0"}, "linkaja": "3230", "finpay": "0"})
        );
        // Insertion order survives.
        let keys: Vec<_> = parsed.data.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["ngrs", "linkaja", "finpay"]);
    }

    #[test]
    fn test_json_list_is_wrapped() {
        let parsed = parse(br#"[1, "two", {"three": 3}]"#, ParserHint::Json);
        assert_eq!(parsed.kind, ContentKind::List);
        assert_eq!(
            parsed.data,
            json!({"items": [1, "two", {"three": 3}], "count": 3})
        );
    }

    #[test]
    fn test_json_scalar_is_primitive() {
        let parsed = parse(b"42", ParserHint::Json);
        assert_eq!(parsed.kind, ContentKind::Primitive);
        assert_eq!(parsed.data, json!({"raw": 42}));

        let parsed = parse(b"\"ok\"", ParserHint::Json);
        assert_eq!(parsed.data, json!({"raw": "ok"}));

        let parsed = parse(b"null", ParserHint::Json);
        assert_eq!(parsed.kind, ContentKind::Primitive);
        assert_eq!(parsed.data, json!({"raw": null}));
    }

    #[test]
    fn test_text_hint_wins_over_parseable_json() {
        let parsed = parse(b"  {}  ", ParserHint::Text);
        assert_eq!(parsed.kind, ContentKind::Text);
        assert_eq!(parsed.data, json!({"raw": "{}"}));
    }

    #[test]
    fn test_invalid_json_falls_back_to_text() {
        let parsed = parse(b" Saldo anda 3230 \n", ParserHint::Json);
        assert_eq!(parsed.kind, ContentKind::Text);
        assert_eq!(parsed.data, json!({"raw": "Saldo anda 3230"}));
    }

    #[test]
    fn test_empty_body_for_every_hint() {
        for hint in [ParserHint::Json, ParserHint::Text] {
            for body in [&b""[..], &b"   \r\n\t"[..]] {
                let parsed = parse(body, hint);
                assert_eq!(parsed.kind, ContentKind::Empty);
                assert_eq!(parsed.data, json!({"raw": null}));
            }
        }
    }

    #[test]
    fn test_unreadable_body_is_terminal_error() {
        let body = [0xff, 0xfe, 0x00, 0x41];
        for hint in [ParserHint::Json, ParserHint::Text] {
            let parsed = parse(&body, hint);
            assert_eq!(parsed.kind, ContentKind::Error);
            let data = parsed.data.as_object().unwrap();
            assert_eq!(data.len(), 2);
            let error = data["error"].as_str().unwrap();
            assert!(error.contains("invalid JSON"));
            assert!(error.contains("not valid UTF-8"));
            assert!(data["raw"].is_string());
        }
    }

    #[test]
    fn test_declared_latin1_text_is_decoded() {
        let body = b"Saldo Rp 1.000 \xa9";
        let parsed = parse(body, classify("text/html; charset=iso-8859-1"));
        assert_eq!(parsed.kind, ContentKind::Text);
        assert_eq!(parsed.data, json!({"raw": "Saldo Rp 1.000 \u{a9}"}));

        // Without a declared charset the same bytes are not UTF-8.
        let parsed = parse(body, classify("text/html"));
        assert_eq!(parsed.kind, ContentKind::Error);
    }

    #[test]
    fn test_error_preview_is_bounded() {
        let mut body = vec![0xff];
        body.extend(std::iter::repeat(b'a').take(2 * PREVIEW_LIMIT));
        let parsed = parse(&body, ParserHint::Json);
        let raw = parsed.data["raw"].as_str().unwrap();
        assert_eq!(raw.chars().count(), PREVIEW_LIMIT);
    }

    #[test]
    fn test_content_kind_serialization() {
        assert_eq!(serde_json::to_value(ContentKind::Primitive).unwrap(), json!("PRIMITIVE"));
        assert_eq!(ContentKind::Empty.to_string(), "EMPTY");
    }
}
