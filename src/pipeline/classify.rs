//! Content-type classification.
//!
//! Decides which body parser runs first and which charset text is decoded
//! with. Only the MIME type before any `;` parameters picks the parser,
//! case-insensitively; the `charset` parameter picks the decoder.

use encoding_rs::{Encoding, UTF_8};
use mime::Mime;
use reqwest::header::{HeaderMap, CONTENT_TYPE};

/// Parser to attempt first for a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserHint {
    Json,
    Text,
}

impl ParserHint {
    /// The parser tried when the hinted one fails.
    pub fn fallback(self) -> Self {
        match self {
            ParserHint::Json => ParserHint::Text,
            ParserHint::Text => ParserHint::Json,
        }
    }
}

/// Parser order plus the text decoder declared by the upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyHint {
    pub parser: ParserHint,
    pub encoding: &'static Encoding,
}

impl From<ParserHint> for BodyHint {
    fn from(parser: ParserHint) -> Self {
        Self {
            parser,
            encoding: UTF_8,
        }
    }
}

/// Classify a raw `content-type` header value.
///
/// Missing, unknown and `application/octet-stream` types fall back to JSON:
/// upstreams regularly mislabel JSON bodies. Unknown or absent charsets
/// decode as UTF-8.
pub fn classify(content_type: &str) -> BodyHint {
    BodyHint {
        parser: parser_for(content_type),
        encoding: charset(content_type).unwrap_or(UTF_8),
    }
}

fn charset(content_type: &str) -> Option<&'static Encoding> {
    let parsed: Mime = content_type.trim().parse().ok()?;
    let label = parsed.get_param(mime::CHARSET)?;
    Encoding::for_label(label.as_str().as_bytes())
}

fn parser_for(content_type: &str) -> ParserHint {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if mime.contains("json") {
        ParserHint::Json
    } else if ["text", "html", "xml"].iter().any(|t| mime.contains(t)) {
        ParserHint::Text
    } else {
        ParserHint::Json
    }
}

/// Classify from a response header map.
pub fn classify_headers(headers: &HeaderMap) -> BodyHint {
    let content_type = headers
        .get(CONTENT_TYPE)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .unwrap_or_default();
    classify(&content_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_json_types() {
        assert_eq!(classify("application/json").parser, ParserHint::Json);
        assert_eq!(classify("Application/JSON; charset=utf-8").parser, ParserHint::Json);
        assert_eq!(classify("application/problem+json").parser, ParserHint::Json);
    }

    #[test]
    fn test_text_types() {
        assert_eq!(classify("text/html").parser, ParserHint::Text);
        assert_eq!(classify("text/plain; charset=utf-8").parser, ParserHint::Text);
        assert_eq!(classify("application/xml").parser, ParserHint::Text);
        assert_eq!(classify("application/xhtml+xml").parser, ParserHint::Text);
    }

    #[test]
    fn test_parameters_are_ignored() {
        // Parameter text never decides the parser.
        assert_eq!(classify("text/plain; profile=json").parser, ParserHint::Text);
    }

    #[test]
    fn test_optimistic_default() {
        assert_eq!(classify("").parser, ParserHint::Json);
        assert_eq!(classify("application/octet-stream").parser, ParserHint::Json);
        assert_eq!(classify("image/png").parser, ParserHint::Json);
    }

    #[test]
    fn test_classify_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(classify_headers(&headers).parser, ParserHint::Json);

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
        assert_eq!(classify_headers(&headers).parser, ParserHint::Text);
    }

    #[test]
    fn test_declared_charset() {
        assert_eq!(classify("text/html").encoding, UTF_8);
        assert_eq!(classify("text/html; charset=ISO-8859-1").encoding, WINDOWS_1252);
        assert_eq!(classify("text/plain; charset=\"utf-8\"").encoding, UTF_8);
        assert_eq!(classify("text/plain; charset=no-such-charset").encoding, UTF_8);
        assert_eq!(classify("").encoding, UTF_8);
    }

    #[test]
    fn test_fallback_order() {
        assert_eq!(ParserHint::Json.fallback(), ParserHint::Text);
        assert_eq!(ParserHint::Text.fallback(), ParserHint::Json);
    }
}
