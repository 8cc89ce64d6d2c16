//! Payloads carried by revealed entries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::address::Codec;
use crate::canonical::CanonicalBytes;
use crate::error::CanonicalizationError;

/// The disclosed content of a prompt, response or score.
///
/// Serialized as `{"encoding": "text", "value": "..."}` or
/// `{"encoding": "json", "value": <any JSON>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "encoding", content = "value", rename_all = "snake_case")]
pub enum Payload {
    /// Free text, hashed as its exact UTF-8 bytes.
    Text(String),
    /// Structured content, hashed in JCS form.
    Json(Value),
}

impl Payload {
    /// Shorthand for a text payload.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// The bytes this payload's digest is computed over.
    pub fn canonical_bytes(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        match self {
            Self::Text(s) => Ok(CanonicalBytes::from_text(s)),
            Self::Json(v) => CanonicalBytes::from_value(v.clone()),
        }
    }

    /// The content codec recorded in this payload's address.
    pub fn codec(&self) -> Codec {
        match self {
            Self::Text(_) => Codec::Raw,
            Self::Json(_) => Codec::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_text() {
        let p = Payload::text("What is 2+2?");
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"encoding": "text", "value": "What is 2+2?"})
        );
    }

    #[test]
    fn wire_shape_json() {
        let p: Payload =
            serde_json::from_str(r#"{"encoding":"json","value":{"score":7}}"#).unwrap();
        assert_eq!(p, Payload::Json(serde_json::json!({"score": 7})));
        assert_eq!(p.codec(), Codec::Json);
    }

    #[test]
    fn unknown_encoding_rejected() {
        let r: Result<Payload, _> = serde_json::from_str(r#"{"encoding":"yaml","value":"a: 1"}"#);
        assert!(r.is_err());
    }

    #[test]
    fn json_payload_with_float_fails_canonicalization() {
        let p = Payload::Json(serde_json::json!({"score": 0.7}));
        assert!(p.canonical_bytes().is_err());
    }

    #[test]
    fn text_and_json_string_differ() {
        let t = Payload::text("hello").canonical_bytes().unwrap();
        let j = Payload::Json(serde_json::json!("hello"))
            .canonical_bytes()
            .unwrap();
        assert_ne!(t, j);
    }
}
