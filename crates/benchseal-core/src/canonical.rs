//! # Canonical Serialization
//!
//! `CanonicalBytes` is the sole construction path for bytes that get hashed
//! anywhere in benchseal. Two committers that hold the same logical payload
//! must produce identical bytes, or the reveal of one can never match the
//! commitment of the other.
//!
//! ## Security Invariant
//!
//! The inner `Vec<u8>` is private. The only constructors are:
//!
//! - [`CanonicalBytes::from_text()`]: the UTF-8 bytes of a string exactly as
//!   given. No trimming, no Unicode normalization, no newline rewriting.
//! - [`CanonicalBytes::from_json()`] / [`CanonicalBytes::from_value()`]:
//!   JCS (RFC 8785) output after float rejection: sorted keys, compact
//!   separators, UTF-8.
//!
//! Any function that needs canonical bytes for a digest takes
//! `&CanonicalBytes`, so the "hashed the wrong serialization" defect class
//! cannot be written.
//!
//! ## Float Rejection
//!
//! Non-integer numbers are rejected. JCS number formatting follows
//! ECMAScript rules that differ subtly across JSON libraries; a score of
//! `0.1` serialized by one client and `0.10000000000000001` by another would
//! silently break a reveal. Scores carry integers or decimal strings.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by the canonicalization pipeline.
///
/// # Invariants
///
/// - Text payloads are the raw UTF-8 bytes of the string.
/// - JSON payloads contain no floats, have lexicographically sorted keys and
///   use compact separators (RFC 8785).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonical bytes of a text payload: its UTF-8 encoding, untouched.
    pub fn from_text(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }

    /// Canonical bytes of any serializable structured value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::FloatRejected` if the value contains a
    /// non-integer number, and `SerializationFailed` if the value cannot be
    /// represented as JSON at all (e.g. a map with non-string keys).
    pub fn from_json(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        Self::from_value(value)
    }

    /// Canonical bytes of an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, CanonicalizationError> {
        let coerced = reject_floats(value)?;
        let s = serde_jcs::to_string(&coerced)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Recursively walk a JSON value, rejecting any number that is not an
/// integer representable as `i64`/`u64`.
fn reject_floats(value: Value) -> Result<Value, CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(value),
        Value::Number(ref n) => {
            if n.is_f64() && !n.is_i64() && !n.is_u64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(value)
        }
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                out.insert(k, reject_floats(v)?);
            }
            Ok(Value::Object(out))
        }
        Value::Array(arr) => {
            let out: Result<Vec<_>, _> = arr.into_iter().map(reject_floats).collect();
            Ok(Value::Array(out?))
        }
    }
}
