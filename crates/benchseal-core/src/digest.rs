//! # Content Digest
//!
//! `ContentDigest` is the 256-bit SHA-256 hash of a payload's canonical
//! bytes. It is the value that gets committed, signed and compared.
//!
//! ## Security Invariant
//!
//! A `ContentDigest` for a payload can only be computed from
//! `CanonicalBytes` via [`sha256_digest()`]. Digests parsed from the wire
//! with [`ContentDigest::from_hex()`] are claims, never proofs: the verifier
//! always recomputes before comparing.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::AddressError;
use crate::hex;

/// A SHA-256 digest of canonical payload bytes.
///
/// Serializes as a 64-character lowercase hex string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw 32 digest bytes. This is the message that entry signatures cover.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Parse a 64-character hex digest. Uppercase input is accepted and
    /// normalized; surrounding whitespace is not.
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        if s.len() != 64 {
            return Err(AddressError::InvalidDigest(format!(
                "digest must be 64 hex chars, got {}",
                s.len()
            )));
        }
        hex::decode_array::<32>(s)
            .map(Self)
            .map_err(AddressError::InvalidDigest)
    }
}

impl std::fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContentDigest({})", self.to_hex())
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Compute the SHA-256 digest of canonical bytes.
///
/// Accepts only `&CanonicalBytes`, not raw `&[u8]`.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector_empty_object() {
        let cb = CanonicalBytes::from_json(&serde_json::json!({})).unwrap();
        assert_eq!(
            sha256_digest(&cb).to_hex(),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn known_vector_prompt_text() {
        let cb = CanonicalBytes::from_text("What is 2+2?");
        assert_eq!(
            sha256_digest(&cb).to_hex(),
            "52cb6b5e4a038af1756708f98afb718a08c75b87b2f03dbee4dd9c8139c15c5e"
        );
    }

    #[test]
    fn deterministic() {
        let cb = CanonicalBytes::from_text("same bytes");
        assert_eq!(sha256_digest(&cb), sha256_digest(&cb));
    }

    #[test]
    fn different_inputs_different_digests() {
        let a = sha256_digest(&CanonicalBytes::from_text("What is 2+2?"));
        let b = sha256_digest(&CanonicalBytes::from_text("What is 2+3?"));
        assert_ne!(a, b);
    }

    #[test]
    fn hex_parse_accepts_uppercase() {
        let d = sha256_digest(&CanonicalBytes::from_text("x"));
        let upper = d.to_hex().to_uppercase();
        assert_eq!(ContentDigest::from_hex(&upper).unwrap(), d);
    }

    #[test]
    fn hex_parse_rejects_bad_input() {
        assert!(ContentDigest::from_hex("abcd").is_err());
        assert!(ContentDigest::from_hex(&"zz".repeat(32)).is_err());
        assert!(ContentDigest::from_hex(&format!(" {}", "a".repeat(63))).is_err());
    }

    #[test]
    fn serde_as_hex_string() {
        let d = sha256_digest(&CanonicalBytes::from_text("What is 2+2?"));
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(
            json,
            "\"52cb6b5e4a038af1756708f98afb718a08c75b87b2f03dbee4dd9c8139c15c5e\""
        );
        let back: ContentDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
