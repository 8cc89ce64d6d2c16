//! # Content Addressing
//!
//! Every payload is identified by a pair: its SHA-256 [`ContentDigest`] and a
//! self-describing [`ContentAddress`]. The address is a CIDv1:
//!
//! ```text
//! 'b' || base32lower( 0x01 || varint(codec) || 0x12 || 0x20 || sha256 )
//! ```
//!
//! The codec is `raw` (0x55) for text payloads and `json` (0x0200) for
//! structured payloads. Text addresses are therefore the same strings IPFS
//! produces for raw leaves.
//!
//! Parsing is strict: only base32 lowercase multibase, CID version 1, the two
//! codecs above, a sha2-256 multihash of 32 bytes, minimal varints and zero
//! trailing bits are accepted. Two parsed addresses compare equal iff their
//! strings do.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::digest::{sha256_digest, ContentDigest};
use crate::entry::CommitmentRef;
use crate::error::{AddressError, CanonicalizationError};
use crate::payload::Payload;

const CID_VERSION: u64 = 1;
const SHA2_256: u64 = 0x12;
const SHA2_256_LEN: u64 = 32;
const MULTIBASE_BASE32: char = 'b';
const BASE32_ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

/// Content codec recorded in a content address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    /// Opaque bytes (text payloads).
    Raw,
    /// JSON in canonical form.
    Json,
}

impl Codec {
    /// Multicodec table code.
    pub fn code(self) -> u64 {
        match self {
            Self::Raw => 0x55,
            Self::Json => 0x0200,
        }
    }

    /// Multicodec table name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Json => "json",
        }
    }

    fn from_code(code: u64) -> Result<Self, AddressError> {
        match code {
            0x55 => Ok(Self::Raw),
            0x0200 => Ok(Self::Json),
            other => Err(AddressError::UnsupportedCodec(other)),
        }
    }
}

/// A validated CIDv1 content address.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ContentAddress {
    text: String,
    codec: Codec,
    digest: ContentDigest,
}

impl ContentAddress {
    /// Build the address for a digest under a codec.
    pub fn from_parts(codec: Codec, digest: ContentDigest) -> Self {
        let mut bytes = Vec::with_capacity(38);
        write_varint(CID_VERSION, &mut bytes);
        write_varint(codec.code(), &mut bytes);
        write_varint(SHA2_256, &mut bytes);
        write_varint(SHA2_256_LEN, &mut bytes);
        bytes.extend_from_slice(digest.as_bytes());

        let mut text = String::with_capacity(1 + (bytes.len() * 8).div_ceil(5));
        text.push(MULTIBASE_BASE32);
        text.push_str(&base32_encode(&bytes));
        Self {
            text,
            codec,
            digest,
        }
    }

    /// Parse and validate a content address string.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let mut chars = s.chars();
        let prefix = chars
            .next()
            .ok_or_else(|| AddressError::Malformed("empty content address".to_string()))?;
        if prefix != MULTIBASE_BASE32 {
            return Err(AddressError::UnsupportedMultibase(prefix));
        }
        let bytes = base32_decode(chars.as_str())?;

        let mut pos = 0;
        let version = read_varint(&bytes, &mut pos)?;
        if version != CID_VERSION {
            return Err(AddressError::UnsupportedVersion(version));
        }
        let codec = Codec::from_code(read_varint(&bytes, &mut pos)?)?;
        let code = read_varint(&bytes, &mut pos)?;
        let length = read_varint(&bytes, &mut pos)?;
        if code != SHA2_256 || length != SHA2_256_LEN {
            return Err(AddressError::UnsupportedMultihash { code, length });
        }

        let rest = &bytes[pos..];
        if rest.len() != 32 {
            return Err(AddressError::Malformed(format!(
                "expected 32 digest bytes, found {}",
                rest.len()
            )));
        }
        let mut digest = [0u8; 32];
        digest.copy_from_slice(rest);

        Ok(Self {
            text: s.to_string(),
            codec,
            digest: ContentDigest::from_bytes(digest),
        })
    }

    /// The address string.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The content codec.
    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// The SHA-256 digest wrapped inside the address.
    pub fn embedded_digest(&self) -> &ContentDigest {
        &self.digest
    }
}

impl std::fmt::Debug for ContentAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContentAddress({})", self.text)
    }
}

impl std::fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for ContentAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for ContentAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A validated `(digest, content_address)` pair: the key of a registration.
///
/// The address always embeds the digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CommitmentRef")]
pub struct ContentRef {
    /// SHA-256 of the canonical bytes.
    pub digest: ContentDigest,
    /// CIDv1 wrapping the same digest.
    pub content_address: ContentAddress,
}

impl ContentRef {
    /// Pair a digest with an address, checking that the address embeds it.
    pub fn new(digest: ContentDigest, content_address: ContentAddress) -> Result<Self, AddressError> {
        if content_address.embedded_digest() != &digest {
            return Err(AddressError::DigestNotEmbedded {
                digest: digest.to_hex(),
                address: content_address.to_string(),
            });
        }
        Ok(Self {
            digest,
            content_address,
        })
    }

    /// The pair for a digest under a codec.
    pub fn for_digest(codec: Codec, digest: ContentDigest) -> Self {
        Self {
            digest,
            content_address: ContentAddress::from_parts(codec, digest),
        }
    }

    /// The unvalidated wire form.
    pub fn to_commitment_ref(&self) -> CommitmentRef {
        CommitmentRef {
            digest: self.digest.to_hex(),
            content_address: self.content_address.to_string(),
        }
    }
}

impl TryFrom<CommitmentRef> for ContentRef {
    type Error = AddressError;

    fn try_from(raw: CommitmentRef) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

/// Derive `(digest, content_address)` for a payload.
///
/// Pure and deterministic. Text payloads never fail; JSON payloads fail only
/// when they cannot be canonicalized.
pub fn address_of(payload: &Payload) -> Result<ContentRef, CanonicalizationError> {
    let canonical = payload.canonical_bytes()?;
    let digest = sha256_digest(&canonical);
    Ok(ContentRef::for_digest(payload.codec(), digest))
}

fn write_varint(mut n: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (n & 0x7f) as u8;
        n >>= 7;
        if n == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

fn read_varint(bytes: &[u8], pos: &mut usize) -> Result<u64, AddressError> {
    let mut value = 0u64;
    for shift in 0..9 {
        let Some(&byte) = bytes.get(*pos) else {
            return Err(AddressError::Malformed("truncated varint".to_string()));
        };
        *pos += 1;
        value |= u64::from(byte & 0x7f) << (7 * shift);
        if byte & 0x80 == 0 {
            if byte == 0 && shift > 0 {
                return Err(AddressError::Malformed("non-minimal varint".to_string()));
            }
            return Ok(value);
        }
    }
    Err(AddressError::Malformed("varint too long".to_string()))
}

fn base32_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity((bytes.len() * 8).div_ceil(5));
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;
    for &b in bytes {
        buffer = (buffer << 8) | u32::from(b);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
        buffer &= (1 << bits) - 1;
    }
    if bits > 0 {
        out.push(BASE32_ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

fn base32_decode(s: &str) -> Result<Vec<u8>, AddressError> {
    let mut out = Vec::with_capacity(s.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;
    for (i, c) in s.bytes().enumerate() {
        let v = match c {
            b'a'..=b'z' => c - b'a',
            b'2'..=b'7' => c - b'2' + 26,
            _ => {
                return Err(AddressError::InvalidBase32(format!(
                    "invalid character at position {i}"
                )))
            }
        };
        buffer = (buffer << 5) | u32::from(v);
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }
    if bits >= 5 || buffer != 0 {
        return Err(AddressError::InvalidBase32(
            "non-canonical trailing bits".to_string(),
        ));
    }
    Ok(out)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn address_is_deterministic(s in ".{0,200}") {
            let a = address_of(&Payload::text(s.clone())).unwrap();
            let b = address_of(&Payload::text(s)).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn rendered_address_parses_back(bytes in any::<[u8; 32]>(), json in any::<bool>()) {
            let codec = if json { Codec::Json } else { Codec::Raw };
            let digest = ContentDigest::from_bytes(bytes);
            let addr = ContentAddress::from_parts(codec, digest);
            let parsed = ContentAddress::parse(addr.as_str()).unwrap();
            prop_assert_eq!(parsed.embedded_digest(), &digest);
            prop_assert_eq!(parsed, addr);
        }
    }
}
