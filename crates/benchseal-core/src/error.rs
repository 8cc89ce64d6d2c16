//! # Error Types
//!
//! Errors raised while turning a payload into canonical bytes and while
//! parsing the self-describing identifiers derived from them.

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Scores and other numeric fields must be integers or strings.
    #[error("float values are not permitted in canonical payloads; use an integer or a decimal string: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error parsing a digest or content address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Hex-encoded digest is not 64 lowercase/uppercase hex characters.
    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    /// Content address uses a multibase other than base32 (`b`).
    #[error("unsupported multibase prefix {0:?}; expected 'b' (base32)")]
    UnsupportedMultibase(char),

    /// Base32 body could not be decoded.
    #[error("invalid base32 in content address: {0}")]
    InvalidBase32(String),

    /// CID version other than 1.
    #[error("unsupported CID version {0}; expected 1")]
    UnsupportedVersion(u64),

    /// Codec other than `raw` or `json`.
    #[error("unsupported content codec 0x{0:x}")]
    UnsupportedCodec(u64),

    /// Multihash is not sha2-256 with a 32-byte digest.
    #[error("unsupported multihash: code 0x{code:x}, length {length}")]
    UnsupportedMultihash {
        /// Multihash function code.
        code: u64,
        /// Declared digest length.
        length: u64,
    },

    /// Content address is truncated or carries trailing bytes.
    #[error("malformed content address: {0}")]
    Malformed(String),

    /// Reference pairs a digest with an address wrapping a different digest.
    #[error("content address {address} does not embed digest {digest}")]
    DigestNotEmbedded {
        /// The supplied digest (hex).
        digest: String,
        /// The supplied content address.
        address: String,
    },
}

/// Error constructing an identity value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("uploader id must not be empty")]
    EmptyUploaderId,

    #[error("uploader id is {0} bytes; maximum is 255")]
    UploaderIdTooLong(usize),

    #[error("uploader id must not contain control characters")]
    UploaderIdControlChar,

    #[error("unknown role: {0}")]
    UnknownRole(String),
}
