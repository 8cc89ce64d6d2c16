//! # Cryptographic Error Types

use thiserror::Error;

/// Errors parsing or using key material.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Public key is not 32 bytes of hex, or not a valid curve point.
    #[error("invalid Ed25519 public key: {0}")]
    InvalidPublicKey(String),

    /// Signature is not 64 bytes of hex.
    #[error("invalid Ed25519 signature: {0}")]
    InvalidSignature(String),

    /// Seed is not 32 bytes of hex.
    #[error("invalid Ed25519 seed: {0}")]
    InvalidSeed(String),

    /// Signature did not verify.
    #[error("Ed25519 verification failed: {0}")]
    VerificationFailed(String),
}

/// Why a detached signature on an entry was refused.
///
/// Every variant maps to the same protocol outcome; the variant only feeds
/// logs and error details.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature present without a public key")]
    MissingPublicKey,

    #[error("signature present without {0}")]
    MissingAlgorithm(&'static str),

    #[error("unsupported signature scheme: signature_algorithm={signature_algorithm:?}, key_algorithm={key_algorithm:?}")]
    UnsupportedScheme {
        signature_algorithm: String,
        key_algorithm: String,
    },

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
