//! # Detached Signature Verification
//!
//! Checks the optional signature attached to a submission entry. The
//! accepted `(signature_algorithm, key_algorithm)` pairs form a closed
//! enumeration, [`SignatureScheme`]. Anything outside it fails.
//!
//! The verifier is stateless: no key registry, no network, no side effects.
//! A signature binds the entry's digest to the declared public key, and
//! nothing else. It is independent of who the authenticated uploader is.

use benchseal_core::{ContentDigest, SigningFields};

use crate::ed25519::{verify_digest, Ed25519PublicKey, Ed25519Signature};
use crate::error::SignatureError;

/// A supported signature scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureScheme {
    /// Ed25519 signature with an Ed25519 public key.
    Ed25519,
}

impl SignatureScheme {
    /// Resolve a declared algorithm pair. Returns `None` for unknown names
    /// and for pairs whose halves do not belong together.
    pub fn resolve(signature_algorithm: &str, key_algorithm: &str) -> Option<Self> {
        let sig = match signature_algorithm {
            "ed25519" | "Ed25519" | "EdDSA" => Self::Ed25519,
            _ => return None,
        };
        let key = match key_algorithm {
            "ed25519" | "Ed25519" => Self::Ed25519,
            _ => return None,
        };
        (sig == key).then_some(sig)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ed25519 => "ed25519",
        }
    }
}

/// Stateless verifier for detached entry signatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureVerifier;

impl SignatureVerifier {
    pub fn new() -> Self {
        Self
    }

    /// Check a signature over `digest`, returning the reason on failure.
    pub fn check(
        &self,
        digest: &ContentDigest,
        signature: &str,
        public_key: &str,
        signature_algorithm: &str,
        key_algorithm: &str,
    ) -> Result<(), SignatureError> {
        let scheme = SignatureScheme::resolve(signature_algorithm, key_algorithm).ok_or_else(
            || SignatureError::UnsupportedScheme {
                signature_algorithm: signature_algorithm.to_string(),
                key_algorithm: key_algorithm.to_string(),
            },
        )?;
        match scheme {
            SignatureScheme::Ed25519 => {
                let pk = Ed25519PublicKey::from_hex(public_key)?;
                let sig = Ed25519Signature::from_hex(signature)?;
                verify_digest(digest, &sig, &pk)?;
            }
        }
        Ok(())
    }

    /// `true` iff the signature verifies under a supported scheme.
    pub fn verify(
        &self,
        digest: &ContentDigest,
        signature: &str,
        public_key: &str,
        signature_algorithm: &str,
        key_algorithm: &str,
    ) -> bool {
        self.check(
            digest,
            signature,
            public_key,
            signature_algorithm,
            key_algorithm,
        )
        .is_ok()
    }

    /// Check an entry's signing fields against `digest`.
    ///
    /// An absent signature passes regardless of the other fields. A present
    /// signature requires the public key and both algorithm names.
    pub fn check_fields(
        &self,
        digest: &ContentDigest,
        fields: &SigningFields,
    ) -> Result<(), SignatureError> {
        let Some(signature) = fields.signature.as_deref() else {
            return Ok(());
        };
        let public_key = fields
            .public_key
            .as_deref()
            .ok_or(SignatureError::MissingPublicKey)?;
        let signature_algorithm = fields
            .signature_algorithm
            .as_deref()
            .ok_or(SignatureError::MissingAlgorithm("signature_algorithm"))?;
        let key_algorithm = fields
            .key_algorithm
            .as_deref()
            .ok_or(SignatureError::MissingAlgorithm("key_algorithm"))?;
        self.check(
            digest,
            signature,
            public_key,
            signature_algorithm,
            key_algorithm,
        )
    }
}
