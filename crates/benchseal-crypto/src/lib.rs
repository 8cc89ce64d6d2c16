//! # benchseal-crypto: Signatures over Content Digests
//!
//! - **Ed25519** key pairs, public keys and signatures with hex serde.
//! - **SignatureVerifier**: the closed set of accepted signature schemes and
//!   the checks an optional detached signature on an entry must pass.
//!
//! Signatures always cover the 32 raw bytes of a [`ContentDigest`], never
//! the payload and never the hex text of the digest.
//!
//! ## Crate Policy
//!
//! - Depends only on `benchseal-core` internally.
//! - No mocking of cryptographic operations in tests.
//! - Verification never panics on attacker-controlled input.
//!
//! [`ContentDigest`]: benchseal_core::ContentDigest

pub mod ed25519;
pub mod error;
pub mod verifier;

pub use ed25519::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use error::{CryptoError, SignatureError};
pub use verifier::{SignatureScheme, SignatureVerifier};
