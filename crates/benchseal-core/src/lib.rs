//! # benchseal-core: Foundational Types for Commit-Reveal
//!
//! This crate is the leaf of the benchseal dependency graph. It defines the
//! types every other crate agrees on when it talks about a benchmark item:
//! how its bytes are canonicalized, how those bytes are hashed, how the hash
//! is wrapped into a self-describing content address, and what a submitted
//! entry looks like on the wire.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** All digest computation flows through
//!    `CanonicalBytes`. Text payloads are hashed byte-for-byte; JSON payloads
//!    go through JCS (RFC 8785). No raw `serde_json::to_vec()` for digests.
//!
//! 2. **`sha256_digest()` accepts only `&CanonicalBytes`.** A digest over
//!    non-canonical bytes cannot be expressed.
//!
//! 3. **One address format.** `ContentAddress` is a CIDv1 (base32 multibase,
//!    sha2-256 multihash) whose embedded digest is checked on parse.
//!
//! 4. **Entries are a sum type.** `ContentEnvelope::{Revealed, CommitOnly}`
//!    is matched exhaustively by the verifier.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `benchseal-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod address;
pub mod canonical;
pub mod digest;
pub mod entry;
pub mod error;
pub mod hex;
pub mod identity;
pub mod outcome;
pub mod payload;

pub use address::{address_of, Codec, ContentAddress, ContentRef};
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, ContentDigest};
pub use entry::{
    CommitOnlyEntry, CommitmentRef, ContentEnvelope, ContentKind, EntryVariant, ExtendedPayload,
    RevealedEntry, SigningFields,
};
pub use error::{AddressError, CanonicalizationError, IdentityError};
pub use identity::{RegistrationId, Role, SubmissionId, Uploader, UploaderId};
pub use outcome::{Rejection, VerificationOutcome};
pub use payload::Payload;
