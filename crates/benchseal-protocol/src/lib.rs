//! # benchseal-protocol: Commit-Reveal Verification
//!
//! - [`reveal`]: the pure reveal decision ([`RevealVerifier::verify`]) and its
//!   registry-backed form ([`RevealVerifier::verify_against`]).
//! - [`pipeline`]: batch ingestion and commitment registration, each in one
//!   storage unit of work.
//!
//! Protocol outcomes are values, not errors: a rejected batch is
//! `Ok(BatchResult::Rejected(..))`. `Err` is reserved for storage faults and
//! for batches refused before any entry is looked at.

pub mod error;
pub mod pipeline;
pub mod reveal;

pub use error::{PipelineError, VerifyError};
pub use pipeline::{
    AcceptedEntry, BatchReceipt, BatchRejection, BatchResult, CommitmentResult, EntryTally,
    Submission, SubmissionPipeline, DEFAULT_MAX_BATCH_ENTRIES,
};
pub use reveal::{RevealPolicy, RevealVerifier, VerifiedReveal};
