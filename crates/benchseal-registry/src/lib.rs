//! # benchseal-registry: Commitment Ledger and Submission Storage
//!
//! Storage seams for the commit-reveal protocol:
//!
//! - [`HashRegistry`]: append-only, content-addressed ledger of
//!   `(digest, content_address, committer)` registrations.
//! - [`SubmissionStore`] / [`SubmissionTx`]: one unit of work per submission
//!   batch. Registrations and entries staged inside a `SubmissionTx` become
//!   visible only on [`SubmissionTx::commit`]; dropping the transaction
//!   discards them.
//!
//! [`MemorySubmissionStore`] is the in-process backend used for development
//! and tests. The Postgres backend lives in `benchseal-api`.

pub mod error;
pub mod memory;
pub mod record;
pub mod store;

pub use error::StoreError;
pub use memory::MemorySubmissionStore;
pub use record::{
    ExtendedRecord, PersistedEntry, Registration, StoredEntry, SubmissionRecord,
};
pub use store::{HashRegistry, SubmissionStore, SubmissionTx};
