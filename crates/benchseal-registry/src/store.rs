//! # Storage Traits
//!
//! ## Registration semantics
//!
//! `register` is insert-or-ignore keyed on `(digest, content_address)`.
//! The first committer wins; a later call for the same content returns the
//! existing registration unchanged, whoever the caller is. Backends enforce
//! this with a uniqueness constraint, never with check-then-insert across
//! two statements.
//!
//! ## Units of work
//!
//! Registry writes only happen inside a [`SubmissionTx`]. A transaction
//! sees its own staged registrations through `lookup`. Nothing staged is
//! visible to other readers until `commit`, and dropping the transaction
//! without committing discards everything it staged.

use async_trait::async_trait;
use benchseal_core::{ContentRef, UploaderId};

use crate::error::StoreError;
use crate::record::{PersistedEntry, Registration, SubmissionRecord};

/// Ledger of commitments.
#[async_trait]
pub trait HashRegistry: Send + Sync {
    /// Register `content_ref` under `committer`, or return the existing
    /// registration for the same content.
    async fn register(
        &self,
        content_ref: &ContentRef,
        committer: &UploaderId,
    ) -> Result<Registration, StoreError>;

    /// Find the registration keyed by `content_ref`.
    async fn lookup(&self, content_ref: &ContentRef) -> Result<Option<Registration>, StoreError>;
}

/// Factory for submission units of work, plus committed-state reads.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Open a unit of work.
    async fn begin(&self) -> Result<Box<dyn SubmissionTx>, StoreError>;

    /// Read a committed registration.
    async fn lookup(&self, content_ref: &ContentRef) -> Result<Option<Registration>, StoreError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// One atomic unit of work. Dropping it without calling
/// [`commit`](SubmissionTx::commit) rolls back.
#[async_trait]
pub trait SubmissionTx: HashRegistry {
    async fn record_submission(&self, record: &SubmissionRecord) -> Result<(), StoreError>;

    async fn persist_entry(&self, entry: &PersistedEntry) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
