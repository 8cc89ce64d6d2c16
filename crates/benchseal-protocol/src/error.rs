//! # Protocol Error Types
//!
//! Protocol outcomes ([`Rejection`]) and infrastructure failures
//! ([`StoreError`]) are kept apart: the first rejects a batch with an index,
//! the second aborts it as a server fault.

use benchseal_core::Rejection;
use benchseal_registry::StoreError;
use thiserror::Error;

/// Failure verifying one entry against a registry.
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure of a pipeline operation as a whole.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("submission contains no entries")]
    EmptyBatch,

    #[error("submission has {count} entries; maximum is {max}")]
    TooManyEntries { count: usize, max: usize },

    #[error(transparent)]
    Store(#[from] StoreError),
}
