use thiserror::Error;

/// Storage failure. Never a protocol outcome: a `StoreError` aborts the
/// batch and surfaces as a server fault.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend could not complete the operation.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A stored row could not be decoded into a domain value.
    #[error("corrupt stored record: {0}")]
    Corrupt(String),
}
