//! # In-Memory Submission Store
//!
//! Process-local backend. Committed state sits behind one
//! `Arc<RwLock<..>>`; each transaction stages its writes privately and
//! applies them in a single write-locked section on commit.
//!
//! A transaction that staged a registration another commit has since
//! claimed fails to commit with [`StoreError::Backend`] and applies nothing,
//! since its entries were verified against a registration that lost.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use benchseal_core::{ContentRef, UploaderId};
use parking_lot::{Mutex, RwLock};

use crate::error::StoreError;
use crate::record::{PersistedEntry, Registration, SubmissionRecord};
use crate::store::{HashRegistry, SubmissionStore, SubmissionTx};

#[derive(Debug, Default)]
struct MemoryState {
    registrations: HashMap<ContentRef, Registration>,
    submissions: Vec<SubmissionRecord>,
    entries: Vec<PersistedEntry>,
}

/// In-memory [`SubmissionStore`]. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemorySubmissionStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registration_count(&self) -> usize {
        self.state.read().registrations.len()
    }

    pub fn registrations(&self) -> Vec<Registration> {
        self.state.read().registrations.values().cloned().collect()
    }

    pub fn submissions(&self) -> Vec<SubmissionRecord> {
        self.state.read().submissions.clone()
    }

    pub fn entries(&self) -> Vec<PersistedEntry> {
        self.state.read().entries.clone()
    }
}

#[async_trait]
impl SubmissionStore for MemorySubmissionStore {
    async fn begin(&self) -> Result<Box<dyn SubmissionTx>, StoreError> {
        Ok(Box::new(MemoryTx {
            state: Arc::clone(&self.state),
            staged: Mutex::new(Staged::default()),
        }))
    }

    async fn lookup(&self, content_ref: &ContentRef) -> Result<Option<Registration>, StoreError> {
        Ok(self.state.read().registrations.get(content_ref).cloned())
    }
}

#[derive(Debug, Default)]
struct Staged {
    registrations: Vec<Registration>,
    submissions: Vec<SubmissionRecord>,
    entries: Vec<PersistedEntry>,
}

struct MemoryTx {
    state: Arc<RwLock<MemoryState>>,
    staged: Mutex<Staged>,
}

impl MemoryTx {
    fn find(&self, content_ref: &ContentRef) -> Option<Registration> {
        if let Some(existing) = self.state.read().registrations.get(content_ref) {
            return Some(existing.clone());
        }
        self.staged
            .lock()
            .registrations
            .iter()
            .find(|r| r.matches(content_ref))
            .cloned()
    }
}

#[async_trait]
impl HashRegistry for MemoryTx {
    async fn register(
        &self,
        content_ref: &ContentRef,
        committer: &UploaderId,
    ) -> Result<Registration, StoreError> {
        if let Some(existing) = self.find(content_ref) {
            return Ok(existing);
        }
        let registration = Registration::new(content_ref, committer);
        self.staged.lock().registrations.push(registration.clone());
        Ok(registration)
    }

    async fn lookup(&self, content_ref: &ContentRef) -> Result<Option<Registration>, StoreError> {
        Ok(self.find(content_ref))
    }
}

#[async_trait]
impl SubmissionTx for MemoryTx {
    async fn record_submission(&self, record: &SubmissionRecord) -> Result<(), StoreError> {
        self.staged.lock().submissions.push(record.clone());
        Ok(())
    }

    async fn persist_entry(&self, entry: &PersistedEntry) -> Result<(), StoreError> {
        self.staged.lock().entries.push(entry.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTx { state, staged } = *self;
        let staged = staged.into_inner();
        let mut state = state.write();
        let preempted = staged
            .registrations
            .iter()
            .find(|r| state.registrations.contains_key(&r.content_ref()));
        if let Some(lost) = preempted {
            tracing::warn!(
                address = %lost.content_address,
                "staged registration committed concurrently"
            );
            return Err(StoreError::Backend(format!(
                "registration for {} was committed concurrently",
                lost.content_address
            )));
        }
        let inserted = staged.registrations.len();
        for registration in staged.registrations {
            state
                .registrations
                .insert(registration.content_ref(), registration);
        }
        let entries = staged.entries.len();
        state.submissions.extend(staged.submissions);
        state.entries.extend(staged.entries);
        tracing::debug!(registrations = inserted, entries, "memory store commit");
        Ok(())
    }
}
