//! # Submission Pipeline
//!
//! The only writer of the hash registry. Two operations:
//!
//! - [`SubmissionPipeline::register_commitments`] records commitments for
//!   content that is not yet public.
//! - [`SubmissionPipeline::ingest`] verifies a batch of commit-only and
//!   revealed entries and persists it.
//!
//! Each call runs in one [`SubmissionTx`]. The first entry whose outcome is
//! not `ACCEPTED` ends the call; the transaction is dropped and nothing the
//! call staged (registrations included) is persisted.
//!
//! [`SubmissionTx`]: benchseal_registry::SubmissionTx

use std::sync::Arc;

use benchseal_core::{
    CommitOnlyEntry, CommitmentRef, ContentEnvelope, ContentKind, ContentRef, EntryVariant,
    RegistrationId, Rejection, SubmissionId, Uploader, UploaderId, VerificationOutcome,
};
use benchseal_crypto::SignatureVerifier;
use benchseal_registry::{
    ExtendedRecord, HashRegistry, PersistedEntry, Registration, StoreError, StoredEntry,
    SubmissionRecord, SubmissionStore,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{PipelineError, VerifyError};
use crate::reveal::{RevealPolicy, RevealVerifier};

/// Default upper bound on entries per call.
pub const DEFAULT_MAX_BATCH_ENTRIES: usize = 500;

/// A batch of entries from one authenticated uploader.
#[derive(Debug, Clone)]
pub struct Submission {
    pub uploader: Uploader,
    pub entries: Vec<ContentEnvelope>,
}

/// Per-kind and per-variant counts of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EntryTally {
    pub prompts: usize,
    pub responses: usize,
    pub scores: usize,
    pub revealed: usize,
    pub commit_only: usize,
}

impl EntryTally {
    fn count(&mut self, kind: ContentKind, variant: EntryVariant) {
        match kind {
            ContentKind::Prompt => self.prompts += 1,
            ContentKind::Response => self.responses += 1,
            ContentKind::Score => self.scores += 1,
        }
        match variant {
            EntryVariant::Revealed => self.revealed += 1,
            EntryVariant::CommitOnly => self.commit_only += 1,
        }
    }
}

/// Receipt line for one accepted entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptedEntry {
    pub index: usize,
    pub kind: ContentKind,
    pub variant: EntryVariant,
    pub digest: String,
    pub content_address: String,
    /// The registration this entry references, disclosed, or (for a direct
    /// reveal) registered or resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_id: Option<RegistrationId>,
}

/// Proof of an accepted batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReceipt {
    pub submission_id: SubmissionId,
    pub uploader_id: UploaderId,
    pub tally: EntryTally,
    pub entries: Vec<AcceptedEntry>,
    pub created_at: DateTime<Utc>,
}

/// The entry that stopped a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchRejection {
    pub index: usize,
    pub outcome: VerificationOutcome,
    pub detail: String,
}

impl BatchRejection {
    fn new(index: usize, rejection: Rejection) -> Self {
        Self {
            index,
            outcome: rejection.outcome,
            detail: rejection.detail,
        }
    }
}

/// Result of [`SubmissionPipeline::ingest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchResult {
    Accepted(BatchReceipt),
    Rejected(BatchRejection),
}

/// Result of [`SubmissionPipeline::register_commitments`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitmentResult {
    /// One registration per reference, in request order. Content that was
    /// already committed returns its existing registration.
    Registered(Vec<Registration>),
    Rejected(BatchRejection),
}

/// Verifies and persists submissions.
#[derive(Clone)]
pub struct SubmissionPipeline {
    store: Arc<dyn SubmissionStore>,
    reveals: RevealVerifier,
    signatures: SignatureVerifier,
    max_entries: usize,
}

impl std::fmt::Debug for SubmissionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionPipeline")
            .field("policy", self.reveals.policy())
            .field("max_entries", &self.max_entries)
            .finish_non_exhaustive()
    }
}

impl SubmissionPipeline {
    pub fn new(store: Arc<dyn SubmissionStore>, policy: RevealPolicy) -> Self {
        Self {
            store,
            reveals: RevealVerifier::new(policy),
            signatures: SignatureVerifier::new(),
            max_entries: DEFAULT_MAX_BATCH_ENTRIES,
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn store(&self) -> &Arc<dyn SubmissionStore> {
        &self.store
    }

    /// Read a committed registration.
    pub async fn lookup(&self, content_ref: &ContentRef) -> Result<Option<Registration>, StoreError> {
        self.store.lookup(content_ref).await
    }

    fn check_size(&self, count: usize) -> Result<(), PipelineError> {
        if count == 0 {
            return Err(PipelineError::EmptyBatch);
        }
        if count > self.max_entries {
            return Err(PipelineError::TooManyEntries {
                count,
                max: self.max_entries,
            });
        }
        Ok(())
    }

    /// Register each reference under `uploader`.
    pub async fn register_commitments(
        &self,
        uploader: &Uploader,
        refs: &[CommitmentRef],
    ) -> Result<CommitmentResult, PipelineError> {
        self.check_size(refs.len())?;

        let mut parsed = Vec::with_capacity(refs.len());
        for (index, raw) in refs.iter().enumerate() {
            match raw.parse() {
                Ok(content_ref) => parsed.push(content_ref),
                Err(e) => {
                    let rejection = BatchRejection::new(index, Rejection::malformed(e.to_string()));
                    log_rejection(uploader, None, &rejection);
                    return Ok(CommitmentResult::Rejected(rejection));
                }
            }
        }

        let tx = self.store.begin().await?;
        let mut registrations = Vec::with_capacity(parsed.len());
        let mut fresh = 0usize;
        for content_ref in &parsed {
            let registration = tx.register(content_ref, &uploader.id).await?;
            if registration.committer_id == uploader.id {
                fresh += 1;
            }
            registrations.push(registration);
        }
        tx.commit().await?;

        tracing::info!(
            uploader = %uploader.id,
            commitments = registrations.len(),
            owned = fresh,
            "commitments registered"
        );
        Ok(CommitmentResult::Registered(registrations))
    }

    /// Verify every entry of `submission` in index order and persist the
    /// batch if all are accepted.
    pub async fn ingest(&self, submission: Submission) -> Result<BatchResult, PipelineError> {
        let Submission { uploader, entries } = submission;
        self.check_size(entries.len())?;

        let submission_id = SubmissionId::new();
        let created_at = Utc::now();
        let tx = self.store.begin().await?;
        tx.record_submission(&SubmissionRecord {
            id: submission_id,
            uploader: uploader.clone(),
            entry_count: entries.len(),
            created_at,
        })
        .await?;

        let mut tally = EntryTally::default();
        let mut accepted = Vec::with_capacity(entries.len());
        for (index, envelope) in entries.iter().enumerate() {
            let checked = match envelope {
                ContentEnvelope::CommitOnly(entry) => {
                    self.check_commit_only(&*tx, entry).await.map(|stored| {
                        let registration_id = match &stored {
                            StoredEntry::Embargoed {
                                registration_id, ..
                            } => Some(*registration_id),
                            StoredEntry::Revealed {
                                prior_registration, ..
                            } => *prior_registration,
                        };
                        (stored, registration_id)
                    })
                }
                ContentEnvelope::Revealed(entry) => self
                    .reveals
                    .verify_against(&*tx, &uploader, entry)
                    .await
                    .map(|v| {
                        let registration_id = v.registration_id();
                        let stored = StoredEntry::Revealed {
                            kind: entry.kind,
                            payload: entry.payload.clone(),
                            content: v.content,
                            extended: entry.extended.as_ref().zip(v.extended).map(
                                |(ext, content)| ExtendedRecord {
                                    payload: ext.payload.clone(),
                                    content,
                                },
                            ),
                            prior_registration: v.prior.map(|r| r.id),
                            signing: entry.signing.clone(),
                        };
                        (stored, registration_id)
                    }),
            };

            let (stored, registration_id) = match checked {
                Ok(checked) => checked,
                Err(VerifyError::Rejected(rejection)) => {
                    // Dropping `tx` discards everything staged so far.
                    let rejection = BatchRejection::new(index, rejection);
                    log_rejection(&uploader, Some(envelope), &rejection);
                    return Ok(BatchResult::Rejected(rejection));
                }
                Err(VerifyError::Store(e)) => return Err(e.into()),
            };

            tally.count(stored.kind(), stored.variant());
            accepted.push(accepted_entry(index, &stored, registration_id));
            tx.persist_entry(&PersistedEntry {
                submission_id,
                index,
                uploader_id: uploader.id.clone(),
                entry: stored,
            })
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            submission_id = %submission_id,
            uploader = %uploader.id,
            entries = accepted.len(),
            prompts = tally.prompts,
            responses = tally.responses,
            scores = tally.scores,
            revealed = tally.revealed,
            commit_only = tally.commit_only,
            "submission accepted"
        );

        Ok(BatchResult::Accepted(BatchReceipt {
            submission_id,
            uploader_id: uploader.id,
            tally,
            entries: accepted,
            created_at,
        }))
    }

    async fn check_commit_only<R>(
        &self,
        registry: &R,
        entry: &CommitOnlyEntry,
    ) -> Result<StoredEntry, VerifyError>
    where
        R: HashRegistry + ?Sized,
    {
        let reference = entry
            .reference
            .parse()
            .map_err(|e| Rejection::malformed(format!("commitment reference: {e}")))?;
        let registration = registry.lookup(&reference).await?.ok_or_else(|| {
            Rejection::unknown_commitment(format!(
                "no registration for {}",
                reference.content_address
            ))
        })?;
        self.signatures
            .check_fields(&reference.digest, &entry.signing)
            .map_err(|e| Rejection::invalid_signature(e.to_string()))?;

        Ok(StoredEntry::Embargoed {
            kind: entry.kind,
            reference,
            registration_id: registration.id,
            signing: entry.signing.clone(),
        })
    }
}

fn accepted_entry(
    index: usize,
    stored: &StoredEntry,
    registration_id: Option<RegistrationId>,
) -> AcceptedEntry {
    let content = stored.content_ref();
    AcceptedEntry {
        index,
        kind: stored.kind(),
        variant: stored.variant(),
        digest: content.digest.to_hex(),
        content_address: content.content_address.to_string(),
        registration_id,
    }
}

fn log_rejection(uploader: &Uploader, envelope: Option<&ContentEnvelope>, rejection: &BatchRejection) {
    let kind = envelope.map(|e| e.kind().as_str()).unwrap_or("commitment");
    let variant = envelope.map(|e| e.variant().as_str()).unwrap_or("commitment");
    if rejection.outcome.is_security_relevant() {
        tracing::warn!(
            uploader = %uploader.id,
            role = %uploader.role,
            index = rejection.index,
            outcome = %rejection.outcome,
            kind,
            variant,
            detail = %rejection.detail,
            "batch rejected"
        );
    } else {
        tracing::info!(
            uploader = %uploader.id,
            index = rejection.index,
            outcome = %rejection.outcome,
            kind,
            variant,
            detail = %rejection.detail,
            "batch rejected"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use benchseal_core::{address_of, Payload, RevealedEntry, Role, SigningFields};
    use benchseal_registry::MemorySubmissionStore;

    fn uploader(id: &str) -> Uploader {
        Uploader::new(UploaderId::new(id).unwrap(), Role::Contributor)
    }

    fn pipeline(store: &MemorySubmissionStore) -> SubmissionPipeline {
        SubmissionPipeline::new(Arc::new(store.clone()), RevealPolicy::default())
    }

    fn direct(kind: ContentKind, text: &str) -> ContentEnvelope {
        ContentEnvelope::Revealed(RevealedEntry {
            kind,
            payload: Payload::text(text),
            digest: None,
            content_address: None,
            extended: None,
            prior_commitment: None,
            signing: SigningFields::default(),
        })
    }

    fn commit_only(kind: ContentKind, text: &str) -> ContentEnvelope {
        ContentEnvelope::CommitOnly(CommitOnlyEntry {
            kind,
            reference: address_of(&Payload::text(text)).unwrap().to_commitment_ref(),
            signing: SigningFields::default(),
        })
    }

    #[tokio::test]
    async fn empty_and_oversized_batches_refused() {
        let store = MemorySubmissionStore::new();
        let p = pipeline(&store).with_max_entries(2);
        let empty = Submission {
            uploader: uploader("alice"),
            entries: vec![],
        };
        assert!(matches!(p.ingest(empty).await, Err(PipelineError::EmptyBatch)));

        let big = Submission {
            uploader: uploader("alice"),
            entries: vec![direct(ContentKind::Prompt, "a"); 3],
        };
        assert!(matches!(
            p.ingest(big).await,
            Err(PipelineError::TooManyEntries { count: 3, max: 2 })
        ));
    }

    #[tokio::test]
    async fn tally_counts_kinds_and_variants() {
        let store = MemorySubmissionStore::new();
        let p = pipeline(&store);
        let refs = vec![address_of(&Payload::text("secret score")).unwrap().to_commitment_ref()];
        p.register_commitments(&uploader("alice"), &refs).await.unwrap();

        let result = p
            .ingest(Submission {
                uploader: uploader("alice"),
                entries: vec![
                    direct(ContentKind::Prompt, "What is 2+2?"),
                    direct(ContentKind::Response, "4"),
                    commit_only(ContentKind::Score, "secret score"),
                ],
            })
            .await
            .unwrap();

        let BatchResult::Accepted(receipt) = result else {
            panic!("expected accepted batch, got {result:?}");
        };
        assert_eq!(
            receipt.tally,
            EntryTally {
                prompts: 1,
                responses: 1,
                scores: 1,
                revealed: 2,
                commit_only: 1,
            }
        );
        assert!(receipt.entries[2].registration_id.is_some());
        let registered = store.registrations();
        for line in &receipt.entries[..2] {
            let id = line
                .registration_id
                .expect("direct reveal reports the registration backing it");
            assert!(registered
                .iter()
                .any(|r| r.id == id && r.content_address.as_str() == line.content_address));
        }
        assert_eq!(store.entries().len(), 3);
        assert_eq!(store.submissions().len(), 1);
        // Two direct reveals plus the prior commitment.
        assert_eq!(store.registration_count(), 3);
    }

    #[tokio::test]
    async fn commit_only_requires_existing_registration() {
        let store = MemorySubmissionStore::new();
        let result = pipeline(&store)
            .ingest(Submission {
                uploader: uploader("alice"),
                entries: vec![commit_only(ContentKind::Score, "never committed")],
            })
            .await
            .unwrap();
        let BatchResult::Rejected(rejection) = result else {
            panic!("expected rejection, got {result:?}");
        };
        assert_eq!(rejection.index, 0);
        assert_eq!(rejection.outcome, VerificationOutcome::UnknownCommitment);
        assert!(store.entries().is_empty());
        assert!(store.submissions().is_empty());
    }

    #[tokio::test]
    async fn malformed_commitment_reference_reports_index() {
        let store = MemorySubmissionStore::new();
        let good = address_of(&Payload::text("a")).unwrap().to_commitment_ref();
        let bad = CommitmentRef {
            digest: good.digest.clone(),
            content_address: address_of(&Payload::text("b"))
                .unwrap()
                .content_address
                .to_string(),
        };
        let result = pipeline(&store)
            .register_commitments(&uploader("alice"), &[good, bad])
            .await
            .unwrap();
        let CommitmentResult::Rejected(rejection) = result else {
            panic!("expected rejection");
        };
        assert_eq!(rejection.index, 1);
        assert_eq!(rejection.outcome, VerificationOutcome::MalformedPayload);
        assert_eq!(store.registration_count(), 0);
    }

    #[tokio::test]
    async fn recommitting_returns_original_owner() {
        let store = MemorySubmissionStore::new();
        let p = pipeline(&store);
        let refs = vec![address_of(&Payload::text("q")).unwrap().to_commitment_ref()];
        let CommitmentResult::Registered(first) =
            p.register_commitments(&uploader("alice"), &refs).await.unwrap()
        else {
            panic!("expected registration");
        };
        let CommitmentResult::Registered(second) =
            p.register_commitments(&uploader("bob"), &refs).await.unwrap()
        else {
            panic!("expected registration");
        };
        assert_eq!(first, second);
        assert_eq!(second[0].committer_id.as_str(), "alice");
    }
}
