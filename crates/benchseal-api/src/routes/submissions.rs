//! # Submission API
//!
//! Accepts a batch of entries from the authenticated uploader. Entries are
//! decoded, verified and persisted in index order; the first entry that is
//! not accepted rejects the whole batch with its index and nothing is
//! persisted.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use benchseal_core::{ContentEnvelope, VerificationOutcome};
use benchseal_protocol::{
    AcceptedEntry, BatchReceipt, BatchRejection, BatchResult, EntryTally, PipelineError,
    Submission,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, require_non_empty, Validate};
use crate::middleware::metrics::BatchOperation;
use crate::state::AppState;

/// A batch of entries. Each entry is a `revealed` or `commit_only` object
/// tagged by its `variant` field.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitRequest {
    #[schema(value_type = Vec<Object>)]
    pub entries: Vec<serde_json::Value>,
}

impl Validate for SubmitRequest {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("entries", &self.entries)
    }
}

/// Proof of an accepted batch.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionReceipt {
    pub submission_id: Uuid,
    pub uploader_id: String,
    /// Counts per kind (`prompts`, `responses`, `scores`) and per variant
    /// (`revealed`, `commit_only`).
    #[schema(value_type = Object)]
    pub tally: EntryTally,
    /// One line per entry: index, kind, variant, digest, content address and
    /// the registration it referenced, if any.
    #[schema(value_type = Vec<Object>)]
    pub entries: Vec<AcceptedEntry>,
    pub created_at: DateTime<Utc>,
}

impl From<BatchReceipt> for SubmissionReceipt {
    fn from(receipt: BatchReceipt) -> Self {
        Self {
            submission_id: *receipt.submission_id.as_uuid(),
            uploader_id: receipt.uploader_id.to_string(),
            tally: receipt.tally,
            entries: receipt.entries,
            created_at: receipt.created_at,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/submissions", post(submit_batch))
}

/// POST /v1/submissions: Verify and persist a batch.
#[utoipa::path(
    post,
    path = "/v1/submissions",
    request_body = SubmitRequest,
    responses(
        (status = 201, description = "Batch accepted", body = SubmissionReceipt),
        (status = 403, description = "UNAUTHORIZED_REVEAL", body = crate::error::ErrorBody),
        (status = 422, description = "Entry rejected with its outcome and index", body = crate::error::ErrorBody),
    ),
    tag = "submissions"
)]
pub(crate) async fn submit_batch(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmissionReceipt>), AppError> {
    let req = extract_validated_json(body)?;
    let max = state.pipeline.max_entries();
    if req.entries.len() > max {
        return Err(PipelineError::TooManyEntries {
            count: req.entries.len(),
            max,
        }
        .into());
    }

    let entries = match decode_entries(req.entries) {
        Ok(entries) => entries,
        Err(rejection) => {
            tracing::info!(
                uploader = %caller.user_id,
                index = rejection.index,
                outcome = %rejection.outcome,
                detail = %rejection.detail,
                "batch rejected"
            );
            state
                .metrics
                .record_rejected(BatchOperation::Submission, rejection.outcome);
            return Err(rejection.into());
        }
    };

    let submission = Submission {
        uploader: caller.uploader(),
        entries,
    };
    match state.pipeline.ingest(submission).await? {
        BatchResult::Accepted(receipt) => {
            state
                .metrics
                .record_accepted(BatchOperation::Submission, receipt.entries.len());
            Ok((StatusCode::CREATED, Json(receipt.into())))
        }
        BatchResult::Rejected(rejection) => {
            state
                .metrics
                .record_rejected(BatchOperation::Submission, rejection.outcome);
            Err(rejection.into())
        }
    }
}

/// Decode raw entries, reporting the first undecodable one as a malformed
/// payload at its index.
fn decode_entries(raw: Vec<serde_json::Value>) -> Result<Vec<ContentEnvelope>, BatchRejection> {
    raw.into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value(value).map_err(|e| BatchRejection {
                index,
                outcome: VerificationOutcome::MalformedPayload,
                detail: format!("entry {index}: {e}"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_reports_first_bad_index() {
        let raw = vec![
            json!({"variant": "revealed", "kind": "prompt",
                   "payload": {"encoding": "text", "value": "What is 2+2?"}}),
            json!({"variant": "revealed", "kind": "prompt"}),
            json!({"variant": "sealed"}),
        ];
        let rejection = decode_entries(raw).unwrap_err();
        assert_eq!(rejection.index, 1);
        assert_eq!(rejection.outcome, VerificationOutcome::MalformedPayload);
    }

    #[test]
    fn decode_accepts_both_variants() {
        let raw = vec![
            json!({"variant": "revealed", "kind": "response",
                   "payload": {"encoding": "json", "value": {"answer": 4}}}),
            json!({"variant": "commit_only", "kind": "score",
                   "digest": "00", "content_address": "b"}),
        ];
        let entries = decode_entries(raw).unwrap();
        assert!(matches!(entries[0], ContentEnvelope::Revealed(_)));
        assert!(matches!(entries[1], ContentEnvelope::CommitOnly(_)));
    }

    #[test]
    fn empty_entries_fail_validation() {
        let req = SubmitRequest { entries: vec![] };
        assert!(req.validate().unwrap_err().contains("entries"));
    }
}
