//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Protocol rejections carry their outcome as the error code and the failing
//! entry index in `details`. Storage faults become 500 with no internal
//! detail in the body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use benchseal_core::VerificationOutcome;
use benchseal_protocol::{BatchRejection, PipelineError};
use benchseal_registry::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "HASH_MISMATCH").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// For protocol rejections: `{"index": n, "outcome": "<OUTCOME>"}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (422).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid credentials (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// An entry of the batch was not accepted. 403 for an unauthorized
    /// reveal, 422 for every other outcome.
    #[error("{}: {}", .0.outcome, .0.detail)]
    Rejected(BatchRejection),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::UNPROCESSABLE_ENTITY, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Rejected(rejection) => (outcome_status(rejection.outcome), rejection.outcome.as_str()),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Rejected(rejection) => Some(serde_json::json!({
                "index": rejection.index,
                "outcome": rejection.outcome,
            })),
            _ => None,
        }
    }
}

fn outcome_status(outcome: VerificationOutcome) -> StatusCode {
    match outcome {
        VerificationOutcome::UnauthorizedReveal => StatusCode::FORBIDDEN,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::Rejected(rejection) => rejection.detail.clone(),
            other => other.to_string(),
        };

        if let Self::Internal(_) = &self {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<BatchRejection> for AppError {
    fn from(rejection: BatchRejection) -> Self {
        Self::Rejected(rejection)
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::EmptyBatch | PipelineError::TooManyEntries { .. } => {
                Self::Validation(err.to_string())
            }
            PipelineError::Store(e) => e.into(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn rejection(outcome: VerificationOutcome, index: usize) -> AppError {
        AppError::Rejected(BatchRejection {
            index,
            outcome,
            detail: "digest does not match".to_string(),
        })
    }

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[test]
    fn not_found_status_code() {
        let (status, code) = AppError::NotFound("x".into()).status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");
    }

    #[test]
    fn bad_request_is_unprocessable() {
        let (status, code) = AppError::BadRequest("x".into()).status_and_code();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "BAD_REQUEST");
    }

    #[test]
    fn unauthorized_reveal_is_forbidden() {
        let (status, code) =
            rejection(VerificationOutcome::UnauthorizedReveal, 0).status_and_code();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(code, "UNAUTHORIZED_REVEAL");
    }

    #[test]
    fn other_outcomes_are_unprocessable() {
        for outcome in [
            VerificationOutcome::HashMismatch,
            VerificationOutcome::UnknownCommitment,
            VerificationOutcome::InvalidSignature,
            VerificationOutcome::MalformedPayload,
        ] {
            let (status, code) = rejection(outcome, 0).status_and_code();
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{outcome}");
            assert_eq!(code, outcome.as_str());
        }
    }

    #[test]
    fn pipeline_size_errors_are_validation() {
        let err: AppError = PipelineError::EmptyBatch.into();
        assert!(matches!(err, AppError::Validation(_)));
        let err: AppError = PipelineError::TooManyEntries { count: 3, max: 2 }.into();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("maximum is 2")));
    }

    #[test]
    fn store_errors_are_internal() {
        let err: AppError = PipelineError::Store(StoreError::Backend("pool timed out".into())).into();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn rejection_body_carries_index_and_outcome() {
        let (status, body) = response_parts(rejection(VerificationOutcome::HashMismatch, 2)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.error.code, "HASH_MISMATCH");
        assert_eq!(body.error.message, "digest does not match");
        let details = body.error.details.unwrap();
        assert_eq!(details["index"], 2);
        assert_eq!(details["outcome"], "HASH_MISMATCH");
    }

    #[tokio::test]
    async fn into_response_internal_hides_details() {
        let (status, body) =
            response_parts(AppError::Internal("connection refused to 10.0.0.5".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "INTERNAL_ERROR");
        assert!(!body.error.message.contains("10.0.0.5"));
        assert!(body.error.details.is_none());
    }

    #[tokio::test]
    async fn into_response_validation() {
        let (status, body) = response_parts(AppError::Validation("entries is empty".into())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.error.code, "VALIDATION_ERROR");
        assert!(body.error.message.contains("entries is empty"));
    }
}
