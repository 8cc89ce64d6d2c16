//! # Commitment API
//!
//! Registers `(digest, content_address)` pairs under the caller before the
//! content is published, and looks registrations up by content address.
//! Registering content that is already committed returns the existing
//! registration; the first committer keeps ownership.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use benchseal_core::{CommitmentRef, ContentAddress, ContentRef, UploaderId};
use benchseal_protocol::CommitmentResult;
use benchseal_registry::Registration;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, require_non_empty, Validate};
use crate::middleware::metrics::BatchOperation;
use crate::state::AppState;

/// Commitments to register under the caller.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CommitRequest {
    /// `{digest, content_address}` pairs.
    #[schema(value_type = Vec<Object>)]
    pub commitments: Vec<CommitmentRef>,
}

impl Validate for CommitRequest {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("commitments", &self.commitments)
    }
}

/// A registration as seen by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegistrationView {
    pub id: Uuid,
    pub digest: String,
    pub content_address: String,
    pub committer_id: String,
    pub created_at: DateTime<Utc>,
    /// Whether the caller is the committer.
    pub committed_by_caller: bool,
}

impl RegistrationView {
    fn new(registration: &Registration, caller: &UploaderId) -> Self {
        Self {
            id: *registration.id.as_uuid(),
            digest: registration.digest.to_hex(),
            content_address: registration.content_address.to_string(),
            committer_id: registration.committer_id.to_string(),
            created_at: registration.created_at,
            committed_by_caller: &registration.committer_id == caller,
        }
    }
}

/// Registrations in request order.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommitResponse {
    pub registrations: Vec<RegistrationView>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/commitments", post(register_commitments))
        .route("/v1/commitments/:content_address", get(get_commitment))
}

/// POST /v1/commitments: Register commitments under the caller.
#[utoipa::path(
    post,
    path = "/v1/commitments",
    request_body = CommitRequest,
    responses(
        (status = 201, description = "Commitments registered", body = CommitResponse),
        (status = 422, description = "Malformed reference or empty batch", body = crate::error::ErrorBody),
    ),
    tag = "commitments"
)]
pub(crate) async fn register_commitments(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CommitRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CommitResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let uploader = caller.uploader();

    match state
        .pipeline
        .register_commitments(&uploader, &req.commitments)
        .await?
    {
        CommitmentResult::Registered(registrations) => {
            state
                .metrics
                .record_accepted(BatchOperation::Commitments, registrations.len());
            let registrations = registrations
                .iter()
                .map(|r| RegistrationView::new(r, &uploader.id))
                .collect();
            Ok((StatusCode::CREATED, Json(CommitResponse { registrations })))
        }
        CommitmentResult::Rejected(rejection) => {
            state
                .metrics
                .record_rejected(BatchOperation::Commitments, rejection.outcome);
            Err(rejection.into())
        }
    }
}

/// GET /v1/commitments/:content_address: Look up a registration.
#[utoipa::path(
    get,
    path = "/v1/commitments/{content_address}",
    params(("content_address" = String, Path, description = "CIDv1 content address")),
    responses(
        (status = 200, description = "Registration found", body = RegistrationView),
        (status = 404, description = "Not registered", body = crate::error::ErrorBody),
        (status = 422, description = "Not a valid content address", body = crate::error::ErrorBody),
    ),
    tag = "commitments"
)]
pub(crate) async fn get_commitment(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(content_address): Path<String>,
) -> Result<Json<RegistrationView>, AppError> {
    let address = ContentAddress::parse(&content_address)
        .map_err(|e| AppError::Validation(format!("content_address: {e}")))?;
    let content_ref = ContentRef::for_digest(address.codec(), *address.embedded_digest());

    let registration = state
        .pipeline
        .lookup(&content_ref)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no registration for {address}")))?;

    Ok(Json(RegistrationView::new(&registration, &caller.user_id)))
}
