//! # Content Address Helper
//!
//! Computes the identifiers a client needs to commit to a payload. Pure:
//! nothing is registered or stored.

use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use benchseal_core::{address_of, Payload};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddressRequest {
    /// `{"encoding": "text" | "json", "value": ...}`
    #[schema(value_type = Object)]
    pub payload: Payload,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddressResponse {
    /// Lowercase hex SHA-256 of the canonical bytes.
    pub digest: String,
    pub content_address: String,
    /// `raw` for text payloads, `json` for JSON payloads.
    pub codec: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/address", post(compute_address))
}

/// POST /v1/address: Compute digest and content address for a payload.
#[utoipa::path(
    post,
    path = "/v1/address",
    request_body = AddressRequest,
    responses(
        (status = 200, description = "Identifiers computed", body = AddressResponse),
        (status = 422, description = "Payload cannot be canonicalized", body = crate::error::ErrorBody),
    ),
    tag = "address"
)]
pub(crate) async fn compute_address(
    body: Result<Json<AddressRequest>, JsonRejection>,
) -> Result<Json<AddressResponse>, AppError> {
    let req = extract_json(body)?;
    let content = address_of(&req.payload).map_err(|e| AppError::Validation(e.to_string()))?;
    Ok(Json(AddressResponse {
        digest: content.digest.to_hex(),
        codec: content.content_address.codec().as_str().to_string(),
        content_address: content.content_address.to_string(),
    }))
}
