//! # OpenAPI Document Assembly
//!
//! Assembles all utoipa-documented routes into one OpenAPI document served
//! at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Adds the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "`{role}:{user_id}:{secret}` or the legacy `{secret}`. Set the secret via AUTH_TOKEN.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "benchseal API",
        version = "0.1.0",
        description = "Commit-reveal integrity for benchmark prompts, responses and scores.\n\nCommit a content address before publishing, reveal the payload later, and have every reveal recomputed and checked against the commitment.\n\nAll `/v1/*` endpoints require `Authorization: Bearer <token>`. Health probes and `/metrics` are unauthenticated.",
        license(name = "AGPL-3.0-or-later")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    paths(
        crate::routes::commitments::register_commitments,
        crate::routes::commitments::get_commitment,
        crate::routes::submissions::submit_batch,
        crate::routes::address::compute_address,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::commitments::CommitRequest,
        crate::routes::commitments::CommitResponse,
        crate::routes::commitments::RegistrationView,
        crate::routes::submissions::SubmitRequest,
        crate::routes::submissions::SubmissionReceipt,
        crate::routes::address::AddressRequest,
        crate::routes::address::AddressResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "commitments", description = "Register and look up commitments"),
        (name = "submissions", description = "Verify and persist entry batches"),
        (name = "address", description = "Content addressing helper"),
    )
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
