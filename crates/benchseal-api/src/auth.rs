//! # Authentication Middleware
//!
//! Bearer token middleware that resolves every `/v1/*` request to an
//! [`Uploader`].
//!
//! ## Token Format
//!
//! ```text
//! Bearer {role}:{user_id}:{secret}   role is contributor | reviewer | admin
//! Bearer {secret}                    legacy form, admin with user id "admin"
//! ```
//!
//! With no configured token, auth is disabled and every caller is
//! `admin` / `anonymous`.
//!
//! ## CallerIdentity
//!
//! Every authenticated request gets a [`CallerIdentity`] injected into the
//! request extensions. Handlers extract it via the `FromRequestParts` impl.

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use benchseal_core::{Role, Uploader, UploaderId};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{AppError, ErrorBody, ErrorDetail};

const LEGACY_USER_ID: &str = "admin";
const ANONYMOUS_USER_ID: &str = "anonymous";

// ── CallerIdentity ──────────────────────────────────────────────────────────

/// Identity of the authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub role: Role,
    pub user_id: UploaderId,
}

impl CallerIdentity {
    fn new(role: Role, user_id: &str) -> Result<Self, String> {
        let user_id = UploaderId::new(user_id).map_err(|e| format!("invalid user_id: {e}"))?;
        Ok(Self { role, user_id })
    }

    /// The opaque uploader handed to the submission pipeline.
    pub fn uploader(&self) -> Uploader {
        Uploader::new(self.user_id.clone(), self.role)
    }
}

#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

// ── Auth Configuration ──────────────────────────────────────────────────────

/// Shared bearer secret, wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretToken(String);

impl SecretToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretToken([REDACTED])")
    }
}

/// Auth configuration injected into request extensions.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub token: Option<SecretToken>,
}

// ── Token Validation ────────────────────────────────────────────────────────

/// Constant-time comparison of bearer secrets. When lengths differ a dummy
/// comparison still runs.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse a bearer token in the form `{role}:{user_id}:{secret}` or `{secret}`.
pub fn parse_bearer_token(provided: &str, expected_secret: &str) -> Result<CallerIdentity, String> {
    let parts: Vec<&str> = provided.splitn(3, ':').collect();

    match parts.as_slice() {
        [secret] => {
            if constant_time_token_eq(secret, expected_secret) {
                CallerIdentity::new(Role::Admin, LEGACY_USER_ID)
            } else {
                Err("invalid bearer token".into())
            }
        }
        [role, user_id, secret] => {
            if !constant_time_token_eq(secret, expected_secret) {
                return Err("invalid bearer token".into());
            }
            let role: Role = role.parse().map_err(|e| format!("{e}"))?;
            CallerIdentity::new(role, user_id)
        }
        _ => Err("invalid token format: expected {role}:{user_id}:{secret} or {secret}".into()),
    }
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Validate the bearer token and inject the caller's [`CallerIdentity`].
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let expected = request
        .extensions()
        .get::<AuthConfig>()
        .and_then(|config| config.token.clone());

    let Some(expected) = expected else {
        let anonymous = CallerIdentity::new(Role::Admin, ANONYMOUS_USER_ID);
        if let Ok(identity) = anonymous {
            request.extensions_mut().insert(identity);
        }
        return next.run(request).await;
    };

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(value) => match value.strip_prefix("Bearer ") {
            Some(provided) => match parse_bearer_token(provided, expected.expose()) {
                Ok(identity) => {
                    request.extensions_mut().insert(identity);
                    next.run(request).await
                }
                Err(msg) => {
                    tracing::warn!(reason = %msg, "authentication failed: invalid bearer token");
                    unauthorized_response(&msg)
                }
            },
            None => {
                tracing::warn!("authentication failed: non-Bearer authorization scheme");
                unauthorized_response("authorization header must use Bearer scheme")
            }
        },
        None => {
            tracing::warn!("authentication failed: missing authorization header");
            unauthorized_response("missing authorization header")
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            details: None,
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    /// Echo the resolved identity as `role/user_id`.
    fn test_app(token: Option<&str>) -> Router {
        let auth_config = AuthConfig {
            token: token.map(SecretToken::new),
        };
        Router::new()
            .route(
                "/whoami",
                get(|caller: CallerIdentity| async move {
                    format!("{}/{}", caller.role, caller.user_id)
                }),
            )
            .layer(from_fn(auth_middleware))
            .layer(axum::Extension(auth_config))
    }

    async fn call(app: Router, authorization: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn role_token_resolves_uploader() {
        let (status, body) = call(test_app(Some("s3cret")), Some("Bearer contributor:alice:s3cret")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "contributor/alice");
    }

    #[tokio::test]
    async fn legacy_token_is_admin() {
        let (status, body) = call(test_app(Some("s3cret")), Some("Bearer s3cret")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "admin/admin");
    }

    #[tokio::test]
    async fn auth_disabled_is_anonymous_admin() {
        let (status, body) = call(test_app(None), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "admin/anonymous");
    }

    #[tokio::test]
    async fn missing_authorization_header_rejected() {
        let (status, body) = call(test_app(Some("s3cret")), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let err: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(err["error"]["code"], "UNAUTHORIZED");
        assert!(err["error"]["message"].as_str().unwrap().contains("missing"));
    }

    #[tokio::test]
    async fn non_bearer_scheme_rejected() {
        let (status, body) = call(test_app(Some("s3cret")), Some("Basic dXNlcjpwYXNz")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Bearer scheme"));
    }

    #[tokio::test]
    async fn wrong_secret_rejected() {
        let (status, _) = call(test_app(Some("s3cret")), Some("Bearer reviewer:bob:guess")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn secret_may_contain_colons() {
        let identity = parse_bearer_token("reviewer:bob:a:b:c", "a:b:c").unwrap();
        assert_eq!(identity.role, Role::Reviewer);
        assert_eq!(identity.user_id.as_str(), "bob");
    }

    #[test]
    fn unknown_role_rejected() {
        let err = parse_bearer_token("owner:bob:s3cret", "s3cret").unwrap_err();
        assert!(err.contains("owner"));
    }

    #[test]
    fn empty_user_id_rejected() {
        let err = parse_bearer_token("contributor::s3cret", "s3cret").unwrap_err();
        assert!(err.contains("user_id"));
    }

    #[test]
    fn two_part_token_rejected() {
        let err = parse_bearer_token("contributor:s3cret", "s3cret").unwrap_err();
        assert!(err.contains("token format"));
    }

    #[test]
    fn constant_time_eq_rejects_prefix_and_empty() {
        assert!(constant_time_token_eq("abc", "abc"));
        assert!(!constant_time_token_eq("ab", "abc"));
        assert!(!constant_time_token_eq("", "abc"));
    }

    #[test]
    fn secret_token_debug_is_redacted() {
        let config = AuthConfig {
            token: Some(SecretToken::new("hunter2")),
        };
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
