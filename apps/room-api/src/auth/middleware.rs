//! Participant identity extraction.
//!
//! Identity provisioning lives outside this service: the identity provider
//! hands each client a stable participant ID before any room call, and the
//! client presents it as a bearer credential. The room service treats the
//! value as an opaque key — no validation beyond presence.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::AppState;

/// Participant extracted from the `Authorization: Bearer <id>` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub participant_id: String,
}

/// Rejection returned when the bearer credential is missing or malformed.
pub struct AuthError {
    message: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": {
                "code": "UNAUTHORIZED",
                "message": self.message
            }
        });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError {
                message: "Missing Authorization header",
            })?;

        let participant_id = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(AuthError {
                message: "Invalid Authorization header format",
            })?;

        Ok(AuthUser {
            participant_id: participant_id.to_string(),
        })
    }
}
