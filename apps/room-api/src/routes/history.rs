//! Per-participant history of decided rooms.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::auth::middleware::AuthUser;
use crate::error::{ApiError, ApiErrorBody};
use crate::models::history::HistoryEntry;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/history", get(list_history))
}

// ---------------------------------------------------------------------------
// GET /api/v1/history
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/history",
    tag = "History",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Past winners for the caller", body = [HistoryEntry]),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
    ),
)]
pub async fn list_history(
    AuthUser { participant_id }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let entries = state.history.list(&participant_id).await?;
    Ok(Json(entries))
}
