//! Candidate retrieval endpoint — a thin proxy over the places provider.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::middleware::AuthUser;
use crate::error::{ApiError, ApiErrorBody};
use crate::models::candidate::Candidate;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/restaurants", get(list_restaurants))
}

// ---------------------------------------------------------------------------
// GET /api/v1/restaurants
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, IntoParams)]
pub struct NearbyQuery {
    /// Latitude of the search center.
    pub lat: f64,
    /// Longitude of the search center.
    pub lng: f64,
    /// Search radius in meters. Defaults to the configured radius.
    pub radius: Option<u32>,
}

#[utoipa::path(
    get,
    path = "/api/v1/restaurants",
    tag = "Restaurants",
    security(("bearer" = [])),
    params(NearbyQuery),
    responses(
        (status = 200, description = "Nearby candidates", body = [Candidate]),
        (status = 400, description = "Bad request", body = ApiErrorBody),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
    ),
)]
pub async fn list_restaurants(
    AuthUser { .. }: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<Vec<Candidate>>, ApiError> {
    let radius = query.radius.unwrap_or(state.config.places_radius_m);

    let candidates = state.places.nearby(query.lat, query.lng, radius).await?;

    Ok(Json(candidates))
}
