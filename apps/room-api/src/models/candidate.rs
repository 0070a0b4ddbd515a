use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Geographic coordinate attached to a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// One decision option within a room.
///
/// Everything except `id` is display payload — the matching logic never
/// inspects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub rating: Option<f64>,
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub photo_url: Option<String>,
}
