//! Candidate retrieval from the external places provider.
//!
//! The room service trusts the returned list as given: it filters and ranks
//! nothing, and the state machine never looks past `Candidate::id`.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ApiError;
use crate::models::candidate::{Candidate, GeoPoint};

const NEARBY_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";
const PHOTO_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place/photo";

/// Source of decision candidates around a coordinate.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn nearby(&self, lat: f64, lng: f64, radius_m: u32) -> Result<Vec<Candidate>, ApiError>;
}

// ---------------------------------------------------------------------------
// Google Places implementation
// ---------------------------------------------------------------------------

pub struct GooglePlaces {
    client: reqwest::Client,
    api_key: String,
}

impl GooglePlaces {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }
}

#[async_trait]
impl CandidateSource for GooglePlaces {
    async fn nearby(&self, lat: f64, lng: f64, radius_m: u32) -> Result<Vec<Candidate>, ApiError> {
        let response = self
            .client
            .get(NEARBY_SEARCH_URL)
            .query(&[
                ("location", format!("{lat},{lng}")),
                ("radius", radius_m.to_string()),
                ("type", "restaurant".to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: NearbySearchResponse = response.json().await?;

        Ok(body
            .results
            .into_iter()
            .map(|place| place.into_candidate(&self.api_key))
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    #[serde(default)]
    results: Vec<PlaceResult>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    place_id: String,
    name: String,
    rating: Option<f64>,
    geometry: Option<PlaceGeometry>,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    photos: Vec<PlacePhoto>,
}

#[derive(Debug, Deserialize)]
struct PlaceGeometry {
    location: Option<GeoPoint>,
}

#[derive(Debug, Deserialize)]
struct PlacePhoto {
    photo_reference: String,
}

impl PlaceResult {
    fn into_candidate(self, api_key: &str) -> Candidate {
        let photo_url = self.photos.first().map(|photo| {
            format!(
                "{PHOTO_BASE_URL}?maxwidth=400&photoreference={}&key={api_key}",
                photo.photo_reference
            )
        });

        Candidate {
            id: self.place_id,
            name: self.name,
            rating: self.rating,
            location: self.geometry.and_then(|g| g.location),
            categories: self.types,
            photo_url,
        }
    }
}

// ---------------------------------------------------------------------------
// Static implementation (for tests)
// ---------------------------------------------------------------------------

/// Fixed candidate list, used in place of the live provider in tests.
pub struct StaticCandidates {
    candidates: Vec<Candidate>,
}

impl StaticCandidates {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }
}

#[async_trait]
impl CandidateSource for StaticCandidates {
    async fn nearby(&self, _lat: f64, _lng: f64, _radius_m: u32) -> Result<Vec<Candidate>, ApiError> {
        Ok(self.candidates.clone())
    }
}
