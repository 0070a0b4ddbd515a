use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum::Router;
use axum_test::TestServer;

use room_api::config::Config;
use room_api::gateway::fanout::RoomBroadcast;
use room_api::history::{HistoryRecorder, MemoryHistory};
use room_api::models::candidate::{Candidate, GeoPoint};
use room_api::places::{CandidateSource, StaticCandidates};
use room_api::store::{MemoryRoomStore, RoomStore};
use room_api::AppState;

/// Candidate fixture used across the suites.
pub fn sample_candidates() -> Vec<Candidate> {
    vec![
        Candidate {
            id: "golden-spoon".to_string(),
            name: "The Golden Spoon".to_string(),
            rating: Some(4.4),
            location: Some(GeoPoint {
                lat: 45.762,
                lng: 21.229,
            }),
            categories: vec!["restaurant".to_string(), "italian".to_string()],
            photo_url: Some("https://example.com/golden-spoon.jpg".to_string()),
        },
        Candidate {
            id: "taqueria-luna".to_string(),
            name: "Taqueria Luna".to_string(),
            rating: Some(4.1),
            location: None,
            categories: vec!["restaurant".to_string(), "mexican".to_string()],
            photo_url: None,
        },
        Candidate {
            id: "sakura-garden".to_string(),
            name: "Sakura Garden".to_string(),
            rating: None,
            location: None,
            categories: vec!["restaurant".to_string(), "japanese".to_string()],
            photo_url: None,
        },
    ]
}

/// Build a test AppState with in-memory stores and a static candidate
/// source.
pub fn test_state() -> AppState {
    let config = Config {
        google_api_key: "test-key".to_string(),
        places_radius_m: 10_000,
        port: 0,
    };

    let store: Arc<dyn RoomStore> = Arc::new(MemoryRoomStore::new());
    let history: Arc<dyn HistoryRecorder> = Arc::new(MemoryHistory::new());
    let places: Arc<dyn CandidateSource> = Arc::new(StaticCandidates::new(sample_candidates()));

    AppState {
        store,
        places,
        history,
        broadcast: Arc::new(RoomBroadcast::new()),
        config: Arc::new(config),
    }
}

/// Build the full application router wired to the test state.
pub fn test_app() -> (Router, AppState) {
    let state = test_state();
    let app = room_api::routes::router().with_state(state.clone());
    (app, state)
}

/// Bearer credential for a participant — the opaque ID is the token.
pub fn bearer(participant_id: &str) -> String {
    format!("Bearer {participant_id}")
}

/// Create a room as `participant_id` and return its code.
pub async fn create_room(server: &TestServer, participant_id: &str) -> String {
    let resp = server
        .post("/api/v1/rooms")
        .add_header(AUTHORIZATION, bearer(participant_id))
        .json(&serde_json::json!({ "candidates": sample_candidates() }))
        .await;
    resp.assert_status(StatusCode::CREATED);
    resp.json::<serde_json::Value>()["code"]
        .as_str()
        .expect("room code present")
        .to_string()
}

/// Join an existing room as `participant_id`.
pub async fn join_room(server: &TestServer, code: &str, participant_id: &str) {
    let resp = server
        .post(&format!("/api/v1/rooms/{code}/join"))
        .add_header(AUTHORIZATION, bearer(participant_id))
        .await;
    resp.assert_status_ok();
}

/// Record a swipe and return the updated room document.
pub async fn swipe(
    server: &TestServer,
    code: &str,
    participant_id: &str,
    candidate_id: &str,
    decision: &str,
) -> serde_json::Value {
    let resp = server
        .post(&format!("/api/v1/rooms/{code}/swipes"))
        .add_header(AUTHORIZATION, bearer(participant_id))
        .json(&serde_json::json!({
            "candidate_id": candidate_id,
            "decision": decision,
        }))
        .await;
    resp.assert_status_ok();
    resp.json()
}
