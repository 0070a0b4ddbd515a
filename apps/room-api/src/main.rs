use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use room_api::config::Config;
use room_api::gateway::fanout::RoomBroadcast;
use room_api::history::{HistoryRecorder, MemoryHistory};
use room_api::places::{CandidateSource, GooglePlaces};
use room_api::store::{MemoryRoomStore, RoomStore};
use room_api::AppState;

#[tokio::main]
async fn main() {
    // Load .env file (silently skip if missing — env vars may be set externally)
    if dotenvy::dotenv().is_err() {
        let env_path = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(env_path);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let port = config.port;

    // In-memory stores for single-node deployment. Replace with
    // document-database-backed implementations when one is added.
    let store: Arc<dyn RoomStore> = Arc::new(MemoryRoomStore::new());
    let history: Arc<dyn HistoryRecorder> = Arc::new(MemoryHistory::new());

    let places: Arc<dyn CandidateSource> =
        Arc::new(GooglePlaces::new(config.google_api_key.clone()));

    let broadcast = Arc::new(RoomBroadcast::new());

    tracing::info!(port, places_radius_m = config.places_radius_m, "room-api configured");

    let state = AppState {
        store,
        places,
        history,
        broadcast,
        config: Arc::new(config),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(room_api::routes::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "room-api listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
