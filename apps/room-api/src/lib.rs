pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod history;
pub mod matching;
pub mod models;
pub mod places;
pub mod routes;
pub mod store;
pub mod view;

use std::sync::Arc;

use config::Config;
use gateway::fanout::RoomBroadcast;
use history::HistoryRecorder;
use places::CandidateSource;
use store::RoomStore;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RoomStore>,
    pub places: Arc<dyn CandidateSource>,
    pub history: Arc<dyn HistoryRecorder>,
    pub broadcast: Arc<RoomBroadcast>,
    pub config: Arc<Config>,
}
