pub mod health;
pub mod history;
pub mod restaurants;
pub mod rooms;

use axum::Router;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(crate::gateway::server::router())
        .nest(
            "/api/v1",
            rooms::router()
                .merge(restaurants::router())
                .merge(history::router()),
        )
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health,
        // Rooms
        rooms::create_room,
        rooms::get_room,
        rooms::join_room,
        rooms::record_swipe,
        rooms::select_winner,
        rooms::get_view,
        // Restaurants
        restaurants::list_restaurants,
        // History
        history::list_history,
    ),
    components(
        schemas(
            // Error types
            crate::error::ApiErrorBody,
            crate::error::ApiErrorDetail,
            crate::error::FieldError,
            // Models
            crate::models::room::Room,
            crate::models::room::RoomStatus,
            crate::models::room::SwipeDecision,
            crate::models::candidate::Candidate,
            crate::models::candidate::GeoPoint,
            crate::models::history::HistoryEntry,
            crate::view::RoomView,
            // Route request/response types
            health::HealthResponse,
            rooms::CreateRoomRequest,
            rooms::SwipeRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Rooms", description = "Room lifecycle, swipes, and winner selection"),
        (name = "Restaurants", description = "Nearby candidate retrieval"),
        (name = "History", description = "Past winners"),
    )
)]
pub struct ApiDoc;
