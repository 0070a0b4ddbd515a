//! Room endpoints: create, join, swipe, winner selection, and the derived
//! per-participant view.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use rand::Rng;
use serde::Deserialize;
use utoipa::ToSchema;

use platepick_common::id::{prefix, prefixed_ulid};

use crate::auth::middleware::AuthUser;
use crate::error::{ApiError, ApiErrorBody, FieldError};
use crate::gateway::events::EventName;
use crate::matching;
use crate::models::candidate::Candidate;
use crate::models::history::HistoryEntry;
use crate::models::room::{Room, SwipeDecision};
use crate::view::RoomView;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rooms", post(create_room))
        .route("/rooms/{code}", get(get_room))
        .route("/rooms/{code}/join", post(join_room))
        .route("/rooms/{code}/swipes", post(record_swipe))
        .route("/rooms/{code}/winner", post(select_winner))
        .route("/rooms/{code}/view", get(get_view))
}

// ---------------------------------------------------------------------------
// POST /api/v1/rooms
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoomRequest {
    pub candidates: Vec<Candidate>,
}

const ROOM_CODE_LEN: usize = 5;

/// Attempts before giving up on finding a free room code.
const CREATE_ATTEMPTS: usize = 5;

fn generate_room_code() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();
    (0..ROOM_CODE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

#[utoipa::path(
    post,
    path = "/api/v1/rooms",
    tag = "Rooms",
    security(("bearer" = [])),
    request_body = CreateRoomRequest,
    responses(
        (status = 201, description = "Room created", body = Room),
        (status = 400, description = "Bad request", body = ApiErrorBody),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
    ),
)]
pub async fn create_room(
    AuthUser { participant_id }: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<Room>), ApiError> {
    if body.candidates.is_empty() {
        return Err(ApiError::validation(vec![FieldError {
            field: "candidates".to_string(),
            message: "At least one candidate is required".to_string(),
        }]));
    }

    // The create is atomic create-or-fail; on a code collision we retry
    // with a fresh code rather than overwrite.
    for _ in 0..CREATE_ATTEMPTS {
        let room = Room::create(generate_room_code(), &participant_id, body.candidates.clone());
        match state.store.create_room(room).await {
            Ok(room) => {
                tracing::info!(
                    room_code = %room.code,
                    creator = %participant_id,
                    candidates = room.candidates.len(),
                    "room created"
                );
                return Ok((StatusCode::CREATED, Json(room)));
            }
            Err(err) if err.status == StatusCode::CONFLICT => continue,
            Err(err) => return Err(err),
        }
    }

    Err(ApiError::internal("Could not allocate a room code"))
}

// ---------------------------------------------------------------------------
// GET /api/v1/rooms/:code
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/rooms/{code}",
    tag = "Rooms",
    security(("bearer" = [])),
    params(
        ("code" = String, Path, description = "Room code"),
    ),
    responses(
        (status = 200, description = "Room", body = Room),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 404, description = "Not found", body = ApiErrorBody),
    ),
)]
pub async fn get_room(
    AuthUser { .. }: AuthUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Room>, ApiError> {
    let code = Room::normalize_code(&code);

    let room = state
        .store
        .get_room(&code)
        .await?
        .ok_or_else(|| ApiError::not_found("Room not found"))?;

    Ok(Json(room))
}

// ---------------------------------------------------------------------------
// POST /api/v1/rooms/:code/join
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/v1/rooms/{code}/join",
    tag = "Rooms",
    security(("bearer" = [])),
    params(
        ("code" = String, Path, description = "Room code"),
    ),
    responses(
        (status = 200, description = "Joined", body = Room),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 404, description = "Not found", body = ApiErrorBody),
    ),
)]
pub async fn join_room(
    AuthUser { participant_id }: AuthUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Room>, ApiError> {
    let code = Room::normalize_code(&code);

    let room = state.store.add_participant(&code, &participant_id).await?;

    tracing::info!(room_code = %code, participant = %participant_id, "participant joined");
    state.broadcast.dispatch_room(EventName::MEMBER_JOIN, &room);

    Ok(Json(room))
}

// ---------------------------------------------------------------------------
// POST /api/v1/rooms/:code/swipes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct SwipeRequest {
    pub candidate_id: String,
    pub decision: SwipeDecision,
}

#[utoipa::path(
    post,
    path = "/api/v1/rooms/{code}/swipes",
    tag = "Rooms",
    security(("bearer" = [])),
    params(
        ("code" = String, Path, description = "Room code"),
    ),
    request_body = SwipeRequest,
    responses(
        (status = 200, description = "Swipe recorded", body = Room),
        (status = 400, description = "Bad request", body = ApiErrorBody),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
        (status = 404, description = "Not found", body = ApiErrorBody),
    ),
)]
pub async fn record_swipe(
    AuthUser { participant_id }: AuthUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(body): Json<SwipeRequest>,
) -> Result<Json<Room>, ApiError> {
    let code = Room::normalize_code(&code);

    let mut room = state
        .store
        .record_swipe(&code, &participant_id, &body.candidate_id, body.decision)
        .await?;

    state.broadcast.dispatch_room(EventName::SWIPE_RECORD, &room);

    // Incremental match evaluation: only an approve can complete a match,
    // and only for the candidate that was just swiped.
    if body.decision == SwipeDecision::Approve
        && matching::is_match(&room, &body.candidate_id)
        && !room.matches.iter().any(|m| m == &body.candidate_id)
    {
        room = state.store.append_match(&code, &body.candidate_id).await?;
        tracing::info!(room_code = %code, candidate_id = %body.candidate_id, "match created");
        state.broadcast.dispatch_room(EventName::MATCH_CREATE, &room);
    }

    Ok(Json(room))
}

// ---------------------------------------------------------------------------
// POST /api/v1/rooms/:code/winner
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/v1/rooms/{code}/winner",
    tag = "Rooms",
    security(("bearer" = [])),
    params(
        ("code" = String, Path, description = "Room code"),
    ),
    responses(
        (status = 200, description = "Winner committed", body = Room),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 404, description = "Not found", body = ApiErrorBody),
        (status = 412, description = "No matches yet", body = ApiErrorBody),
    ),
)]
pub async fn select_winner(
    AuthUser { participant_id }: AuthUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Room>, ApiError> {
    let code = Room::normalize_code(&code);

    let room = state
        .store
        .get_room(&code)
        .await?
        .ok_or_else(|| ApiError::not_found("Room not found"))?;

    // Terminal field: a late call observes the committed winner.
    if room.winner.is_some() {
        return Ok(Json(room));
    }

    if room.matches.is_empty() {
        return Err(ApiError::precondition_failed(
            "No matches to select a winner from",
        ));
    }

    // Uniform draw over the current match set, independent of candidate
    // order or content.
    let pick = {
        let mut rng = rand::thread_rng();
        room.matches[rng.gen_range(0..room.matches.len())].clone()
    };

    let commit = state.store.commit_winner(&code, &pick).await?;

    if commit.committed {
        tracing::info!(
            room_code = %code,
            winner = %pick,
            selected_by = %participant_id,
            "winner committed"
        );
        state
            .broadcast
            .dispatch_room(EventName::WINNER_SELECT, &commit.room);

        record_history(&state, &participant_id, &commit.room).await;
    }

    Ok(Json(commit.room))
}

/// Write the decided room into the committing participant's history. Fires
/// only on the unset -> set transition; a failure here must not undo an
/// already-committed winner, so it is logged and swallowed.
async fn record_history(state: &AppState, participant_id: &str, room: &Room) {
    if participant_id.is_empty() {
        return;
    }
    let Some(winner_id) = room.winner.as_deref() else {
        return;
    };
    let Some(winner) = room.candidate(winner_id) else {
        return;
    };

    let entry = HistoryEntry {
        id: prefixed_ulid(prefix::HISTORY),
        room_code: room.code.clone(),
        candidate_id: winner.id.clone(),
        name: winner.name.clone(),
        decided_at: chrono::Utc::now(),
    };

    if let Err(err) = state.history.record(participant_id, entry).await {
        tracing::error!(
            code = %err.code,
            room_code = %room.code,
            "failed to record winner history"
        );
    }
}

// ---------------------------------------------------------------------------
// GET /api/v1/rooms/:code/view
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/rooms/{code}/view",
    tag = "Rooms",
    security(("bearer" = [])),
    params(
        ("code" = String, Path, description = "Room code"),
    ),
    responses(
        (status = 200, description = "Per-participant view", body = RoomView),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 404, description = "Not found", body = ApiErrorBody),
    ),
)]
pub async fn get_view(
    AuthUser { participant_id }: AuthUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<RoomView>, ApiError> {
    let code = Room::normalize_code(&code);

    let room = state
        .store
        .get_room(&code)
        .await?
        .ok_or_else(|| ApiError::not_found("Room not found"))?;

    Ok(Json(RoomView::derive(&room, &participant_id)))
}
