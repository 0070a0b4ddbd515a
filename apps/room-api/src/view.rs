//! Per-participant read model derived from the latest room snapshot.

use serde::Serialize;
use utoipa::ToSchema;

use crate::matching;
use crate::models::candidate::Candidate;
use crate::models::room::{Room, RoomStatus};

/// What one participant's client renders: the next card to swipe, the
/// current match list, and the completion/winner state.
///
/// Recomputed in full from the latest snapshot on every request or push —
/// it holds no state of its own that could drift from the room.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomView {
    pub room_code: String,
    pub status: RoomStatus,
    pub next_candidate: Option<Candidate>,
    pub is_complete: bool,
    pub matches: Vec<Candidate>,
    pub winner: Option<Candidate>,
}

impl RoomView {
    pub fn derive(room: &Room, participant_id: &str) -> Self {
        let winner = room
            .winner
            .as_deref()
            .and_then(|id| room.candidate(id))
            .cloned();

        Self {
            room_code: room.code.clone(),
            status: room.status,
            next_candidate: matching::next_candidate(room, participant_id).cloned(),
            is_complete: matching::is_complete(room),
            matches: matching::visible_matches(room).into_iter().cloned().collect(),
            winner,
        }
    }
}
