//! The shared room store: atomic leaf updates plus the two monotone
//! operations (match set-union, winner compare-and-set).
//!
//! The room document is never locked end-to-end by callers. Every mutation
//! targets a single leaf of the document, and the two racy writes —
//! appending to `matches` and committing `winner` — are conditional
//! operations here rather than read-modify-write from possibly stale
//! client state.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::ApiError;
use crate::models::room::{Room, RoomStatus, SwipeDecision};

/// Outcome of a winner compare-and-set.
#[derive(Debug)]
pub struct WinnerCommit {
    /// The room after the operation, carrying whichever winner actually
    /// committed.
    pub room: Room,
    /// Whether this call performed the unset -> set transition. Exactly one
    /// caller per room observes `true`.
    pub committed: bool,
}

/// Abstraction over the room document store.
///
/// Backed by a durable document database in production and an in-memory
/// map in tests and single-node deployments.
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Commit a new room as an atomic create-or-fail: a taken code is a
    /// conflict, never a silent overwrite. Collision handling (retrying
    /// with a fresh code) is the caller's responsibility.
    async fn create_room(&self, room: Room) -> Result<Room, ApiError>;

    /// Snapshot of the current room, if it exists.
    async fn get_room(&self, code: &str) -> Result<Option<Room>, ApiError>;

    /// Append a participant to the roster and seed their empty decision
    /// map. A no-op for a participant who already joined.
    async fn add_participant(&self, code: &str, participant_id: &str) -> Result<Room, ApiError>;

    /// Record `swipes[participant][candidate] = decision`, touching only
    /// that leaf. Write-once: an existing decision is left unchanged.
    /// The participant must already be on the roster.
    async fn record_swipe(
        &self,
        code: &str,
        participant_id: &str,
        candidate_id: &str,
        decision: SwipeDecision,
    ) -> Result<Room, ApiError>;

    /// Set-union append to `matches`. Idempotent and commutative under
    /// concurrent duplicate appends.
    async fn append_match(&self, code: &str, candidate_id: &str) -> Result<Room, ApiError>;

    /// Compare-and-set the winner: commits only if `winner` is currently
    /// unset, flipping the room status to decided. A lost race is not an
    /// error — the result reports the winner that actually committed.
    async fn commit_winner(&self, code: &str, candidate_id: &str) -> Result<WinnerCommit, ApiError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

/// Sharded in-memory room store. Each mutation holds its room's shard lock
/// only for the duration of the leaf write, so disjoint updates commute.
pub struct MemoryRoomStore {
    rooms: DashMap<String, Room>,
}

impl MemoryRoomStore {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }
}

impl Default for MemoryRoomStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomStore for MemoryRoomStore {
    async fn create_room(&self, room: Room) -> Result<Room, ApiError> {
        match self.rooms.entry(room.code.clone()) {
            Entry::Occupied(_) => Err(ApiError::conflict("Room code already in use")),
            Entry::Vacant(slot) => {
                slot.insert(room.clone());
                Ok(room)
            }
        }
    }

    async fn get_room(&self, code: &str) -> Result<Option<Room>, ApiError> {
        Ok(self.rooms.get(code).map(|r| r.value().clone()))
    }

    async fn add_participant(&self, code: &str, participant_id: &str) -> Result<Room, ApiError> {
        let mut room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| ApiError::not_found("Room not found"))?;

        if !room.participants.iter().any(|p| p == participant_id) {
            room.participants.push(participant_id.to_string());
        }
        room.swipes.entry(participant_id.to_string()).or_default();

        Ok(room.value().clone())
    }

    async fn record_swipe(
        &self,
        code: &str,
        participant_id: &str,
        candidate_id: &str,
        decision: SwipeDecision,
    ) -> Result<Room, ApiError> {
        let mut room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| ApiError::not_found("Room not found"))?;

        if !room.participants.iter().any(|p| p == participant_id) {
            return Err(ApiError::forbidden("Join the room before swiping"));
        }
        if room.candidate(candidate_id).is_none() {
            return Err(ApiError::bad_request("Unknown candidate"));
        }

        room.swipes
            .entry(participant_id.to_string())
            .or_default()
            .entry(candidate_id.to_string())
            .or_insert(decision);

        Ok(room.value().clone())
    }

    async fn append_match(&self, code: &str, candidate_id: &str) -> Result<Room, ApiError> {
        let mut room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| ApiError::not_found("Room not found"))?;

        if room.candidate(candidate_id).is_none() {
            return Err(ApiError::bad_request("Unknown candidate"));
        }
        if !room.matches.iter().any(|m| m == candidate_id) {
            room.matches.push(candidate_id.to_string());
        }

        Ok(room.value().clone())
    }

    async fn commit_winner(&self, code: &str, candidate_id: &str) -> Result<WinnerCommit, ApiError> {
        let mut room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| ApiError::not_found("Room not found"))?;

        if room.winner.is_some() {
            return Ok(WinnerCommit {
                room: room.value().clone(),
                committed: false,
            });
        }

        // The selector only ever draws from `matches`.
        if !room.matches.iter().any(|m| m == candidate_id) {
            return Err(ApiError::precondition_failed(
                "Winner must be one of the room's matches",
            ));
        }

        room.winner = Some(candidate_id.to_string());
        room.status = RoomStatus::Decided;

        Ok(WinnerCommit {
            room: room.clone(),
            committed: true,
        })
    }
}
