//! Per-connection gateway session state.

use std::sync::atomic::{AtomicU64, Ordering};

/// State for a single WebSocket connection.
pub struct GatewaySession {
    /// Unique session identifier (`gw_` prefixed ULID).
    pub session_id: String,
    /// Participant this connection identifies as (opaque, from IDENTIFY).
    pub participant_id: String,
    /// Room this connection is subscribed to (normalized code).
    pub room_code: String,
    /// Monotonically increasing sequence number for dispatch events.
    seq: AtomicU64,
}

impl GatewaySession {
    pub fn new(session_id: String, participant_id: String, room_code: String) -> Self {
        Self {
            session_id,
            participant_id,
            room_code,
            seq: AtomicU64::new(0),
        }
    }

    /// Get the next sequence number for a dispatch event.
    pub fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Check whether this session should receive events for a given room.
    pub fn is_subscribed(&self, room_code: &str) -> bool {
        self.room_code == room_code
    }
}
