//! Broadcast hub for dispatching room snapshots to connected sessions.
//!
//! Uses a single `tokio::sync::broadcast` channel. Each connected session
//! subscribes and filters events locally by room code. This is efficient
//! for the single-process architecture.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;

use crate::models::room::Room;

/// Capacity of the broadcast channel. Slow receivers that fall behind will
/// skip messages (RecvError::Lagged) and get re-synced from the store.
const BROADCAST_CAPACITY: usize = 4096;

/// A payload broadcast to all connected gateway sessions.
#[derive(Debug, Clone)]
pub struct BroadcastPayload {
    /// The room this event belongs to.
    pub room_code: String,
    /// The dispatch event name (e.g. "SWIPE_RECORD").
    pub event_name: String,
    /// The full serialized room document.
    pub data: Value,
}

/// The global broadcast hub. Cloneable — store in AppState.
#[derive(Clone)]
pub struct RoomBroadcast {
    sender: broadcast::Sender<Arc<BroadcastPayload>>,
}

impl RoomBroadcast {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { sender }
    }

    /// Subscribe to the broadcast channel. Each gateway session should call
    /// this once to get its own receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<BroadcastPayload>> {
        self.sender.subscribe()
    }

    /// Dispatch an event to all connected sessions.
    pub fn dispatch(&self, payload: BroadcastPayload) {
        // send() returns Err if there are no receivers — that's fine.
        let _ = self.sender.send(Arc::new(payload));
    }

    /// Serialize and dispatch a full room snapshot under the given event
    /// name. Called by route handlers after every committed mutation.
    pub fn dispatch_room(&self, event_name: &str, room: &Room) {
        let data = serde_json::to_value(room).unwrap_or(Value::Null);
        self.dispatch(BroadcastPayload {
            room_code: room.code.clone(),
            event_name: event_name.to_string(),
            data,
        });
    }
}

impl Default for RoomBroadcast {
    fn default() -> Self {
        Self::new()
    }
}
