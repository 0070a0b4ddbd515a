use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One past winner in a participant's history.
///
/// Logically keyed by (room_code, candidate_id); the recorder absorbs
/// duplicate writes for the same key.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntry {
    pub id: String,
    pub room_code: String,
    pub candidate_id: String,
    pub name: String,
    pub decided_at: DateTime<Utc>,
}
