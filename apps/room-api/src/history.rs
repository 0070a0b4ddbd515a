//! Per-participant history of decided rooms.
//!
//! Written exactly once per room, on the winner's unset -> set transition.
//! Writes are idempotent: entries are keyed by (room_code, candidate_id)
//! and duplicates are absorbed, so a retried write is harmless.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::ApiError;
use crate::models::history::HistoryEntry;

/// Records winners for later recall.
///
/// Backed by a durable per-user store in production and an in-memory map
/// in tests and single-node deployments.
#[async_trait]
pub trait HistoryRecorder: Send + Sync {
    async fn record(&self, participant_id: &str, entry: HistoryEntry) -> Result<(), ApiError>;
    async fn list(&self, participant_id: &str) -> Result<Vec<HistoryEntry>, ApiError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

pub struct MemoryHistory {
    entries: DashMap<String, Vec<HistoryEntry>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryRecorder for MemoryHistory {
    async fn record(&self, participant_id: &str, entry: HistoryEntry) -> Result<(), ApiError> {
        let mut list = self.entries.entry(participant_id.to_string()).or_default();
        let duplicate = list
            .iter()
            .any(|e| e.room_code == entry.room_code && e.candidate_id == entry.candidate_id);
        if !duplicate {
            list.push(entry);
        }
        Ok(())
    }

    async fn list(&self, participant_id: &str) -> Result<Vec<HistoryEntry>, ApiError> {
        Ok(self
            .entries
            .get(participant_id)
            .map(|v| v.value().clone())
            .unwrap_or_default())
    }
}
