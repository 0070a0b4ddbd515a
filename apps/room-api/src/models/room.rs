use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::candidate::Candidate;

/// A participant's decision on a single candidate. Write-once: the first
/// recorded value for a (participant, candidate) pair never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDecision {
    Approve,
    Reject,
}

/// Room lifecycle status. A room stays `active` until a winner commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Active,
    Decided,
}

/// The shared group-decision document.
///
/// One room per session; all coordination between participants goes through
/// this record. `candidates` is fixed at creation, `participants` and
/// `matches` only grow, `winner` is set at most once.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Room {
    pub code: String,
    pub candidates: Vec<Candidate>,
    pub participants: Vec<String>,
    pub swipes: HashMap<String, HashMap<String, SwipeDecision>>,
    pub matches: Vec<String>,
    pub winner: Option<String>,
    pub status: RoomStatus,
    pub created_at: DateTime<Utc>,
}

impl Room {
    /// Build a fresh room: the creator is the first roster member and gets
    /// an empty decision map.
    pub fn create(code: String, creator_id: &str, candidates: Vec<Candidate>) -> Self {
        let mut swipes = HashMap::new();
        swipes.insert(creator_id.to_string(), HashMap::new());
        Self {
            code,
            candidates,
            participants: vec![creator_id.to_string()],
            swipes,
            matches: Vec::new(),
            winner: None,
            status: RoomStatus::Active,
            created_at: Utc::now(),
        }
    }

    /// Normalize a human-entered room code: codes are shared verbally or
    /// typed, so input is trimmed and uppercased before lookup.
    pub fn normalize_code(input: &str) -> String {
        input.trim().to_ascii_uppercase()
    }

    /// The recorded decision for a (participant, candidate) pair, if any.
    pub fn decision(&self, participant_id: &str, candidate_id: &str) -> Option<SwipeDecision> {
        self.swipes
            .get(participant_id)
            .and_then(|m| m.get(candidate_id))
            .copied()
    }

    /// Look up a candidate by ID.
    pub fn candidate(&self, candidate_id: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == candidate_id)
    }
}
