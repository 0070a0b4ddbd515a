//! Pure derivations over the room document: the match predicate and
//! completion state.
//!
//! Nothing here mutates or stores anything — every function is a pure read
//! of a room snapshot, so clients and server evaluate identically.

use crate::models::candidate::Candidate;
use crate::models::room::{Room, SwipeDecision};

/// Minimum roster size for a match. A lone participant approving a
/// candidate is not corroboration.
pub const MIN_ROSTER_FOR_MATCH: usize = 2;

/// A candidate is a match iff every current roster member has `approve`
/// recorded for it and the roster has at least two members.
pub fn is_match(room: &Room, candidate_id: &str) -> bool {
    if room.participants.len() < MIN_ROSTER_FOR_MATCH {
        return false;
    }
    room.participants
        .iter()
        .all(|p| matches!(room.decision(p, candidate_id), Some(SwipeDecision::Approve)))
}

/// True when every roster member has a decision for every candidate.
/// Derived on demand, never stored.
pub fn is_complete(room: &Room) -> bool {
    room.participants
        .iter()
        .all(|p| room.candidates.iter().all(|c| room.decision(p, &c.id).is_some()))
}

/// The first candidate, in room order, the participant has not decided on.
pub fn next_candidate<'a>(room: &'a Room, participant_id: &str) -> Option<&'a Candidate> {
    room.candidates
        .iter()
        .find(|c| room.decision(participant_id, &c.id).is_none())
}

/// Matched candidates, in room candidate order.
pub fn visible_matches(room: &Room) -> Vec<&Candidate> {
    room.candidates
        .iter()
        .filter(|c| room.matches.iter().any(|m| m == &c.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::Candidate;

    fn candidate(id: &str) -> Candidate {
        Candidate {
            id: id.to_string(),
            name: format!("Restaurant {id}"),
            rating: None,
            location: None,
            categories: vec![],
            photo_url: None,
        }
    }

    fn two_person_room() -> Room {
        let mut room = Room::create(
            "AB12C".to_string(),
            "alice",
            vec![candidate("x"), candidate("y")],
        );
        room.participants.push("bob".to_string());
        room.swipes.insert("bob".to_string(), Default::default());
        room
    }

    fn swipe(room: &mut Room, participant: &str, candidate: &str, decision: SwipeDecision) {
        room.swipes
            .get_mut(participant)
            .unwrap()
            .insert(candidate.to_string(), decision);
    }

    #[test]
    fn unanimous_approval_is_a_match() {
        let mut room = two_person_room();
        swipe(&mut room, "alice", "x", SwipeDecision::Approve);
        swipe(&mut room, "bob", "x", SwipeDecision::Approve);
        assert!(is_match(&room, "x"));
    }

    #[test]
    fn one_reject_blocks_the_match() {
        let mut room = two_person_room();
        swipe(&mut room, "alice", "y", SwipeDecision::Approve);
        swipe(&mut room, "bob", "y", SwipeDecision::Reject);
        assert!(!is_match(&room, "y"));
    }

    #[test]
    fn missing_decision_is_not_a_match() {
        let mut room = two_person_room();
        swipe(&mut room, "alice", "x", SwipeDecision::Approve);
        assert!(!is_match(&room, "x"));
    }

    #[test]
    fn solo_roster_never_matches() {
        let mut room = Room::create("AB12C".to_string(), "alice", vec![candidate("x")]);
        swipe(&mut room, "alice", "x", SwipeDecision::Approve);
        assert!(!is_match(&room, "x"));
    }

    #[test]
    fn mixed_scenario_matches_only_unanimous_candidate() {
        // roster [A, B], candidates [x, y]; A approves both, B approves x
        // and rejects y -> only x matches.
        let mut room = two_person_room();
        swipe(&mut room, "alice", "x", SwipeDecision::Approve);
        swipe(&mut room, "alice", "y", SwipeDecision::Approve);
        swipe(&mut room, "bob", "x", SwipeDecision::Approve);
        swipe(&mut room, "bob", "y", SwipeDecision::Reject);
        assert!(is_match(&room, "x"));
        assert!(!is_match(&room, "y"));
        assert!(is_complete(&room));
    }

    #[test]
    fn completion_requires_every_decision() {
        let mut room = two_person_room();
        swipe(&mut room, "alice", "x", SwipeDecision::Approve);
        swipe(&mut room, "alice", "y", SwipeDecision::Reject);
        swipe(&mut room, "bob", "x", SwipeDecision::Approve);
        assert!(!is_complete(&room));
        swipe(&mut room, "bob", "y", SwipeDecision::Approve);
        assert!(is_complete(&room));
    }

    #[test]
    fn next_candidate_follows_room_order() {
        let mut room = two_person_room();
        assert_eq!(next_candidate(&room, "alice").unwrap().id, "x");
        swipe(&mut room, "alice", "x", SwipeDecision::Reject);
        assert_eq!(next_candidate(&room, "alice").unwrap().id, "y");
        swipe(&mut room, "alice", "y", SwipeDecision::Approve);
        assert!(next_candidate(&room, "alice").is_none());
    }

    #[test]
    fn visible_matches_in_candidate_order() {
        let mut room = Room::create(
            "AB12C".to_string(),
            "alice",
            vec![candidate("x"), candidate("y"), candidate("z")],
        );
        // Matches recorded out of order still render in candidate order.
        room.matches = vec!["z".to_string(), "x".to_string()];
        let visible: Vec<&str> = visible_matches(&room).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(visible, vec!["x", "z"]);
    }
}
