//! WebSocket message envelope pushed to viewers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::GameSnapshot;

/// Envelope for every message delivered to an attached viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastMessage {
    /// Event-type tag of the triggering event (e.g. `"GOAL_SCORED"`).
    pub message_type: String,
    /// Server-side send timestamp.
    pub timestamp: DateTime<Utc>,
    /// Current game state after the projection update.
    pub snapshot: GameSnapshot,
}

impl BroadcastMessage {
    /// Wraps a snapshot in a timestamped envelope.
    #[must_use]
    pub fn new(message_type: &str, snapshot: GameSnapshot) -> Self {
        Self {
            message_type: message_type.to_string(),
            timestamp: Utc::now(),
            snapshot,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::GameStatus;
    use uuid::Uuid;

    #[test]
    fn envelope_serializes_with_type_and_snapshot() {
        let snapshot = GameSnapshot {
            game_id: Uuid::new_v4(),
            status: GameStatus::Live,
            home_team_id: Uuid::new_v4(),
            away_team_id: Uuid::new_v4(),
            home_score: 1,
            away_score: 0,
            updated_at: Utc::now(),
        };
        let msg = BroadcastMessage::new("GOAL_SCORED", snapshot);
        let json = serde_json::to_string(&msg);
        let Ok(json) = json else {
            panic!("serialization failed");
        };
        assert!(json.contains("GOAL_SCORED"));
        assert!(json.contains("\"status\":\"LIVE\""));
        assert!(json.contains("\"home_score\":1"));
    }
}
