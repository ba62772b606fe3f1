//! Mutable game projection: status state machine and pure event application.
//!
//! [`apply`] is a pure function `(GameState, Event) -> GameState` dispatched
//! on the event type tag, independent of storage. The persistence layer
//! wraps only the read-lock-write cycle in a transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::event::{GameEventType, StoredEvent};
use crate::error::CoreError;

/// Game lifecycle status.
///
/// `SCHEDULED → LIVE → {FINAL | CANCELLED}`, plus `SCHEDULED → CANCELLED`
/// directly. `FINAL` and `CANCELLED` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    /// Game has not started.
    Scheduled,
    /// Game is in progress.
    Live,
    /// Game ended normally. Terminal.
    Final,
    /// Game was cancelled. Terminal.
    Cancelled,
}

impl GameStatus {
    /// Returns the wire representation of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "SCHEDULED",
            Self::Live => "LIVE",
            Self::Final => "FINAL",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parses a wire status string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SCHEDULED" => Some(Self::Scheduled),
            "LIVE" => Some(Self::Live),
            "FINAL" => Some(Self::Final),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns `true` once no further gameplay events are acceptable.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Final | Self::Cancelled)
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current-state projection of one game.
///
/// Owned exclusively by the projection engine; every mutation happens
/// inside a transaction keyed by `id` and validated against the tenant via
/// the season→league join (tenancy is not a stored column here).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Game identifier.
    pub id: Uuid,
    /// Season the game belongs to; tenancy is reachable through it.
    pub season_id: Uuid,
    /// Home side.
    pub home_team_id: Uuid,
    /// Away side.
    pub away_team_id: Uuid,
    /// Lifecycle status.
    pub status: GameStatus,
    /// Projected home score.
    pub home_score: i32,
    /// Projected away score.
    pub away_score: i32,
    /// Last projection update.
    pub updated_at: DateTime<Utc>,
}

impl GameState {
    /// Builds the snapshot pushed to live viewers.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            game_id: self.id,
            status: self.status,
            home_team_id: self.home_team_id,
            away_team_id: self.away_team_id,
            home_score: self.home_score,
            away_score: self.away_score,
            updated_at: self.updated_at,
        }
    }
}

/// Serialized current game state sent to viewers after a projection update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Game identifier.
    pub game_id: Uuid,
    /// Lifecycle status.
    pub status: GameStatus,
    /// Home side.
    pub home_team_id: Uuid,
    /// Away side.
    pub away_team_id: Uuid,
    /// Projected home score.
    pub home_score: i32,
    /// Projected away score.
    pub away_score: i32,
    /// Last projection update.
    pub updated_at: DateTime<Utc>,
}

/// Applies one persisted event to a game state, returning the next state.
///
/// Re-applying the same event is idempotent for status transitions
/// (`GAME_STARTED` on a LIVE game is a no-op) but not for score increments;
/// the caller is responsible for not applying the same `GOAL_SCORED` twice.
///
/// # Errors
///
/// [`CoreError::BadRequest`] when a `GOAL_SCORED` payload names a team that
/// is not part of this game, or a payload field the validator guarantees is
/// missing anyway.
pub fn apply(state: &GameState, event: &StoredEvent) -> Result<GameState, CoreError> {
    let mut next = state.clone();
    match event.event_type {
        GameEventType::GoalScored => {
            let team_id = payload_uuid(&event.payload, "team_id")?;
            if team_id == state.home_team_id {
                next.home_score = next.home_score.saturating_add(1);
            } else if team_id == state.away_team_id {
                next.away_score = next.away_score.saturating_add(1);
            } else {
                return Err(CoreError::BadRequest(format!(
                    "team {team_id} is not part of game {}",
                    state.id
                )));
            }
        }
        GameEventType::GameStarted => {
            next.status = GameStatus::Live;
        }
        GameEventType::GameFinalized => {
            next.status = GameStatus::Final;
            next.home_score = payload_score(&event.payload, "final_home_score")?;
            next.away_score = payload_score(&event.payload, "final_away_score")?;
        }
        GameEventType::GameCancelled => {
            next.status = GameStatus::Cancelled;
        }
        // Audit-only events: stored in the log, no projection mutation.
        GameEventType::PenaltyAssessed
        | GameEventType::PeriodEnded
        | GameEventType::ScoreCorrected
        | GameEventType::EventReversal => return Ok(next),
    }
    next.updated_at = Utc::now();
    Ok(next)
}

fn payload_uuid(payload: &serde_json::Value, field: &str) -> Result<Uuid, CoreError> {
    payload
        .get(field)
        .and_then(|v| v.as_str())
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| CoreError::BadRequest(format!("missing or invalid {field}")))
}

fn payload_score(payload: &serde_json::Value, field: &str) -> Result<i32, CoreError> {
    payload
        .get(field)
        .and_then(serde_json::Value::as_i64)
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| CoreError::BadRequest(format!("missing or invalid {field}")))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::event::EventMetadata;

    fn make_game() -> GameState {
        GameState {
            id: Uuid::new_v4(),
            season_id: Uuid::new_v4(),
            home_team_id: Uuid::new_v4(),
            away_team_id: Uuid::new_v4(),
            status: GameStatus::Scheduled,
            home_score: 0,
            away_score: 0,
            updated_at: Utc::now(),
        }
    }

    fn make_event(
        game: &GameState,
        event_type: GameEventType,
        payload: serde_json::Value,
    ) -> StoredEvent {
        StoredEvent::new(
            game.id,
            Uuid::new_v4(),
            event_type,
            Utc::now(),
            payload,
            EventMetadata::default(),
            None,
            None,
        )
    }

    #[test]
    fn game_started_moves_to_live() {
        let game = make_game();
        let event = make_event(&game, GameEventType::GameStarted, serde_json::json!({}));
        let Ok(next) = apply(&game, &event) else {
            panic!("apply failed");
        };
        assert_eq!(next.status, GameStatus::Live);
    }

    #[test]
    fn game_started_is_idempotent_when_already_live() {
        let mut game = make_game();
        game.status = GameStatus::Live;
        let event = make_event(&game, GameEventType::GameStarted, serde_json::json!({}));
        let Ok(next) = apply(&game, &event) else {
            panic!("apply failed");
        };
        assert_eq!(next.status, GameStatus::Live);
    }

    #[test]
    fn home_goal_increments_home_score() {
        let mut game = make_game();
        game.status = GameStatus::Live;
        let payload = serde_json::json!({ "team_id": game.home_team_id.to_string() });
        let event = make_event(&game, GameEventType::GoalScored, payload);

        let Ok(once) = apply(&game, &event) else {
            panic!("apply failed");
        };
        let Ok(twice) = apply(&once, &event) else {
            panic!("apply failed");
        };
        assert_eq!(twice.home_score, 2);
        assert_eq!(twice.away_score, 0);
    }

    #[test]
    fn away_goal_increments_away_score() {
        let mut game = make_game();
        game.status = GameStatus::Live;
        let payload = serde_json::json!({ "team_id": game.away_team_id.to_string() });
        let event = make_event(&game, GameEventType::GoalScored, payload);
        let Ok(next) = apply(&game, &event) else {
            panic!("apply failed");
        };
        assert_eq!((next.home_score, next.away_score), (0, 1));
    }

    #[test]
    fn foreign_team_goal_is_bad_request_and_leaves_scores_unchanged() {
        let mut game = make_game();
        game.status = GameStatus::Live;
        let payload = serde_json::json!({ "team_id": Uuid::new_v4().to_string() });
        let event = make_event(&game, GameEventType::GoalScored, payload);
        let result = apply(&game, &event);
        assert!(matches!(result, Err(CoreError::BadRequest(_))));
        assert_eq!((game.home_score, game.away_score), (0, 0));
    }

    #[test]
    fn finalize_overwrites_projected_scores() {
        let mut game = make_game();
        game.status = GameStatus::Live;
        game.home_score = 2;
        game.away_score = 1;
        let payload = serde_json::json!({ "final_home_score": 3, "final_away_score": 1 });
        let event = make_event(&game, GameEventType::GameFinalized, payload);
        let Ok(next) = apply(&game, &event) else {
            panic!("apply failed");
        };
        assert_eq!(next.status, GameStatus::Final);
        assert_eq!((next.home_score, next.away_score), (3, 1));
    }

    #[test]
    fn started_then_cancelled_ends_cancelled() {
        let game = make_game();
        let start = make_event(&game, GameEventType::GameStarted, serde_json::json!({}));
        let cancel = make_event(&game, GameEventType::GameCancelled, serde_json::json!({}));
        let Ok(live) = apply(&game, &start) else {
            panic!("apply failed");
        };
        let Ok(done) = apply(&live, &cancel) else {
            panic!("apply failed");
        };
        assert_eq!(done.status, GameStatus::Cancelled);
    }

    #[test]
    fn audit_only_events_leave_state_untouched() {
        let mut game = make_game();
        game.status = GameStatus::Live;
        game.home_score = 1;
        for (ty, payload) in [
            (
                GameEventType::PenaltyAssessed,
                serde_json::json!({ "team_id": game.home_team_id.to_string() }),
            ),
            (GameEventType::PeriodEnded, serde_json::json!({"period": 1})),
            (
                GameEventType::ScoreCorrected,
                serde_json::json!({"home_score": 5, "away_score": 5}),
            ),
            (
                GameEventType::EventReversal,
                serde_json::json!({ "reversed_event_id": Uuid::new_v4().to_string() }),
            ),
        ] {
            let event = make_event(&game, ty, payload);
            let Ok(next) = apply(&game, &event) else {
                panic!("apply failed");
            };
            assert_eq!(next.status, game.status);
            assert_eq!(next.home_score, game.home_score);
            assert_eq!(next.away_score, game.away_score);
        }
    }

    #[test]
    fn terminal_statuses() {
        assert!(GameStatus::Final.is_terminal());
        assert!(GameStatus::Cancelled.is_terminal());
        assert!(!GameStatus::Scheduled.is_terminal());
        assert!(!GameStatus::Live.is_terminal());
    }

    #[test]
    fn status_round_trips_through_wire_string() {
        for status in [
            GameStatus::Scheduled,
            GameStatus::Live,
            GameStatus::Final,
            GameStatus::Cancelled,
        ] {
            assert_eq!(GameStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(GameStatus::parse("POSTPONED"), None);
    }
}
