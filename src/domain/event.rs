//! Immutable game events: the closed type enum and the stored record.
//!
//! Events are append-only. A stored event is never mutated; it is logically
//! undone only by appending an `EVENT_REVERSAL` event whose payload
//! references the original [`EventId`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EventId;

/// Fixed retention window applied to every event at write time. Deletion
/// after expiry is owned by a separate process, not this crate.
pub const RETENTION_DAYS: i64 = 90;

/// Current payload schema version stamped on newly written events.
pub const SCHEMA_VERSION: i32 = 1;

/// Closed enum of recordable game actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameEventType {
    /// Game transitioned from SCHEDULED to LIVE.
    GameStarted,
    /// A team scored a goal.
    GoalScored,
    /// A penalty was assessed against a player.
    PenaltyAssessed,
    /// A period of play ended.
    PeriodEnded,
    /// Game ended; final scores are authoritative in the payload.
    GameFinalized,
    /// Game was cancelled.
    GameCancelled,
    /// Administrative score correction (audit-only in the projection).
    ScoreCorrected,
    /// Additive reversal of a prior event.
    EventReversal,
}

impl GameEventType {
    /// Returns the wire representation of this event type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GameStarted => "GAME_STARTED",
            Self::GoalScored => "GOAL_SCORED",
            Self::PenaltyAssessed => "PENALTY_ASSESSED",
            Self::PeriodEnded => "PERIOD_ENDED",
            Self::GameFinalized => "GAME_FINALIZED",
            Self::GameCancelled => "GAME_CANCELLED",
            Self::ScoreCorrected => "SCORE_CORRECTED",
            Self::EventReversal => "EVENT_REVERSAL",
        }
    }

    /// Parses a wire string into an event type. `None` for anything outside
    /// the closed enum.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GAME_STARTED" => Some(Self::GameStarted),
            "GOAL_SCORED" => Some(Self::GoalScored),
            "PENALTY_ASSESSED" => Some(Self::PenaltyAssessed),
            "PERIOD_ENDED" => Some(Self::PeriodEnded),
            "GAME_FINALIZED" => Some(Self::GameFinalized),
            "GAME_CANCELLED" => Some(Self::GameCancelled),
            "SCORE_CORRECTED" => Some(Self::ScoreCorrected),
            "EVENT_REVERSAL" => Some(Self::EventReversal),
            _ => None,
        }
    }

    /// Administrative corrections remain submittable against games in a
    /// terminal state.
    #[must_use]
    pub const fn is_administrative(&self) -> bool {
        matches!(self, Self::ScoreCorrected | Self::EventReversal)
    }
}

impl std::fmt::Display for GameEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actor/source/IP metadata captured alongside every event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Identifier of the user or system that submitted the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    /// Submission channel (e.g. `"rest"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Remote address as reported by the edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

/// Normalized on-surface coordinates attached to some events.
///
/// Both axes are fractions of the playing surface in `[0.0, 1.0]`,
/// validated independently of the per-type payload schema.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpatialCoordinates {
    /// Horizontal position, 0.0–1.0.
    pub x: f64,
    /// Vertical position, 0.0–1.0.
    pub y: f64,
}

/// An immutable event as written to the log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Unique identifier, generated at write time.
    pub event_id: EventId,
    /// Game this event belongs to.
    pub game_id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Closed event type tag.
    pub event_type: GameEventType,
    /// Payload schema version.
    pub schema_version: i32,
    /// When the action occurred (caller- or server-assigned).
    pub occurred_at: DateTime<Utc>,
    /// `occurred_at` concatenated with `event_id`; totally orders events
    /// even for identical timestamps.
    pub ordering_key: String,
    /// Type-specific structured payload.
    pub payload: serde_json::Value,
    /// Actor/source/IP metadata.
    pub metadata: EventMetadata,
    /// Caller-supplied deduplication token.
    pub idempotency_key: Option<String>,
    /// Write time plus the fixed retention window.
    pub retention_expiry: DateTime<Utc>,
    /// Optional normalized surface coordinates.
    pub coordinates: Option<SpatialCoordinates>,
}

impl StoredEvent {
    /// Builds a new event record, computing its identity, ordering key, and
    /// retention expiry from the write time.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        game_id: Uuid,
        tenant_id: Uuid,
        event_type: GameEventType,
        occurred_at: DateTime<Utc>,
        payload: serde_json::Value,
        metadata: EventMetadata,
        idempotency_key: Option<String>,
        coordinates: Option<SpatialCoordinates>,
    ) -> Self {
        let event_id = EventId::new();
        let ordering_key = ordering_key(occurred_at, event_id);
        Self {
            event_id,
            game_id,
            tenant_id,
            event_type,
            schema_version: SCHEMA_VERSION,
            occurred_at,
            ordering_key,
            payload,
            metadata,
            idempotency_key,
            retention_expiry: Utc::now() + Duration::days(RETENTION_DAYS),
            coordinates,
        }
    }
}

/// Derives the lexicographically sortable ordering key for an event.
///
/// Fixed-width UTC timestamp (microsecond precision) followed by the event
/// id, so two events with the same timestamp still order deterministically.
#[must_use]
pub fn ordering_key(occurred_at: DateTime<Utc>, event_id: EventId) -> String {
    format!(
        "{}#{event_id}",
        occurred_at.format("%Y-%m-%dT%H:%M:%S%.6fZ")
    )
}
