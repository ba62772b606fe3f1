//! Event submission and query DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::common_dto::{CoordinatesDto, MetadataDto};
use crate::domain::{GameSnapshot, StoredEvent};

/// Request body for `POST /games/{game_id}/events`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubmitEventRequest {
    /// Wire event type (e.g. `"GOAL_SCORED"`).
    pub event_type: String,
    /// Type-specific payload; validated against the closed schema.
    #[serde(default)]
    pub payload: serde_json::Value,
    /// When the action occurred; server clock when omitted.
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
    /// Optional normalized surface coordinates.
    #[serde(default)]
    pub coordinates: Option<CoordinatesDto>,
    /// Deduplication token for safe retries.
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

/// One stored event as returned by write and read endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventResponse {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Game the event belongs to.
    pub game_id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Wire event type.
    pub event_type: String,
    /// Payload schema version.
    pub schema_version: i32,
    /// When the action occurred.
    pub occurred_at: DateTime<Utc>,
    /// Total-order key within game and tenant.
    pub ordering_key: String,
    /// Type-specific payload.
    pub payload: serde_json::Value,
    /// Actor/source/IP metadata.
    pub metadata: MetadataDto,
    /// Deduplication token, if one was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    /// When the event becomes eligible for deletion.
    pub retention_expiry: DateTime<Utc>,
    /// Normalized surface coordinates, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<CoordinatesDto>,
}

impl From<StoredEvent> for EventResponse {
    fn from(event: StoredEvent) -> Self {
        Self {
            event_id: (*event.event_id.as_uuid()),
            game_id: event.game_id,
            tenant_id: event.tenant_id,
            event_type: event.event_type.as_str().to_string(),
            schema_version: event.schema_version,
            occurred_at: event.occurred_at,
            ordering_key: event.ordering_key,
            payload: event.payload,
            metadata: event.metadata.into(),
            idempotency_key: event.idempotency_key,
            retention_expiry: event.retention_expiry,
            coordinates: event.coordinates.map(Into::into),
        }
    }
}

/// Ordered event listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventListResponse {
    /// Events in `ordering_key` order.
    pub data: Vec<EventResponse>,
    /// Number of events returned.
    pub count: usize,
}

impl EventListResponse {
    /// Wraps a list of stored events.
    #[must_use]
    pub fn new(events: Vec<StoredEvent>) -> Self {
        let data: Vec<EventResponse> = events.into_iter().map(Into::into).collect();
        let count = data.len();
        Self { data, count }
    }
}

/// Current projection of one game for `GET /games/{game_id}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameSnapshotResponse {
    /// Game identifier.
    pub game_id: Uuid,
    /// Lifecycle status.
    pub status: String,
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

impl From<GameSnapshot> for GameSnapshotResponse {
    fn from(snapshot: GameSnapshot) -> Self {
        Self {
            game_id: snapshot.game_id,
            status: snapshot.status.as_str().to_string(),
            home_team_id: snapshot.home_team_id,
            away_team_id: snapshot.away_team_id,
            home_score: snapshot.home_score,
            away_score: snapshot.away_score,
            updated_at: snapshot.updated_at,
        }
    }
}

/// Reversal lookup result for `GET /events/{event_id}/reversed`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReversedResponse {
    /// Event that was queried.
    pub event_id: Uuid,
    /// Whether a reversal event referencing it exists.
    pub reversed: bool,
}
