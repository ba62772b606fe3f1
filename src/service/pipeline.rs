//! Event ingestion pipeline: the sole write entry point of the core.
//!
//! Orchestrates validator → event store → projection engine → standings
//! trigger → broadcast engine for one submitted event. The event log and
//! the projection store are independently consistent; this pipeline
//! maintains consistency between them by ordering (log-then-project) plus
//! idempotent replay, never by a cross-store transaction. A projection
//! failure after the append leaves the event durable in the log;
//! reconciliation replays un-projected events rather than deleting them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::standings::StandingsTrigger;
use crate::domain::{EventMetadata, GameEventType, SpatialCoordinates, StoredEvent};
use crate::error::CoreError;
use crate::store::{EventStore, ProjectionStore};
use crate::validation;
use crate::ws::BroadcastEngine;

/// One event submission as handed to the pipeline.
///
/// `tenant_id` is deliberately not part of this struct: tenancy comes from
/// the caller's claims, never from the request body.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    /// Target game.
    pub game_id: Uuid,
    /// Wire event type string; must parse into the closed enum.
    pub event_type: String,
    /// Type-specific payload.
    pub payload: serde_json::Value,
    /// When the action occurred; defaults to the server clock.
    pub occurred_at: Option<DateTime<Utc>>,
    /// Optional normalized surface coordinates.
    pub coordinates: Option<SpatialCoordinates>,
    /// Actor/source/IP metadata from the request edge.
    pub metadata: EventMetadata,
    /// Caller-supplied deduplication token.
    pub idempotency_key: Option<String>,
}

/// Orchestrates one submitted event through the full ingest path.
///
/// Stateless coordinator: every `submit` call is an independent unit of
/// work. Calls for different games never contend; calls for the same game
/// serialize only at the projection store's row lock.
#[derive(Debug)]
pub struct EventIngestionPipeline {
    events: Arc<dyn EventStore>,
    projections: Arc<dyn ProjectionStore>,
    standings: Arc<dyn StandingsTrigger>,
    broadcaster: BroadcastEngine,
}

impl EventIngestionPipeline {
    /// Creates a pipeline over the given stores, standings seam, and
    /// broadcast engine.
    #[must_use]
    pub fn new(
        events: Arc<dyn EventStore>,
        projections: Arc<dyn ProjectionStore>,
        standings: Arc<dyn StandingsTrigger>,
        broadcaster: BroadcastEngine,
    ) -> Self {
        Self {
            events,
            projections,
            standings,
            broadcaster,
        }
    }

    /// Returns the event store for read-only query handlers.
    #[must_use]
    pub fn events(&self) -> &Arc<dyn EventStore> {
        &self.events
    }

    /// Returns the projection store for read-only query handlers.
    #[must_use]
    pub fn projections(&self) -> &Arc<dyn ProjectionStore> {
        &self.projections
    }

    /// Submits one event: dedup, validate, append, project, broadcast.
    ///
    /// A replayed idempotency key returns the prior stored event without
    /// re-validating, re-projecting, or re-broadcasting. A caller that
    /// timed out mid-submit must retry with the same key; the append may
    /// already have committed.
    ///
    /// # Errors
    ///
    /// - [`CoreError::UnknownEventType`] / [`CoreError::Validation`]:
    ///   rejected before anything persists.
    /// - [`CoreError::NotFound`]: game absent under the caller's tenant.
    /// - [`CoreError::TerminalState`]: non-administrative event against a
    ///   FINAL/CANCELLED game; nothing persisted.
    /// - [`CoreError::BadRequest`] / [`CoreError::Persistence`] from the
    ///   projection step: the event is already durable in the log and is
    ///   not rolled back.
    pub async fn submit(
        &self,
        tenant_id: Uuid,
        request: SubmitRequest,
    ) -> Result<StoredEvent, CoreError> {
        // 1. Idempotent replay short-circuits the whole pipeline.
        if let Some(key) = request.idempotency_key.as_deref()
            && let Some(prior) = self.events.find_by_idempotency_key(tenant_id, key).await?
        {
            tracing::info!(
                event_id = %prior.event_id,
                %tenant_id,
                idempotency_key = key,
                "idempotent replay, returning stored event"
            );
            return Ok(prior);
        }

        // 2. Validate: unknown type is distinct from payload shape failure.
        let event_type = GameEventType::parse(&request.event_type)
            .ok_or_else(|| CoreError::UnknownEventType(request.event_type.clone()))?;
        validation::validate(event_type, &request.payload)?;
        if let Some(coordinates) = &request.coordinates {
            validation::validate_coordinates(coordinates)?;
        }

        // 3. Terminal-state gate. Also surfaces NotFound (absent game or
        // cross-tenant attempt) before anything is persisted.
        let game = self
            .projections
            .fetch_game(request.game_id, tenant_id)
            .await?;
        if game.status.is_terminal() && !event_type.is_administrative() {
            return Err(CoreError::TerminalState {
                status: game.status.to_string(),
            });
        }

        // 4. Append: the event is durable from here on.
        let occurred_at = request.occurred_at.unwrap_or_else(Utc::now);
        let draft = StoredEvent::new(
            request.game_id,
            tenant_id,
            event_type,
            occurred_at,
            request.payload,
            request.metadata,
            request.idempotency_key,
            request.coordinates,
        );
        let draft_id = draft.event_id;
        let event = self.events.append(draft).await?;
        if event.event_id != draft_id {
            // Lost the narrow check-then-append race to a concurrent
            // submission with the same key. The winner projected and
            // broadcast already; this is a benign duplicate.
            return Ok(event);
        }
        tracing::info!(
            event_id = %event.event_id,
            game_id = %event.game_id,
            %tenant_id,
            event_type = %event_type,
            "event appended"
        );

        // 5. Project. On failure the event stays in the log; recovery is
        // reconciliation from the log, not deletion.
        let projected = match self.projections.apply_event(&event).await {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(
                    event_id = %event.event_id,
                    game_id = %event.game_id,
                    error = %e,
                    "projection failed after durable append"
                );
                return Err(e);
            }
        };

        // 6. Standings on finalization, fire-and-forget.
        if event_type == GameEventType::GameFinalized {
            let standings = Arc::clone(&self.standings);
            let season_id = projected.season_id;
            tokio::spawn(async move {
                standings.game_finalized(tenant_id, season_id).await;
            });
        }

        // 7. Broadcast. Individual connection failures are already
        // absorbed inside the engine; nothing here fails the submission.
        let report = self.broadcaster.broadcast(
            tenant_id,
            event.game_id,
            &projected.snapshot(),
            event_type.as_str(),
        );
        tracing::debug!(
            event_id = %event.event_id,
            delivered = report.delivered,
            pruned = report.pruned,
            "snapshot broadcast"
        );

        Ok(event)
    }
}
