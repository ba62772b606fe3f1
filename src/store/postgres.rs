//! PostgreSQL implementation of the event log and projection store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{EventStore, ProjectionStore, TenantRange};
use crate::domain::{self, EventId, GameState, GameStatus, StoredEvent};
use crate::error::CoreError;

/// Row tuple for `game_events` queries.
type EventRow = (
    Uuid,
    Uuid,
    Uuid,
    String,
    i32,
    DateTime<Utc>,
    String,
    serde_json::Value,
    serde_json::Value,
    Option<String>,
    DateTime<Utc>,
    Option<serde_json::Value>,
);

const EVENT_COLUMNS: &str = "event_id, game_id, tenant_id, event_type, schema_version, \
     occurred_at, ordering_key, payload, metadata, idempotency_key, retention_expiry, coordinates";

/// PostgreSQL-backed append-only event log using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    /// Creates a new event store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn persistence_err(e: sqlx::Error) -> CoreError {
    CoreError::Persistence(e.to_string())
}

fn row_to_event(row: EventRow) -> Result<StoredEvent, CoreError> {
    let (
        event_id,
        game_id,
        tenant_id,
        event_type,
        schema_version,
        occurred_at,
        ordering_key,
        payload,
        metadata,
        idempotency_key,
        retention_expiry,
        coordinates,
    ) = row;

    let event_type = domain::GameEventType::parse(&event_type)
        .ok_or_else(|| CoreError::Persistence(format!("corrupt event_type: {event_type}")))?;
    let metadata = serde_json::from_value(metadata)
        .map_err(|e| CoreError::Persistence(format!("corrupt event metadata: {e}")))?;
    let coordinates = coordinates
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| CoreError::Persistence(format!("corrupt event coordinates: {e}")))?;

    Ok(StoredEvent {
        event_id: EventId::from_uuid(event_id),
        game_id,
        tenant_id,
        event_type,
        schema_version,
        occurred_at,
        ordering_key,
        payload,
        metadata,
        idempotency_key,
        retention_expiry,
        coordinates,
    })
}

#[async_trait]
impl EventStore for PostgresEventStore {
    async fn append(&self, event: StoredEvent) -> Result<StoredEvent, CoreError> {
        let metadata = serde_json::to_value(&event.metadata)
            .map_err(|e| CoreError::Internal(e.to_string()))?;
        let coordinates = match event.coordinates {
            Some(c) => {
                Some(serde_json::to_value(c).map_err(|e| CoreError::Internal(e.to_string()))?)
            }
            None => None,
        };

        let result = sqlx::query(
            "INSERT INTO game_events (event_id, game_id, tenant_id, event_type, schema_version, \
             occurred_at, ordering_key, payload, metadata, idempotency_key, retention_expiry, coordinates) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(*event.event_id.as_uuid())
        .bind(event.game_id)
        .bind(event.tenant_id)
        .bind(event.event_type.as_str())
        .bind(event.schema_version)
        .bind(event.occurred_at)
        .bind(&event.ordering_key)
        .bind(&event.payload)
        .bind(&metadata)
        .bind(&event.idempotency_key)
        .bind(event.retention_expiry)
        .bind(&coordinates)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(event),
            // Two racing submissions with the same idempotency key both
            // passed the pipeline's lookup; the unique index on
            // (tenant_id, idempotency_key) resolves the race and we return
            // the winner's row.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                let Some(key) = event.idempotency_key.as_deref() else {
                    return Err(CoreError::Persistence(db.to_string()));
                };
                tracing::debug!(
                    tenant_id = %event.tenant_id,
                    idempotency_key = key,
                    "append lost idempotency race, returning existing event"
                );
                self.find_by_idempotency_key(event.tenant_id, key)
                    .await?
                    .ok_or_else(|| CoreError::Persistence(db.to_string()))
            }
            Err(e) => Err(persistence_err(e)),
        }
    }

    async fn find_by_idempotency_key(
        &self,
        tenant_id: Uuid,
        key: &str,
    ) -> Result<Option<StoredEvent>, CoreError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM game_events \
             WHERE tenant_id = $1 AND idempotency_key = $2"
        ))
        .bind(tenant_id)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(persistence_err)?;

        row.map(row_to_event).transpose()
    }

    async fn list_by_game(
        &self,
        game_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Vec<StoredEvent>, CoreError> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM game_events \
             WHERE game_id = $1 AND tenant_id = $2 ORDER BY ordering_key ASC"
        ))
        .bind(game_id)
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(persistence_err)?;

        rows.into_iter().map(row_to_event).collect()
    }

    async fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        range: TenantRange,
    ) -> Result<Vec<StoredEvent>, CoreError> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM game_events \
             WHERE tenant_id = $1 \
             AND ($2::timestamptz IS NULL OR occurred_at >= $2) \
             AND ($3::timestamptz IS NULL OR occurred_at <= $3) \
             ORDER BY ordering_key ASC LIMIT $4"
        ))
        .bind(tenant_id)
        .bind(range.start)
        .bind(range.end)
        .bind(range.effective_limit())
        .fetch_all(&self.pool)
        .await
        .map_err(persistence_err)?;

        rows.into_iter().map(row_to_event).collect()
    }

    async fn is_reversed(&self, tenant_id: Uuid, event_id: EventId) -> Result<bool, CoreError> {
        let reversed = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM game_events \
             WHERE tenant_id = $1 AND event_type = 'EVENT_REVERSAL' \
             AND payload->>'reversed_event_id' = $2)",
        )
        .bind(tenant_id)
        .bind(event_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(persistence_err)?;

        Ok(reversed)
    }
}

/// Row tuple for `games` projection queries, joined through season→league.
type GameRow = (
    Uuid,
    Uuid,
    Uuid,
    Uuid,
    String,
    i32,
    i32,
    DateTime<Utc>,
);

const GAME_SELECT: &str = "SELECT g.id, g.season_id, g.home_team_id, g.away_team_id, g.status, \
     g.home_score, g.away_score, g.updated_at \
     FROM games g \
     JOIN seasons s ON s.id = g.season_id \
     JOIN leagues l ON l.id = s.league_id \
     WHERE g.id = $1 AND l.tenant_id = $2";

fn row_to_game(row: GameRow) -> Result<GameState, CoreError> {
    let (id, season_id, home_team_id, away_team_id, status, home_score, away_score, updated_at) =
        row;
    let status = GameStatus::parse(&status)
        .ok_or_else(|| CoreError::Persistence(format!("corrupt game status: {status}")))?;
    Ok(GameState {
        id,
        season_id,
        home_team_id,
        away_team_id,
        status,
        home_score,
        away_score,
        updated_at,
    })
}

/// PostgreSQL-backed projection store.
///
/// `games` carries no tenant column; ownership is established by joining
/// through `seasons` and `leagues` on every read, so a wrong tenant and a
/// missing game are the same `NotFound`.
#[derive(Debug, Clone)]
pub struct PostgresProjectionStore {
    pool: PgPool,
}

impl PostgresProjectionStore {
    /// Creates a new projection store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectionStore for PostgresProjectionStore {
    async fn fetch_game(&self, game_id: Uuid, tenant_id: Uuid) -> Result<GameState, CoreError> {
        let row = sqlx::query_as::<_, GameRow>(GAME_SELECT)
            .bind(game_id)
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence_err)?;

        row.map(row_to_game).transpose()?.ok_or(CoreError::NotFound)
    }

    async fn apply_event(&self, event: &StoredEvent) -> Result<GameState, CoreError> {
        let mut tx = self.pool.begin().await.map_err(persistence_err)?;

        // Concurrent submits for the same game serialize here, on the row
        // lock. Commit order, not occurred_at order, decides application
        // order; the log remains the authoritative ordering.
        let row = sqlx::query_as::<_, GameRow>(&format!("{GAME_SELECT} FOR UPDATE OF g"))
            .bind(event.game_id)
            .bind(event.tenant_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(persistence_err)?;

        let current = row.map(row_to_game).transpose()?.ok_or(CoreError::NotFound)?;
        let next = domain::apply(&current, event)?;

        sqlx::query(
            "UPDATE games SET status = $2, home_score = $3, away_score = $4, updated_at = $5 \
             WHERE id = $1",
        )
        .bind(next.id)
        .bind(next.status.as_str())
        .bind(next.home_score)
        .bind(next.away_score)
        .bind(next.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(persistence_err)?;

        tx.commit().await.map_err(persistence_err)?;
        Ok(next)
    }
}
