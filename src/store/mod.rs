//! Storage layer: the append-only event log and the game projection store.
//!
//! Both stores are object-safe async traits so the binary can select a
//! backend at runtime (PostgreSQL in production, in-memory for development
//! and the integration tests). The two stores are independently consistent
//! systems; there is no cross-store transaction. Consistency between them
//! is maintained by pipeline ordering (log-then-project) plus idempotent
//! replay, not by distributed transactions.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{EventId, GameState, StoredEvent};
use crate::error::CoreError;

pub use memory::{MemoryEventStore, MemoryProjectionStore};
pub use postgres::{PostgresEventStore, PostgresProjectionStore};

/// Default page size for per-tenant range queries.
pub const DEFAULT_LIST_LIMIT: i64 = 100;

/// Hard cap on per-tenant range query page size.
pub const MAX_LIST_LIMIT: i64 = 1_000;

/// Open-ended time range for per-tenant queries over the ordering key.
#[derive(Debug, Clone, Copy, Default)]
pub struct TenantRange {
    /// Inclusive lower bound on `occurred_at`.
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `occurred_at`.
    pub end: Option<DateTime<Utc>>,
    /// Maximum number of events to return; clamped to [`MAX_LIST_LIMIT`].
    pub limit: Option<i64>,
}

impl TenantRange {
    /// Effective page size after defaulting and clamping.
    #[must_use]
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT)
    }
}

/// Append-only event log.
///
/// `append` must be safe to call concurrently for different games with no
/// cross-game coordination. Events are retrievable in `ordering_key` order
/// both per game and per tenant.
#[async_trait]
pub trait EventStore: Send + Sync + std::fmt::Debug {
    /// Writes one event durably. If the event carries an idempotency key
    /// that already exists for the tenant, the previously stored event is
    /// returned instead (uniqueness enforced at the store level).
    async fn append(&self, event: StoredEvent) -> Result<StoredEvent, CoreError>;

    /// Looks up a prior event by `(tenant_id, idempotency_key)`.
    async fn find_by_idempotency_key(
        &self,
        tenant_id: Uuid,
        key: &str,
    ) -> Result<Option<StoredEvent>, CoreError>;

    /// All events for one game in `ordering_key` order, restricted to the
    /// caller's tenant.
    async fn list_by_game(
        &self,
        game_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Vec<StoredEvent>, CoreError>;

    /// Per-tenant range query in `ordering_key` order, open-ended on either
    /// bound. Audit/export path.
    async fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        range: TenantRange,
    ) -> Result<Vec<StoredEvent>, CoreError>;

    /// `true` iff an `EVENT_REVERSAL` event exists whose payload references
    /// `event_id`.
    async fn is_reversed(&self, tenant_id: Uuid, event_id: EventId) -> Result<bool, CoreError>;
}

/// Mutable "current game" projection store.
///
/// Tenant ownership is validated through the season→league join on every
/// access; a game that exists under a different tenant is reported as
/// [`CoreError::NotFound`], indistinguishable from absence.
#[async_trait]
pub trait ProjectionStore: Send + Sync + std::fmt::Debug {
    /// Reads the current projection of a game under the caller's tenant.
    async fn fetch_game(&self, game_id: Uuid, tenant_id: Uuid) -> Result<GameState, CoreError>;

    /// Applies one persisted event to its game inside a transaction that
    /// row-locks the game, returning the post-projection state. Any failure
    /// rolls the projection back; the event log is unaffected either way.
    async fn apply_event(&self, event: &StoredEvent) -> Result<GameState, CoreError>;
}
