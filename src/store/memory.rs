//! In-memory backend for development mode and the integration tests.
//!
//! Mirrors the PostgreSQL backend's semantics: idempotency-key uniqueness
//! per tenant, ordering-key retrieval order, tenant-joined game lookups,
//! and per-game serialization of projection updates.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{EventStore, ProjectionStore, TenantRange};
use crate::domain::{self, EventId, GameState, StoredEvent};
use crate::error::CoreError;

/// In-memory append-only event log.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    events: Mutex<Vec<StoredEvent>>,
}

impl MemoryEventStore {
    /// Creates an empty event log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn append(&self, event: StoredEvent) -> Result<StoredEvent, CoreError> {
        let mut events = self.events.lock().await;
        // Same uniqueness the Postgres partial index enforces: one event
        // per (tenant_id, idempotency_key), conflict returns the winner.
        if let Some(key) = event.idempotency_key.as_deref()
            && let Some(existing) = events
                .iter()
                .find(|e| e.tenant_id == event.tenant_id && e.idempotency_key.as_deref() == Some(key))
        {
            return Ok(existing.clone());
        }
        events.push(event.clone());
        Ok(event)
    }

    async fn find_by_idempotency_key(
        &self,
        tenant_id: Uuid,
        key: &str,
    ) -> Result<Option<StoredEvent>, CoreError> {
        let events = self.events.lock().await;
        Ok(events
            .iter()
            .find(|e| e.tenant_id == tenant_id && e.idempotency_key.as_deref() == Some(key))
            .cloned())
    }

    async fn list_by_game(
        &self,
        game_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Vec<StoredEvent>, CoreError> {
        let events = self.events.lock().await;
        let mut matched: Vec<StoredEvent> = events
            .iter()
            .filter(|e| e.game_id == game_id && e.tenant_id == tenant_id)
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.ordering_key.cmp(&b.ordering_key));
        Ok(matched)
    }

    async fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        range: TenantRange,
    ) -> Result<Vec<StoredEvent>, CoreError> {
        let events = self.events.lock().await;
        let mut matched: Vec<StoredEvent> = events
            .iter()
            .filter(|e| e.tenant_id == tenant_id)
            .filter(|e| range.start.is_none_or(|start| e.occurred_at >= start))
            .filter(|e| range.end.is_none_or(|end| e.occurred_at <= end))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.ordering_key.cmp(&b.ordering_key));
        matched.truncate(usize::try_from(range.effective_limit()).unwrap_or(usize::MAX));
        Ok(matched)
    }

    async fn is_reversed(&self, tenant_id: Uuid, event_id: EventId) -> Result<bool, CoreError> {
        let target = event_id.to_string();
        let events = self.events.lock().await;
        Ok(events.iter().any(|e| {
            e.tenant_id == tenant_id
                && e.event_type == domain::GameEventType::EventReversal
                && e.payload
                    .get("reversed_event_id")
                    .and_then(|v| v.as_str())
                    .is_some_and(|s| s == target)
        }))
    }
}

/// In-memory projection store.
///
/// Games are seeded with their owning tenant; lookups under any other
/// tenant report [`CoreError::NotFound`], matching the season→league join
/// semantics of the Postgres backend.
#[derive(Debug, Default)]
pub struct MemoryProjectionStore {
    games: Mutex<HashMap<Uuid, (Uuid, GameState)>>,
}

impl MemoryProjectionStore {
    /// Creates an empty projection store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a game under the given tenant.
    pub async fn seed_game(&self, tenant_id: Uuid, game: GameState) {
        let mut games = self.games.lock().await;
        games.insert(game.id, (tenant_id, game));
    }
}

#[async_trait]
impl ProjectionStore for MemoryProjectionStore {
    async fn fetch_game(&self, game_id: Uuid, tenant_id: Uuid) -> Result<GameState, CoreError> {
        let games = self.games.lock().await;
        match games.get(&game_id) {
            Some((owner, game)) if *owner == tenant_id => Ok(game.clone()),
            // Wrong tenant and missing game are indistinguishable.
            _ => Err(CoreError::NotFound),
        }
    }

    async fn apply_event(&self, event: &StoredEvent) -> Result<GameState, CoreError> {
        // One lock across read-apply-write stands in for the row-locked
        // transaction of the Postgres backend.
        let mut games = self.games.lock().await;
        let current = match games.get(&event.game_id) {
            Some((owner, game)) if *owner == event.tenant_id => game.clone(),
            _ => return Err(CoreError::NotFound),
        };
        let next = domain::apply(&current, event)?;
        games.insert(event.game_id, (event.tenant_id, next.clone()));
        Ok(next)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{EventMetadata, GameEventType, GameStatus};
    use chrono::Utc;

    fn make_event(game_id: Uuid, tenant_id: Uuid, key: Option<&str>) -> StoredEvent {
        make_event_at(game_id, tenant_id, key, Utc::now())
    }

    fn make_event_at(
        game_id: Uuid,
        tenant_id: Uuid,
        key: Option<&str>,
        occurred_at: chrono::DateTime<Utc>,
    ) -> StoredEvent {
        StoredEvent::new(
            game_id,
            tenant_id,
            GameEventType::PeriodEnded,
            occurred_at,
            serde_json::json!({"period": 1}),
            EventMetadata::default(),
            key.map(ToString::to_string),
            None,
        )
    }

    #[tokio::test]
    async fn append_enforces_idempotency_uniqueness() {
        let store = MemoryEventStore::new();
        let tenant = Uuid::new_v4();
        let game = Uuid::new_v4();

        let first = make_event(game, tenant, Some("key-1"));
        let Ok(stored) = store.append(first).await else {
            panic!("append failed");
        };
        let Ok(second) = store.append(make_event(game, tenant, Some("key-1"))).await else {
            panic!("append failed");
        };
        assert_eq!(stored.event_id, second.event_id);

        let Ok(all) = store.list_by_game(game, tenant).await else {
            panic!("list failed");
        };
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn same_key_different_tenant_is_independent() {
        let store = MemoryEventStore::new();
        let game = Uuid::new_v4();
        let (tenant_a, tenant_b) = (Uuid::new_v4(), Uuid::new_v4());

        let Ok(a) = store.append(make_event(game, tenant_a, Some("key"))).await else {
            panic!("append failed");
        };
        let Ok(b) = store.append(make_event(game, tenant_b, Some("key"))).await else {
            panic!("append failed");
        };
        assert_ne!(a.event_id, b.event_id);
    }

    #[tokio::test]
    async fn list_by_game_returns_chronological_order_regardless_of_append_order() {
        use chrono::TimeZone;

        let store = MemoryEventStore::new();
        let tenant = Uuid::new_v4();
        let game = Uuid::new_v4();
        let (Some(t1), Some(t2), Some(t3)) = (
            Utc.with_ymd_and_hms(2026, 3, 1, 19, 0, 0).single(),
            Utc.with_ymd_and_hms(2026, 3, 1, 19, 5, 0).single(),
            Utc.with_ymd_and_hms(2026, 3, 1, 19, 10, 0).single(),
        ) else {
            panic!("valid timestamps");
        };

        // Appended latest-first; retrieval order must follow occurred_at.
        for occurred_at in [t3, t1, t2] {
            let Ok(_) = store.append(make_event_at(game, tenant, None, occurred_at)).await else {
                panic!("append failed");
            };
        }

        let Ok(events) = store.list_by_game(game, tenant).await else {
            panic!("list failed");
        };
        let times: Vec<_> = events.iter().map(|e| e.occurred_at).collect();
        assert_eq!(times, vec![t1, t2, t3]);
    }

    #[tokio::test]
    async fn list_by_game_is_tenant_scoped_even_on_game_id_collision() {
        let store = MemoryEventStore::new();
        let game = Uuid::new_v4();
        let (tenant_a, tenant_b) = (Uuid::new_v4(), Uuid::new_v4());

        let Ok(_) = store.append(make_event(game, tenant_a, None)).await else {
            panic!("append failed");
        };
        let Ok(_) = store.append(make_event(game, tenant_a, None)).await else {
            panic!("append failed");
        };
        let Ok(_) = store.append(make_event(game, tenant_b, None)).await else {
            panic!("append failed");
        };

        let Ok(for_a) = store.list_by_game(game, tenant_a).await else {
            panic!("list failed");
        };
        assert_eq!(for_a.len(), 2);
        assert!(for_a.iter().all(|e| e.tenant_id == tenant_a));

        let Ok(for_b) = store.list_by_game(game, tenant_b).await else {
            panic!("list failed");
        };
        assert_eq!(for_b.len(), 1);
        assert!(for_b.iter().all(|e| e.tenant_id == tenant_b));
    }

    #[tokio::test]
    async fn list_by_tenant_respects_bounds_and_limit() {
        let store = MemoryEventStore::new();
        let tenant = Uuid::new_v4();
        let game = Uuid::new_v4();
        for _ in 0..5 {
            let Ok(_) = store.append(make_event(game, tenant, None)).await else {
                panic!("append failed");
            };
        }

        let range = TenantRange {
            limit: Some(3),
            ..TenantRange::default()
        };
        let Ok(page) = store.list_by_tenant(tenant, range).await else {
            panic!("list failed");
        };
        assert_eq!(page.len(), 3);

        let range = TenantRange {
            start: Some(Utc::now() + chrono::Duration::hours(1)),
            ..TenantRange::default()
        };
        let Ok(empty) = store.list_by_tenant(tenant, range).await else {
            panic!("list failed");
        };
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn fetch_game_hides_cross_tenant_rows() {
        let store = MemoryProjectionStore::new();
        let tenant = Uuid::new_v4();
        let game = GameState {
            id: Uuid::new_v4(),
            season_id: Uuid::new_v4(),
            home_team_id: Uuid::new_v4(),
            away_team_id: Uuid::new_v4(),
            status: GameStatus::Scheduled,
            home_score: 0,
            away_score: 0,
            updated_at: Utc::now(),
        };
        store.seed_game(tenant, game.clone()).await;

        assert!(store.fetch_game(game.id, tenant).await.is_ok());
        let other = store.fetch_game(game.id, Uuid::new_v4()).await;
        assert!(matches!(other, Err(CoreError::NotFound)));
    }
}
