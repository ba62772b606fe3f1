//! Broadcast engine: fans a game snapshot out to every attached viewer.
//!
//! The viewer set for a popular game can be large and individually
//! unreliable. One dead connection must never block or fail the broadcast
//! for everyone else, so every delivery is attempted independently and a
//! failed connection is pruned from the registry on the spot.

use std::sync::Arc;

use axum::extract::ws::Message;
use uuid::Uuid;

use super::messages::BroadcastMessage;
use super::registry::ConnectionRegistry;
use crate::domain::GameSnapshot;

/// Outcome of one broadcast call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Connections the message was handed to.
    pub delivered: usize,
    /// Dead connections removed from the registry.
    pub pruned: usize,
}

/// Fans snapshots out to all registered connections for a game.
#[derive(Debug, Clone)]
pub struct BroadcastEngine {
    registry: Arc<ConnectionRegistry>,
}

impl BroadcastEngine {
    /// Creates an engine over the shared connection registry.
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Returns a reference to the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Delivers a `{message_type, timestamp, snapshot}` envelope to every
    /// connection registered for `(game_id, tenant_id)`.
    ///
    /// Zero connections is a successful no-op. Each delivery failure is
    /// absorbed individually and evicts that connection; the call returns
    /// once every attempt has completed.
    pub fn broadcast(
        &self,
        tenant_id: Uuid,
        game_id: Uuid,
        snapshot: &GameSnapshot,
        message_type: &str,
    ) -> BroadcastReport {
        let connections = self.registry.list_by_game(game_id, tenant_id);
        let mut report = BroadcastReport::default();
        if connections.is_empty() {
            return report;
        }

        let envelope = BroadcastMessage::new(message_type, snapshot.clone());
        let json = match serde_json::to_string(&envelope) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(%game_id, error = %e, "snapshot serialization failed, broadcast skipped");
                return report;
            }
        };

        for connection in connections {
            if connection.tx.send(Message::text(json.clone())).is_ok() {
                report.delivered = report.delivered.saturating_add(1);
            } else {
                // Socket task is gone; evict so the entry does not
                // accumulate. Removal is best effort.
                if self.registry.remove(connection.connection_id).is_none() {
                    tracing::warn!(
                        connection_id = %connection.connection_id,
                        "dead connection already removed by another path"
                    );
                }
                report.pruned = report.pruned.saturating_add(1);
                tracing::debug!(
                    connection_id = %connection.connection_id,
                    %game_id,
                    "pruned dead viewer connection"
                );
            }
        }

        report
    }
}
