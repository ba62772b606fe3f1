//! Registry of live viewer connections.
//!
//! Each attached WebSocket viewer is represented by an ephemeral
//! [`ViewerConnection`] holding an unbounded sender into its socket task.
//! Entries are removed explicitly on detach or implicitly by the broadcast
//! engine when a send fails. No durability beyond best effort: a stale
//! entry costs one wasted send attempt and then self-heals.

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Handle used to push serialized messages to one attached viewer.
#[derive(Debug, Clone)]
pub struct ViewerConnection {
    /// Unique connection identifier.
    pub connection_id: Uuid,
    /// Game the viewer is watching.
    pub game_id: Uuid,
    /// Tenant the viewer belongs to.
    pub tenant_id: Uuid,
    /// Channel into the connection's socket task.
    pub tx: mpsc::UnboundedSender<Message>,
}

/// Set of live viewer connections, keyed by connection id.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: DashMap<Uuid, ViewerConnection>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a viewer connection.
    pub fn insert(&self, connection: ViewerConnection) {
        self.connections
            .insert(connection.connection_id, connection);
    }

    /// Removes a connection, returning it if it was present.
    pub fn remove(&self, connection_id: Uuid) -> Option<ViewerConnection> {
        self.connections.remove(&connection_id).map(|(_, c)| c)
    }

    /// All connections watching one game under one tenant.
    #[must_use]
    pub fn list_by_game(&self, game_id: Uuid, tenant_id: Uuid) -> Vec<ViewerConnection> {
        self.connections
            .iter()
            .filter(|entry| entry.game_id == game_id && entry.tenant_id == tenant_id)
            .map(|entry| entry.clone())
            .collect()
    }

    /// Total number of live connections across all games.
    #[must_use]
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Returns `true` if no viewer is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn make_connection(game_id: Uuid, tenant_id: Uuid) -> ViewerConnection {
        let (tx, _rx) = mpsc::unbounded_channel();
        ViewerConnection {
            connection_id: Uuid::new_v4(),
            game_id,
            tenant_id,
            tx,
        }
    }

    #[test]
    fn insert_and_list_by_game() {
        let registry = ConnectionRegistry::new();
        let game = Uuid::new_v4();
        let tenant = Uuid::new_v4();

        registry.insert(make_connection(game, tenant));
        registry.insert(make_connection(game, tenant));
        registry.insert(make_connection(Uuid::new_v4(), tenant));

        assert_eq!(registry.list_by_game(game, tenant).len(), 2);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn list_is_tenant_scoped() {
        let registry = ConnectionRegistry::new();
        let game = Uuid::new_v4();
        let tenant_a = Uuid::new_v4();
        let tenant_b = Uuid::new_v4();

        registry.insert(make_connection(game, tenant_a));
        registry.insert(make_connection(game, tenant_b));

        let for_b = registry.list_by_game(game, tenant_b);
        assert_eq!(for_b.len(), 1);
        assert!(for_b.iter().all(|c| c.tenant_id == tenant_b));
    }

    #[test]
    fn remove_clears_connection() {
        let registry = ConnectionRegistry::new();
        let conn = make_connection(Uuid::new_v4(), Uuid::new_v4());
        let id = conn.connection_id;

        registry.insert(conn);
        assert!(registry.remove(id).is_some());
        assert!(registry.remove(id).is_none());
        assert!(registry.is_empty());
    }
}
