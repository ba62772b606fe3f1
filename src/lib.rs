//! # rinkside-gateway
//!
//! Multi-tenant live game scoring service: an append-only event log with
//! projection onto current game state and WebSocket fan-out to viewers.
//!
//! Scoring clients submit typed events over REST. Each accepted event is
//! validated, appended to the immutable log, folded into the game's
//! current projection, and broadcast to every viewer attached to that
//! game. Tenancy is enforced on every read and write path.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── EventIngestionPipeline (service/)
//!     ├── BroadcastEngine (ws/)
//!     │
//!     ├── EventStore / ProjectionStore (store/)
//!     │
//!     └── PostgreSQL (or in-memory for development)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod store;
pub mod validation;
pub mod ws;
