//! Live viewer layer: connection registry, broadcast engine, and the
//! WebSocket attach handler at `/ws/games/{game_id}`.

pub mod broadcast;
pub mod handler;
pub mod messages;
pub mod registry;

pub use broadcast::{BroadcastEngine, BroadcastReport};
pub use messages::BroadcastMessage;
pub use registry::{ConnectionRegistry, ViewerConnection};
