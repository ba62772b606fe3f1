//! Domain layer: event identity, the immutable event record, and the
//! mutable game projection with its state machine.

pub mod event;
pub mod event_id;
pub mod game;

pub use event::{EventMetadata, GameEventType, SpatialCoordinates, StoredEvent};
pub use event_id::EventId;
pub use game::{GameSnapshot, GameState, GameStatus, apply};
