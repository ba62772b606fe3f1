//! Shared application state threaded through the router.

use std::sync::Arc;

use crate::service::EventIngestionPipeline;
use crate::ws::ConnectionRegistry;

/// State handed to every handler.
///
/// Cloning is cheap; all fields are reference-counted.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Event ingestion pipeline (append, project, broadcast).
    pub pipeline: Arc<EventIngestionPipeline>,
    /// Live viewer connection registry.
    pub registry: Arc<ConnectionRegistry>,
}
