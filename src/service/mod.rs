//! Service layer: the event ingestion pipeline and the standings seam.

pub mod pipeline;
pub mod standings;

pub use pipeline::{EventIngestionPipeline, SubmitRequest};
pub use standings::{LoggingStandingsTrigger, StandingsTrigger};
