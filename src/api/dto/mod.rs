//! Request and response DTOs for the REST surface.

pub mod common_dto;
pub mod event_dto;

pub use common_dto::{CoordinatesDto, MetadataDto, RangeParams};
pub use event_dto::{
    EventListResponse, EventResponse, GameSnapshotResponse, ReversedResponse, SubmitEventRequest,
};
