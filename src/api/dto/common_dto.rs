//! Shared DTO types used across multiple endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{EventMetadata, SpatialCoordinates};

/// Normalized surface coordinates as submitted and echoed back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct CoordinatesDto {
    /// Horizontal position, 0.0–1.0.
    pub x: f64,
    /// Vertical position, 0.0–1.0.
    pub y: f64,
}

impl From<CoordinatesDto> for SpatialCoordinates {
    fn from(dto: CoordinatesDto) -> Self {
        Self { x: dto.x, y: dto.y }
    }
}

impl From<SpatialCoordinates> for CoordinatesDto {
    fn from(coords: SpatialCoordinates) -> Self {
        Self {
            x: coords.x,
            y: coords.y,
        }
    }
}

/// Actor/source/IP metadata echoed back on stored events.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MetadataDto {
    /// Submitting user or system.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    /// Submission channel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Remote address as reported by the edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

impl From<EventMetadata> for MetadataDto {
    fn from(metadata: EventMetadata) -> Self {
        Self {
            actor: metadata.actor,
            source: metadata.source,
            ip_address: metadata.ip_address,
        }
    }
}

/// Query parameters for the per-tenant range listing.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct RangeParams {
    /// Inclusive lower bound on `occurred_at` (RFC 3339).
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `occurred_at` (RFC 3339).
    pub end: Option<DateTime<Utc>>,
    /// Maximum number of events to return (default 100, max 1000).
    pub limit: Option<i64>,
}
