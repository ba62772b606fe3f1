//! REST API layer: route handlers, DTOs, claims extraction, and router
//! composition.
//!
//! All endpoints are mounted under `/api/v1`. Tenancy and actor identity
//! arrive as headers from the external identity layer (`X-Tenant-Id`,
//! `X-User-Id`); the core trusts these values as given and never derives
//! tenancy from request body fields.

pub mod dto;
pub mod handlers;

use axum::Router;
use axum::http::HeaderMap;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::CoreError;

/// OpenAPI document for the REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    paths(
        handlers::events::submit_event,
        handlers::events::list_game_events,
        handlers::events::get_game,
        handlers::events::list_tenant_events,
        handlers::events::event_reversed,
        handlers::system::health_handler,
    ),
    components(schemas(
        dto::SubmitEventRequest,
        dto::EventResponse,
        dto::EventListResponse,
        dto::GameSnapshotResponse,
        dto::ReversedResponse,
        dto::CoordinatesDto,
        dto::MetadataDto,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
    )),
    tags(
        (name = "Events", description = "Event ingestion and the append-only log"),
        (name = "Games", description = "Current game projections"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}

/// Extracts the tenant claim from the identity headers.
///
/// # Errors
///
/// [`CoreError::BadRequest`] when the `X-Tenant-Id` header is missing or
/// not a UUID.
pub fn tenant_from_headers(headers: &HeaderMap) -> Result<Uuid, CoreError> {
    headers
        .get("x-tenant-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| CoreError::BadRequest("missing or invalid X-Tenant-Id header".to_string()))
}

/// Extracts the acting user claim, if present.
#[must_use]
pub fn actor_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

/// Extracts the client address reported by the edge, if present.
#[must_use]
pub fn ip_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn tenant_header_parses() {
        let tenant = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        let Ok(value) = HeaderValue::from_str(&tenant.to_string()) else {
            panic!("header value");
        };
        headers.insert("x-tenant-id", value);
        assert_eq!(tenant_from_headers(&headers).ok(), Some(tenant));
    }

    #[test]
    fn missing_tenant_header_is_bad_request() {
        let headers = HeaderMap::new();
        assert!(matches!(
            tenant_from_headers(&headers),
            Err(CoreError::BadRequest(_))
        ));
    }

    #[test]
    fn malformed_tenant_header_is_bad_request() {
        let mut headers = HeaderMap::new();
        headers.insert("x-tenant-id", HeaderValue::from_static("not-a-uuid"));
        assert!(tenant_from_headers(&headers).is_err());
    }

    #[test]
    fn forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        assert_eq!(
            ip_from_headers(&headers).as_deref(),
            Some("203.0.113.9")
        );
    }
}
