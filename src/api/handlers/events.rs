//! Event write and read handlers.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::dto::{
    EventListResponse, EventResponse, GameSnapshotResponse, RangeParams, ReversedResponse,
    SubmitEventRequest,
};
use crate::api::{actor_from_headers, ip_from_headers, tenant_from_headers};
use crate::app_state::AppState;
use crate::domain::{EventId, EventMetadata};
use crate::error::{CoreError, ErrorResponse};
use crate::service::SubmitRequest;
use crate::store::TenantRange;

/// `POST /games/{game_id}/events` — Submit one game event.
///
/// # Errors
///
/// Returns [`CoreError`] per the pipeline contract: validation and
/// terminal-state failures persist nothing; a projection failure is
/// reported although the event is already durable.
#[utoipa::path(
    post,
    path = "/api/v1/games/{game_id}/events",
    tag = "Events",
    summary = "Submit a game event",
    description = "Appends one event to the immutable log, projects it onto the game, and broadcasts the updated snapshot to live viewers. Retries with the same idempotency key return the original event.",
    params(
        ("game_id" = Uuid, Path, description = "Game UUID"),
    ),
    request_body = SubmitEventRequest,
    responses(
        (status = 201, description = "Event stored", body = EventResponse),
        (status = 400, description = "Validation failure or unknown event type", body = ErrorResponse),
        (status = 404, description = "Game not found", body = ErrorResponse),
        (status = 409, description = "Game is in a terminal state", body = ErrorResponse),
    )
)]
pub async fn submit_event(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<SubmitEventRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let tenant_id = tenant_from_headers(&headers)?;
    let metadata = EventMetadata {
        actor: actor_from_headers(&headers),
        source: Some("rest".to_string()),
        ip_address: ip_from_headers(&headers),
    };

    let event = state
        .pipeline
        .submit(
            tenant_id,
            SubmitRequest {
                game_id,
                event_type: request.event_type,
                payload: request.payload,
                occurred_at: request.occurred_at,
                coordinates: request.coordinates.map(Into::into),
                metadata,
                idempotency_key: request.idempotency_key,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(EventResponse::from(event))))
}

/// `GET /games/{game_id}/events` — Ordered event log for one game.
///
/// # Errors
///
/// Returns [`CoreError`] on missing tenant header or storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/games/{game_id}/events",
    tag = "Events",
    summary = "List a game's events",
    description = "Returns all events for the game under the caller's tenant, in ordering-key order.",
    params(
        ("game_id" = Uuid, Path, description = "Game UUID"),
    ),
    responses(
        (status = 200, description = "Ordered event list", body = EventListResponse),
    )
)]
pub async fn list_game_events(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, CoreError> {
    let tenant_id = tenant_from_headers(&headers)?;
    let events = state
        .pipeline
        .events()
        .list_by_game(game_id, tenant_id)
        .await?;
    Ok(Json(EventListResponse::new(events)))
}

/// `GET /games/{game_id}` — Current projection snapshot.
///
/// # Errors
///
/// Returns [`CoreError::NotFound`] for an absent or cross-tenant game.
#[utoipa::path(
    get,
    path = "/api/v1/games/{game_id}",
    tag = "Games",
    summary = "Get the current game state",
    params(
        ("game_id" = Uuid, Path, description = "Game UUID"),
    ),
    responses(
        (status = 200, description = "Current projection", body = GameSnapshotResponse),
        (status = 404, description = "Game not found", body = ErrorResponse),
    )
)]
pub async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, CoreError> {
    let tenant_id = tenant_from_headers(&headers)?;
    let game = state
        .pipeline
        .projections()
        .fetch_game(game_id, tenant_id)
        .await?;
    Ok(Json(GameSnapshotResponse::from(game.snapshot())))
}

/// `GET /events` — Per-tenant range query over the ordering key.
///
/// # Errors
///
/// Returns [`CoreError`] on missing tenant header or storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    summary = "List a tenant's events",
    description = "Audit/export path: events for the caller's tenant in ordering-key order, open-ended on either time bound.",
    params(RangeParams),
    responses(
        (status = 200, description = "Ordered event list", body = EventListResponse),
    )
)]
pub async fn list_tenant_events(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, CoreError> {
    let tenant_id = tenant_from_headers(&headers)?;
    let events = state
        .pipeline
        .events()
        .list_by_tenant(
            tenant_id,
            TenantRange {
                start: params.start,
                end: params.end,
                limit: params.limit,
            },
        )
        .await?;
    Ok(Json(EventListResponse::new(events)))
}

/// `GET /events/{event_id}/reversed` — Reversal lookup.
///
/// # Errors
///
/// Returns [`CoreError`] on missing tenant header or storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/events/{event_id}/reversed",
    tag = "Events",
    summary = "Check whether an event has been reversed",
    params(
        ("event_id" = Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Reversal status", body = ReversedResponse),
    )
)]
pub async fn event_reversed(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, CoreError> {
    let tenant_id = tenant_from_headers(&headers)?;
    let reversed = state
        .pipeline
        .events()
        .is_reversed(tenant_id, EventId::from_uuid(event_id))
        .await?;
    Ok(Json(ReversedResponse { event_id, reversed }))
}

/// Event and game routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/games/{game_id}/events",
            get(list_game_events).post(submit_event),
        )
        .route("/games/{game_id}", get(get_game))
        .route("/events", get(list_tenant_events))
        .route("/events/{event_id}/reversed", get(event_reversed))
}
