use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::views::{EventView, ParticipantView};
use common::{EventStats, ServerMessage, TopEngager};
use rust_decimal::Decimal;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::{info, instrument};

use super::{broadcast_stats, find_event};
use crate::engagement::{compute_event_stats, rank_top_engagers};
use crate::entity::{active_event, event, participant, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::ValidatedJson;
use crate::models::event::*;
use crate::models::shared::normalize_optional;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Events",
    operation_id = "listEvents",
    summary = "List events",
    description = "Returns all events, most recent start date first.",
    responses(
        (status = 200, description = "List of events", body = Vec<EventView>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<EventView>>, AppError> {
    let events = event::Entity::find()
        .order_by_desc(event::Column::StartDate)
        .order_by_asc(event::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(events.into_iter().map(EventView::from).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Events",
    operation_id = "createEvent",
    summary = "Create an event",
    description = "Creates an inactive event. The organizer must be a user with the `organizer` role.",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventView),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Organizer not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(name = %payload.name))]
pub async fn create_event(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let organizer = user::Entity::find_by_id(payload.organizer_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Organizer not found".into()))?;
    if organizer.role != user::ROLE_ORGANIZER {
        return Err(AppError::Validation(
            "organizerId must refer to a user with the organizer role".into(),
        ));
    }

    let new_event = event::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        description: Set(normalize_optional(payload.description)),
        start_date: Set(payload.start_date),
        end_date: Set(payload.end_date),
        organizer_id: Set(organizer.id),
        is_active: Set(false),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let model = new_event.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(EventView::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Events",
    operation_id = "getEvent",
    summary = "Get an event by ID",
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event details", body = EventView),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EventView>, AppError> {
    Ok(Json(find_event(&state.db, id).await?.into()))
}

#[utoipa::path(
    get,
    path = "/active",
    tag = "Events",
    operation_id = "getActiveEvent",
    summary = "Get the active event",
    description = "Returns the single currently active event.",
    responses(
        (status = 200, description = "The active event", body = EventView),
        (status = 404, description = "No event is active (NOT_FOUND)", body = ErrorBody),
        (status = 503, description = "Store unreachable (STORAGE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_active_event(State(state): State<AppState>) -> Result<Json<EventView>, AppError> {
    let event_id = active_event::Entity::find_by_id(active_event::SLOT_ID)
        .one(&state.db)
        .await?
        .and_then(|slot| slot.event_id)
        .ok_or_else(|| AppError::NotFound("No event is currently active".into()))?;

    let model = event::Entity::find_by_id(event_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No event is currently active".into()))?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/activate",
    tag = "Events",
    operation_id = "activateEvent",
    summary = "Make an event the active one",
    description = "Deactivates whichever event was active and activates this one, atomically. Broadcasts `event_activated`.",
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event activated", body = EventView),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn activate_event(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EventView>, AppError> {
    let txn = state.db.begin().await?;

    let target = find_event(&txn, id).await?;
    // Serializes concurrent activations on the slot row.
    let previous = active_event::Entity::find_by_id(active_event::SLOT_ID)
        .lock_exclusive()
        .one(&txn)
        .await?
        .and_then(|slot| slot.event_id);

    event::Entity::update_many()
        .col_expr(event::Column::IsActive, Expr::value(false))
        .filter(event::Column::IsActive.eq(true))
        .filter(event::Column::Id.ne(id))
        .exec(&txn)
        .await?;

    let mut active: event::ActiveModel = target.into();
    active.is_active = Set(true);
    let model = active.update(&txn).await?;

    let slot = active_event::ActiveModel {
        id: Set(active_event::SLOT_ID),
        event_id: Set(Some(id)),
        updated_at: Set(chrono::Utc::now()),
    };
    active_event::Entity::insert(slot)
        .on_conflict(
            OnConflict::column(active_event::Column::Id)
                .update_columns([
                    active_event::Column::EventId,
                    active_event::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

    txn.commit().await?;

    info!(event_id = id, ?previous, "Event activated");
    state
        .hub
        .broadcast(id, &ServerMessage::EventActivated { event_id: id });

    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/deactivate",
    tag = "Events",
    operation_id = "deactivateEvent",
    summary = "Deactivate an event",
    description = "Clears the active slot if it holds this event. Deactivating an inactive event is a no-op.",
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event deactivated", body = EventView),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn deactivate_event(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EventView>, AppError> {
    let txn = state.db.begin().await?;

    let target = find_event(&txn, id).await?;
    let slot = active_event::Entity::find_by_id(active_event::SLOT_ID)
        .lock_exclusive()
        .one(&txn)
        .await?;

    if let Some(slot) = slot
        && slot.event_id == Some(id)
    {
        let mut slot: active_event::ActiveModel = slot.into();
        slot.event_id = Set(None);
        slot.updated_at = Set(chrono::Utc::now());
        slot.update(&txn).await?;
    }

    let model = if target.is_active {
        let mut active: event::ActiveModel = target.into();
        active.is_active = Set(false);
        active.update(&txn).await?
    } else {
        target
    };

    txn.commit().await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/{id}/stats",
    tag = "Engagement",
    operation_id = "getEventStats",
    summary = "Aggregate statistics for an event",
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event statistics", body = EventStats),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
        (status = 503, description = "Store unreachable (STORAGE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_event_stats(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EventStats>, AppError> {
    let stats = compute_event_stats(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))?;
    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/{id}/top-engagers",
    tag = "Engagement",
    operation_id = "getTopEngagers",
    summary = "Leaderboard of the most engaged participants",
    description = "Participants by descending engagement score, ties broken by ascending participant id.",
    params(("id" = i32, Path, description = "Event ID"), TopEngagersQuery),
    responses(
        (status = 200, description = "Ranked participants", body = Vec<TopEngager>),
        (status = 400, description = "Invalid limit (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn get_top_engagers(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    query: Result<Query<TopEngagersQuery>, QueryRejection>,
) -> Result<Json<Vec<TopEngager>>, AppError> {
    let Query(query) = query.map_err(|e| AppError::Validation(e.body_text()))?;
    let limit = query.resolve_limit()?;

    let ranked = rank_top_engagers(&state.db, id, limit)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))?;
    Ok(Json(ranked))
}

#[utoipa::path(
    get,
    path = "/{id}/participants",
    tag = "Participants",
    operation_id = "listParticipants",
    summary = "List an event's participants",
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Participants in registration order", body = Vec<ParticipantView>),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_participants(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ParticipantView>>, AppError> {
    find_event(&state.db, id).await?;

    let rows = participant::Entity::find()
        .filter(participant::Column::EventId.eq(id))
        .find_also_related(user::Entity)
        .order_by_asc(participant::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(
        rows.into_iter()
            .map(|(p, u)| participant_view(p, u))
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/{id}/participants",
    tag = "Participants",
    operation_id = "registerParticipant",
    summary = "Register a user for an event",
    params(("id" = i32, Path, description = "Event ID")),
    request_body = RegisterParticipantRequest,
    responses(
        (status = 201, description = "Participant registered", body = ParticipantView),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Event or user not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "User already registered (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(user_id = payload.user_id))]
pub async fn register_participant(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<RegisterParticipantRequest>,
) -> Result<impl IntoResponse, AppError> {
    find_event(&state.db, id).await?;
    let usr = user::Entity::find_by_id(payload.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let new_participant = participant::ActiveModel {
        user_id: Set(usr.id),
        event_id: Set(id),
        registered_at: Set(chrono::Utc::now()),
        engagement_score: Set(Decimal::ZERO),
        ..Default::default()
    };
    let model = new_participant
        .insert(&state.db)
        .await
        .map_err(|e| {
            AppError::conflict_on_unique(e, "User is already registered for this event")
        })?;

    broadcast_stats(&state, id).await;

    Ok((
        StatusCode::CREATED,
        Json(participant_view(model, Some(usr))),
    ))
}
