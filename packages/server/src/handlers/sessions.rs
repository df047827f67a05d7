use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::ServerMessage;
use common::views::{CheckinView, SessionView};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::{debug, instrument};

use super::{broadcast_stats, find_event, find_event_participant, find_session, record_interaction};
use crate::entity::{session, session_checkin};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::ValidatedJson;
use crate::models::session::*;
use crate::models::shared::{ParticipantAction, normalize_optional};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/{id}/sessions",
    tag = "Sessions",
    operation_id = "listSessions",
    summary = "List an event's sessions",
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Sessions by start time", body = Vec<SessionView>),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_sessions(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<SessionView>>, AppError> {
    find_event(&state.db, id).await?;
    let sessions = event_sessions(id)
        .all(&state.db)
        .await?;
    Ok(Json(sessions.into_iter().map(SessionView::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}/sessions/active",
    tag = "Sessions",
    operation_id = "listActiveSessions",
    summary = "List an event's active sessions",
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Active sessions by start time", body = Vec<SessionView>),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_active_sessions(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<SessionView>>, AppError> {
    find_event(&state.db, id).await?;
    let sessions = event_sessions(id)
        .filter(session::Column::IsActive.eq(true))
        .all(&state.db)
        .await?;
    Ok(Json(sessions.into_iter().map(SessionView::from).collect()))
}

fn event_sessions(event_id: i32) -> Select<session::Entity> {
    session::Entity::find()
        .filter(session::Column::EventId.eq(event_id))
        .order_by_asc(session::Column::StartTime)
        .order_by_asc(session::Column::Id)
}

#[utoipa::path(
    post,
    path = "/{id}/sessions",
    tag = "Sessions",
    operation_id = "createSession",
    summary = "Add a session to an event",
    params(("id" = i32, Path, description = "Event ID")),
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created", body = SessionView),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(title = %payload.title))]
pub async fn create_session(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<CreateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    find_event(&state.db, id).await?;

    let is_active = payload.is_active.unwrap_or(false);
    let new_session = session::ActiveModel {
        event_id: Set(id),
        title: Set(payload.title.trim().to_string()),
        description: Set(normalize_optional(payload.description)),
        speaker: Set(normalize_optional(payload.speaker)),
        room: Set(normalize_optional(payload.room)),
        start_time: Set(payload.start_time),
        end_time: Set(payload.end_time),
        max_capacity: Set(payload.max_capacity),
        is_active: Set(is_active),
        qr_code: Set(normalize_optional(payload.qr_code)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let model = new_session.insert(&state.db).await?;

    if is_active {
        broadcast_stats(&state, id).await;
    }

    Ok((StatusCode::CREATED, Json(SessionView::from(model))))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Sessions",
    operation_id = "updateSession",
    summary = "Update a session",
    description = "Partial update. Toggling `isActive` is how a session is started or stopped. Broadcasts `session_updated`.",
    params(("id" = i32, Path, description = "Session ID")),
    request_body = UpdateSessionRequest,
    responses(
        (status = 200, description = "Session updated", body = SessionView),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Session not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn update_session(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateSessionRequest>,
) -> Result<Json<SessionView>, AppError> {
    if payload.is_empty() {
        return Err(AppError::Validation(
            "At least one field must be provided".into(),
        ));
    }

    let existing = find_session(&state.db, id).await?;
    validate_window(
        payload.start_time.unwrap_or(existing.start_time),
        payload.end_time.unwrap_or(existing.end_time),
    )?;

    let toggled = payload.is_active.is_some_and(|a| a != existing.is_active);
    let mut active: session::ActiveModel = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(normalize_optional(Some(description)));
    }
    if let Some(speaker) = payload.speaker {
        active.speaker = Set(normalize_optional(Some(speaker)));
    }
    if let Some(room) = payload.room {
        active.room = Set(normalize_optional(Some(room)));
    }
    if let Some(start_time) = payload.start_time {
        active.start_time = Set(start_time);
    }
    if let Some(end_time) = payload.end_time {
        active.end_time = Set(end_time);
    }
    if let Some(max_capacity) = payload.max_capacity {
        active.max_capacity = Set(Some(max_capacity));
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }

    let model = active.update(&state.db).await?;
    let event_id = model.event_id;
    let view = SessionView::from(model);

    state.hub.broadcast(
        event_id,
        &ServerMessage::SessionUpdated {
            session: view.clone(),
        },
    );
    if toggled {
        broadcast_stats(&state, event_id).await;
    }

    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/{id}/checkins",
    tag = "Sessions",
    operation_id = "checkIn",
    summary = "Check a participant into a session",
    description = "Idempotent: checking in again returns the existing record with 200 and changes nothing. Broadcasts `checkin` on first check-in.",
    params(("id" = i32, Path, description = "Session ID")),
    request_body = ParticipantAction,
    responses(
        (status = 201, description = "Checked in", body = CheckinView),
        (status = 200, description = "Already checked in", body = CheckinView),
        (status = 400, description = "Participant belongs to another event (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Session or participant not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(participant_id = payload.participant_id))]
pub async fn check_in(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<ParticipantAction>,
) -> Result<impl IntoResponse, AppError> {
    let session = find_session(&state.db, id).await?;
    let participant =
        find_event_participant(&state.db, payload.participant_id, session.event_id).await?;

    let checkin = session_checkin::ActiveModel {
        participant_id: Set(participant.id),
        session_id: Set(session.id),
        checkin_time: Set(chrono::Utc::now()),
        checkout_time: Set(None),
        ..Default::default()
    };
    let result = session_checkin::Entity::insert(checkin)
        .on_conflict(
            OnConflict::columns([
                session_checkin::Column::ParticipantId,
                session_checkin::Column::SessionId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&state.db)
        .await;
    let inserted = match result {
        Ok(rows) => rows > 0,
        Err(DbErr::RecordNotInserted) => false,
        Err(e) => return Err(e.into()),
    };

    let model = session_checkin::Entity::find()
        .filter(session_checkin::Column::ParticipantId.eq(participant.id))
        .filter(session_checkin::Column::SessionId.eq(session.id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Internal("Check-in vanished after insert".into()))?;

    if !inserted {
        debug!(session_id = session.id, participant_id = participant.id, "Already checked in");
        return Ok((StatusCode::OK, Json(CheckinView::from(model))));
    }

    state.hub.broadcast(
        session.event_id,
        &ServerMessage::Checkin {
            session_id: session.id,
            participant_id: participant.id,
        },
    );
    record_interaction(&state, session.event_id, participant.id).await;

    Ok((StatusCode::CREATED, Json(CheckinView::from(model))))
}
