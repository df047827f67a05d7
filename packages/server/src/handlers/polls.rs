use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::views::PollView;
use common::{PollTally, ServerMessage};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::{info, instrument, warn};

use super::{find_event_participant, find_session, record_interaction};
use crate::engagement::tally_poll_results;
use crate::entity::{poll, poll_response, session};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::ValidatedJson;
use crate::models::poll::*;
use crate::state::AppState;

/// Tally a poll and push it to the event as `poll_ended` or `poll_results`.
async fn broadcast_tally(
    state: &AppState,
    event_id: i32,
    poll_id: i32,
    ended: bool,
) -> Option<PollTally> {
    let results = match tally_poll_results(&state.db, poll_id).await {
        Ok(Some(results)) => results,
        Ok(None) => return None,
        Err(e) => {
            warn!(poll_id, error = %e, "Failed to tally poll for broadcast");
            return None;
        }
    };
    let message = if ended {
        ServerMessage::PollEnded {
            poll_id,
            results: results.clone(),
        }
    } else {
        ServerMessage::PollResults {
            poll_id,
            results: results.clone(),
        }
    };
    state.hub.broadcast(event_id, &message);
    Some(results)
}

#[utoipa::path(
    get,
    path = "/{id}/polls",
    tag = "Polls",
    operation_id = "listPolls",
    summary = "List a session's polls",
    params(("id" = i32, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Polls, newest first", body = Vec<PollView>),
        (status = 404, description = "Session not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_polls(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<PollView>>, AppError> {
    find_session(&state.db, id).await?;
    let polls = poll::Entity::find()
        .filter(poll::Column::SessionId.eq(id))
        .order_by_desc(poll::Column::CreatedAt)
        .order_by_desc(poll::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(polls.into_iter().map(PollView::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}/polls/active",
    tag = "Polls",
    operation_id = "getActivePoll",
    summary = "Get a session's active poll",
    params(("id" = i32, Path, description = "Session ID")),
    responses(
        (status = 200, description = "The active poll", body = PollView),
        (status = 404, description = "Session not found or no active poll (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_active_poll(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PollView>, AppError> {
    find_session(&state.db, id).await?;
    let model = poll::Entity::find()
        .filter(poll::Column::SessionId.eq(id))
        .filter(poll::Column::IsActive.eq(true))
        .order_by_desc(poll::Column::CreatedAt)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Session has no active poll".into()))?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/polls",
    tag = "Polls",
    operation_id = "createPoll",
    summary = "Open a poll in a session",
    description = "Creates an active poll. A session has at most one active poll: any previous one is ended in the same transaction and `poll_ended` is broadcast for it before `poll_created`.",
    params(("id" = i32, Path, description = "Session ID")),
    request_body = CreatePollRequest,
    responses(
        (status = 201, description = "Poll created", body = PollView),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Session not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn create_poll(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<CreatePollRequest>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;

    // Locking the session serializes poll creation within it.
    let session = session::Entity::find_by_id(id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Session not found".into()))?;

    let ended_ids: Vec<i32> = poll::Entity::find()
        .select_only()
        .column(poll::Column::Id)
        .filter(poll::Column::SessionId.eq(id))
        .filter(poll::Column::IsActive.eq(true))
        .lock_exclusive()
        .into_tuple()
        .all(&txn)
        .await?;

    let now = chrono::Utc::now();
    if !ended_ids.is_empty() {
        poll::Entity::update_many()
            .col_expr(poll::Column::IsActive, Expr::value(false))
            .col_expr(poll::Column::EndedAt, Expr::value(now))
            .filter(poll::Column::Id.is_in(ended_ids.clone()))
            .exec(&txn)
            .await?;
    }

    let labels: Vec<String> = payload
        .options
        .iter()
        .map(|o| o.trim().to_string())
        .collect();
    let new_poll = poll::ActiveModel {
        session_id: Set(id),
        question: Set(payload.question.trim().to_string()),
        options: Set(serde_json::json!(labels)),
        is_active: Set(true),
        created_at: Set(now),
        ended_at: Set(None),
        ..Default::default()
    };
    let model = new_poll.insert(&txn).await?;

    txn.commit().await?;

    for poll_id in ended_ids {
        info!(poll_id, "Poll ended by newer poll");
        broadcast_tally(&state, session.event_id, poll_id, true).await;
    }
    let view = PollView::from(model);
    state.hub.broadcast(
        session.event_id,
        &ServerMessage::PollCreated { poll: view.clone() },
    );

    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    post,
    path = "/{id}/end",
    tag = "Polls",
    operation_id = "endPoll",
    summary = "End a poll",
    description = "Stops accepting votes and broadcasts `poll_ended` with the final tally. Ending an ended poll returns it unchanged.",
    params(("id" = i32, Path, description = "Poll ID")),
    responses(
        (status = 200, description = "Poll ended", body = PollView),
        (status = 404, description = "Poll not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn end_poll(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PollView>, AppError> {
    let txn = state.db.begin().await?;

    // Waits for in-flight votes, which hold a shared lock on the row.
    let existing = poll::Entity::find_by_id(id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Poll not found".into()))?;
    if !existing.is_active {
        txn.commit().await?;
        return Ok(Json(existing.into()));
    }

    let mut active: poll::ActiveModel = existing.into();
    active.is_active = Set(false);
    active.ended_at = Set(Some(chrono::Utc::now()));
    let model = active.update(&txn).await?;
    txn.commit().await?;

    let session = find_session(&state.db, model.session_id).await?;
    broadcast_tally(&state, session.event_id, model.id, true).await;

    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/{id}/results",
    tag = "Engagement",
    operation_id = "getPollResults",
    summary = "Vote tally of a poll",
    description = "Every option appears, including those nobody picked. Percentages are 0 when there are no votes.",
    params(("id" = i32, Path, description = "Poll ID")),
    responses(
        (status = 200, description = "Poll tally", body = PollTally),
        (status = 404, description = "Poll not found (NOT_FOUND)", body = ErrorBody),
        (status = 503, description = "Store unreachable (STORAGE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_poll_results(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PollTally>, AppError> {
    let results = tally_poll_results(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Poll not found".into()))?;
    Ok(Json(results))
}

#[utoipa::path(
    post,
    path = "/{id}/responses",
    tag = "Engagement",
    operation_id = "submitPollResponse",
    summary = "Vote in a poll",
    description = "One vote per participant per poll: voting again replaces the earlier choice. Returns the updated tally and broadcasts `poll_results` and `stats_updated`.",
    params(("id" = i32, Path, description = "Poll ID")),
    request_body = SubmitResponseRequest,
    responses(
        (status = 200, description = "Vote recorded", body = PollTally),
        (status = 400, description = "Poll ended, option out of range, or participant from another event (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Poll or participant not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(participant_id = payload.participant_id))]
pub async fn submit_response(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<SubmitResponseRequest>,
) -> Result<Json<PollTally>, AppError> {
    let txn = state.db.begin().await?;

    // Held until commit, so the poll cannot end between the check and the vote.
    let target = poll::Entity::find_by_id(id)
        .lock_shared()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Poll not found".into()))?;
    if !target.is_active {
        return Err(AppError::Validation("Poll has ended".into()));
    }
    let option_count = target.option_labels().len();
    if !usize::try_from(payload.selected_option).is_ok_and(|o| o < option_count) {
        return Err(AppError::Validation(format!(
            "selectedOption must be between 0 and {}",
            option_count.saturating_sub(1)
        )));
    }

    let session = find_session(&txn, target.session_id).await?;
    let participant =
        find_event_participant(&txn, payload.participant_id, session.event_id).await?;

    let vote = poll_response::ActiveModel {
        poll_id: Set(target.id),
        participant_id: Set(participant.id),
        selected_option: Set(payload.selected_option),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    poll_response::Entity::insert(vote)
        .on_conflict(
            OnConflict::columns([
                poll_response::Column::PollId,
                poll_response::Column::ParticipantId,
            ])
            .update_columns([poll_response::Column::SelectedOption])
            .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;
    txn.commit().await?;

    let results = broadcast_tally(&state, session.event_id, target.id, false).await;
    record_interaction(&state, session.event_id, participant.id).await;

    match results {
        Some(results) => Ok(Json(results)),
        None => Ok(Json(
            tally_poll_results(&state.db, target.id)
                .await?
                .ok_or_else(|| AppError::NotFound("Poll not found".into()))?,
        )),
    }
}
