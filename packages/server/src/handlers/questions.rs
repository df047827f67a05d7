use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::ServerMessage;
use common::views::QuestionView;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::{debug, instrument};

use super::{find_event_participant, find_session, record_interaction};
use crate::entity::{question, question_upvote};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::ValidatedJson;
use crate::models::question::*;
use crate::models::shared::ParticipantAction;
use crate::state::AppState;

async fn find_question<C: ConnectionTrait>(db: &C, id: i32) -> Result<question::Model, AppError> {
    question::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".into()))
}

#[utoipa::path(
    get,
    path = "/{id}/questions",
    tag = "Questions",
    operation_id = "listQuestions",
    summary = "List a session's questions",
    description = "Most upvoted first, then oldest first. Anonymous questions omit `participantId`.",
    params(("id" = i32, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Questions", body = Vec<QuestionView>),
        (status = 404, description = "Session not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_questions(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<QuestionView>>, AppError> {
    find_session(&state.db, id).await?;
    let questions = question::Entity::find()
        .filter(question::Column::SessionId.eq(id))
        .order_by_desc(question::Column::Upvotes)
        .order_by_asc(question::Column::CreatedAt)
        .order_by_asc(question::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(questions.into_iter().map(QuestionView::from).collect()))
}

#[utoipa::path(
    post,
    path = "/{id}/questions",
    tag = "Questions",
    operation_id = "postQuestion",
    summary = "Ask a question in a session",
    description = "Broadcasts `question_posted`.",
    params(("id" = i32, Path, description = "Session ID")),
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Question posted", body = QuestionView),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Session or participant not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(participant_id = payload.participant_id))]
pub async fn create_question(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = find_session(&state.db, id).await?;
    let participant =
        find_event_participant(&state.db, payload.participant_id, session.event_id).await?;

    let new_question = question::ActiveModel {
        session_id: Set(session.id),
        participant_id: Set(participant.id),
        question: Set(payload.question.trim().to_string()),
        answer: Set(None),
        upvotes: Set(0),
        is_answered: Set(false),
        is_anonymous: Set(payload.is_anonymous.unwrap_or(false)),
        created_at: Set(chrono::Utc::now()),
        answered_at: Set(None),
        ..Default::default()
    };
    let model = new_question.insert(&state.db).await?;
    let view = QuestionView::from(model);

    state.hub.broadcast(
        session.event_id,
        &ServerMessage::QuestionPosted {
            question: view.clone(),
        },
    );
    record_interaction(&state, session.event_id, participant.id).await;

    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    post,
    path = "/{id}/answer",
    tag = "Questions",
    operation_id = "answerQuestion",
    summary = "Answer a question",
    description = "Sets or replaces the answer and broadcasts `question_answered`.",
    params(("id" = i32, Path, description = "Question ID")),
    request_body = AnswerQuestionRequest,
    responses(
        (status = 200, description = "Question answered", body = QuestionView),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn answer_question(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<AnswerQuestionRequest>,
) -> Result<Json<QuestionView>, AppError> {
    let existing = find_question(&state.db, id).await?;
    let session = find_session(&state.db, existing.session_id).await?;

    let mut active: question::ActiveModel = existing.into();
    active.answer = Set(Some(payload.answer.trim().to_string()));
    active.is_answered = Set(true);
    active.answered_at = Set(Some(chrono::Utc::now()));
    let model = active.update(&state.db).await?;
    let view = QuestionView::from(model);

    state.hub.broadcast(
        session.event_id,
        &ServerMessage::QuestionAnswered {
            question: view.clone(),
        },
    );

    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/{id}/upvotes",
    tag = "Questions",
    operation_id = "upvoteQuestion",
    summary = "Upvote a question",
    description = "One upvote per participant per question. Repeating it returns the question unchanged and broadcasts nothing.",
    params(("id" = i32, Path, description = "Question ID")),
    request_body = ParticipantAction,
    responses(
        (status = 200, description = "Question with its current upvote count", body = QuestionView),
        (status = 400, description = "Participant belongs to another event (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Question or participant not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(participant_id = payload.participant_id))]
pub async fn upvote_question(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<ParticipantAction>,
) -> Result<Json<QuestionView>, AppError> {
    let target = find_question(&state.db, id).await?;
    let session = find_session(&state.db, target.session_id).await?;
    let participant =
        find_event_participant(&state.db, payload.participant_id, session.event_id).await?;

    let txn = state.db.begin().await?;

    let upvote = question_upvote::ActiveModel {
        question_id: Set(target.id),
        participant_id: Set(participant.id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let result = question_upvote::Entity::insert(upvote)
        .on_conflict(
            OnConflict::columns([
                question_upvote::Column::QuestionId,
                question_upvote::Column::ParticipantId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&txn)
        .await;
    let inserted = match result {
        Ok(rows) => rows > 0,
        Err(DbErr::RecordNotInserted) => false,
        Err(e) => return Err(e.into()),
    };

    // The counter moves in the same transaction as the row it counts.
    if inserted {
        question::Entity::update_many()
            .col_expr(
                question::Column::Upvotes,
                Expr::col(question::Column::Upvotes).add(1),
            )
            .filter(question::Column::Id.eq(target.id))
            .exec(&txn)
            .await?;
    }

    let model = find_question(&txn, target.id).await?;
    txn.commit().await?;

    if !inserted {
        debug!(question_id = target.id, participant_id = participant.id, "Already upvoted");
        return Ok(Json(model.into()));
    }

    state.hub.broadcast(
        session.event_id,
        &ServerMessage::QuestionUpvoted {
            question_id: model.id,
            upvotes: model.upvotes,
        },
    );
    record_interaction(&state, session.event_id, participant.id).await;

    Ok(Json(model.into()))
}
