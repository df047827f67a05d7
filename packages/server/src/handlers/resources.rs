use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::ServerMessage;
use common::views::ResourceView;
use sea_orm::*;
use tracing::instrument;

use super::{find_event_participant, find_session, record_interaction};
use crate::entity::{resource, resource_download};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::ValidatedJson;
use crate::models::resource::*;
use crate::models::shared::{ParticipantAction, normalize_optional};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/{id}/resources",
    tag = "Resources",
    operation_id = "listResources",
    summary = "List a session's resources",
    params(("id" = i32, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Resources in creation order", body = Vec<ResourceView>),
        (status = 404, description = "Session not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_resources(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ResourceView>>, AppError> {
    find_session(&state.db, id).await?;
    let resources = resource::Entity::find()
        .filter(resource::Column::SessionId.eq(id))
        .order_by_asc(resource::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(resources.into_iter().map(ResourceView::from).collect()))
}

#[utoipa::path(
    post,
    path = "/{id}/resources",
    tag = "Resources",
    operation_id = "createResource",
    summary = "Attach a resource to a session",
    params(("id" = i32, Path, description = "Session ID")),
    request_body = CreateResourceRequest,
    responses(
        (status = 201, description = "Resource created", body = ResourceView),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Session not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(name = %payload.name))]
pub async fn create_resource(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<CreateResourceRequest>,
) -> Result<impl IntoResponse, AppError> {
    find_session(&state.db, id).await?;

    let new_resource = resource::ActiveModel {
        session_id: Set(id),
        name: Set(payload.name.trim().to_string()),
        kind: Set(payload.kind),
        url: Set(payload.url.trim().to_string()),
        file_size: Set(normalize_optional(payload.file_size)),
        description: Set(normalize_optional(payload.description)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let model = new_resource.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(ResourceView::from(model))))
}

#[utoipa::path(
    post,
    path = "/{id}/downloads",
    tag = "Resources",
    operation_id = "recordDownload",
    summary = "Record a resource download",
    description = "Every download is logged. Only the first download of a resource raises the participant's score. Broadcasts `resource_downloaded`.",
    params(("id" = i32, Path, description = "Resource ID")),
    request_body = ParticipantAction,
    responses(
        (status = 204, description = "Download recorded"),
        (status = 400, description = "Participant belongs to another event (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Resource or participant not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(participant_id = payload.participant_id))]
pub async fn record_download(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<ParticipantAction>,
) -> Result<StatusCode, AppError> {
    let target = resource::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Resource not found".into()))?;
    let session = find_session(&state.db, target.session_id).await?;
    let participant =
        find_event_participant(&state.db, payload.participant_id, session.event_id).await?;

    let download = resource_download::ActiveModel {
        resource_id: Set(target.id),
        participant_id: Set(participant.id),
        downloaded_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    download.insert(&state.db).await?;

    state.hub.broadcast(
        session.event_id,
        &ServerMessage::ResourceDownloaded {
            resource_id: target.id,
            participant_id: participant.id,
        },
    );
    record_interaction(&state, session.event_id, participant.id).await;

    Ok(StatusCode::NO_CONTENT)
}
