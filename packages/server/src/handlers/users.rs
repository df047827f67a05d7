use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::views::UserView;
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::ValidatedJson;
use crate::models::shared::normalize_optional;
use crate::models::user::CreateUserRequest;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Users",
    operation_id = "createUser",
    summary = "Create a user",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserView),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Username or email already taken (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let new_user = user::ActiveModel {
        username: Set(payload.username.trim().to_string()),
        email: Set(payload.email.trim().to_lowercase()),
        first_name: Set(normalize_optional(payload.first_name)),
        last_name: Set(normalize_optional(payload.last_name)),
        profile_image_url: Set(normalize_optional(payload.profile_image_url)),
        role: Set(payload
            .role
            .unwrap_or_else(|| user::ROLE_PARTICIPANT.to_string())),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_user
        .insert(&state.db)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "Username or email already taken"))?;

    Ok((StatusCode::CREATED, Json(UserView::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    operation_id = "getUser",
    summary = "Get a user by ID",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = UserView),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserView>, AppError> {
    let model = user::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(Json(model.into()))
}
