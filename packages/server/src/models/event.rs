use chrono::{DateTime, Utc};
use common::views::{EventView, ParticipantView};
use serde::Deserialize;

use super::shared::{validate_id, validate_optional_text, validate_text};
use crate::engagement::DEFAULT_TOP_ENGAGERS;
use crate::entity::{event, participant, user};
use crate::error::AppError;
use crate::extractors::json::Validate;

/// Request body for creating an event.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    /// Event name (1-256 characters).
    #[schema(example = "RustConf 2026")]
    pub name: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    /// Must be after `startDate`.
    pub end_date: DateTime<Utc>,
    /// User id of the organizer. Must exist.
    #[schema(example = 1)]
    pub organizer_id: i32,
}

impl Validate for CreateEventRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_text(&self.name, "Name", 256)?;
        validate_optional_text(self.description.as_deref(), "Description", 10_000)?;
        validate_id(self.organizer_id, "organizerId")?;
        if self.end_date <= self.start_date {
            return Err(AppError::Validation(
                "endDate must be after startDate".into(),
            ));
        }
        Ok(())
    }
}

/// Request body for registering a user as a participant of an event.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterParticipantRequest {
    #[schema(example = 4)]
    pub user_id: i32,
}

impl Validate for RegisterParticipantRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_id(self.user_id, "userId")
    }
}

/// Query parameters for the top-engagers ranking.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TopEngagersQuery {
    /// Maximum number of entries (default 10, must be positive).
    pub limit: Option<i64>,
}

impl TopEngagersQuery {
    pub fn resolve_limit(&self) -> Result<u64, AppError> {
        match self.limit {
            None => Ok(DEFAULT_TOP_ENGAGERS),
            Some(n) if n > 0 => Ok(n as u64),
            Some(n) => Err(AppError::Validation(format!(
                "limit must be a positive integer, got {n}"
            ))),
        }
    }
}

impl From<event::Model> for EventView {
    fn from(m: event::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            start_date: m.start_date,
            end_date: m.end_date,
            organizer_id: m.organizer_id,
            is_active: m.is_active,
            created_at: m.created_at,
        }
    }
}

/// Build a participant view, with the username when the user row was joined in.
pub fn participant_view(p: participant::Model, usr: Option<user::Model>) -> ParticipantView {
    ParticipantView {
        id: p.id,
        user_id: p.user_id,
        event_id: p.event_id,
        username: usr.map(|u| u.username),
        registered_at: p.registered_at,
        engagement_score: p.engagement_score,
    }
}
