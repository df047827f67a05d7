use chrono::{DateTime, Utc};
use common::views::{CheckinView, SessionView};
use serde::Deserialize;

use super::shared::{validate_optional_text, validate_title};
use crate::entity::{session, session_checkin};
use crate::error::AppError;
use crate::extractors::json::Validate;

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[schema(example = "Opening keynote")]
    pub title: String,
    pub description: Option<String>,
    pub speaker: Option<String>,
    pub room: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_capacity: Option<i32>,
    /// Defaults to `false`.
    pub is_active: Option<bool>,
    pub qr_code: Option<String>,
}

impl Validate for CreateSessionRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_title(&self.title)?;
        validate_optional_text(self.description.as_deref(), "Description", 10_000)?;
        validate_optional_text(self.speaker.as_deref(), "Speaker", 256)?;
        validate_optional_text(self.room.as_deref(), "Room", 128)?;
        validate_optional_text(self.qr_code.as_deref(), "qrCode", 2048)?;
        validate_capacity(self.max_capacity)?;
        validate_window(self.start_time, self.end_time)
    }
}

/// Partial update of a session. Absent fields are left unchanged.
#[derive(Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub speaker: Option<String>,
    pub room: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub max_capacity: Option<i32>,
    pub is_active: Option<bool>,
}

impl Validate for UpdateSessionRequest {
    fn validate(&self) -> Result<(), AppError> {
        if let Some(ref title) = self.title {
            validate_title(title)?;
        }
        validate_optional_text(self.description.as_deref(), "Description", 10_000)?;
        validate_optional_text(self.speaker.as_deref(), "Speaker", 256)?;
        validate_optional_text(self.room.as_deref(), "Room", 128)?;
        validate_capacity(self.max_capacity)?;
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            validate_window(start, end)?;
        }
        Ok(())
    }
}

impl UpdateSessionRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.speaker.is_none()
            && self.room.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.max_capacity.is_none()
            && self.is_active.is_none()
    }
}

fn validate_capacity(capacity: Option<i32>) -> Result<(), AppError> {
    match capacity {
        Some(c) if c < 1 => Err(AppError::Validation(
            "maxCapacity must be at least 1".into(),
        )),
        _ => Ok(()),
    }
}

pub fn validate_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), AppError> {
    if end <= start {
        return Err(AppError::Validation(
            "endTime must be after startTime".into(),
        ));
    }
    Ok(())
}

impl From<session::Model> for SessionView {
    fn from(m: session::Model) -> Self {
        Self {
            id: m.id,
            event_id: m.event_id,
            title: m.title,
            description: m.description,
            speaker: m.speaker,
            room: m.room,
            start_time: m.start_time,
            end_time: m.end_time,
            max_capacity: m.max_capacity,
            is_active: m.is_active,
            qr_code: m.qr_code,
            created_at: m.created_at,
        }
    }
}

impl From<session_checkin::Model> for CheckinView {
    fn from(m: session_checkin::Model) -> Self {
        Self {
            id: m.id,
            participant_id: m.participant_id,
            session_id: m.session_id,
            checkin_time: m.checkin_time,
            checkout_time: m.checkout_time,
        }
    }
}
