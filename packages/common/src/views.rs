//! JSON views of persisted entities, shared by the REST API and the
//! real-time channel.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i32,
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "ada@example.org")]
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    /// Either `organizer` or `participant`.
    #[schema(example = "participant")]
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub id: i32,
    #[schema(example = "RustConf 2026")]
    pub name: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub organizer_id: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: i32,
    pub event_id: i32,
    #[schema(example = "Opening keynote")]
    pub title: String,
    pub description: Option<String>,
    pub speaker: Option<String>,
    pub room: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_capacity: Option<i32>,
    pub is_active: bool,
    pub qr_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A user's registration in an event, with the cached engagement score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantView {
    pub id: i32,
    pub user_id: i32,
    pub event_id: i32,
    pub username: Option<String>,
    pub registered_at: DateTime<Utc>,
    #[schema(value_type = f64, example = 42.5)]
    pub engagement_score: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PollView {
    pub id: i32,
    pub session_id: i32,
    #[schema(example = "Which track next?")]
    pub question: String,
    /// Option labels; votes refer to them by index.
    pub options: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: i32,
    pub session_id: i32,
    /// `None` for anonymous questions.
    pub participant_id: Option<i32>,
    pub question: String,
    pub answer: Option<String>,
    pub upvotes: i32,
    pub is_answered: bool,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceView {
    pub id: i32,
    pub session_id: i32,
    pub name: String,
    /// One of `file`, `link`, `video`.
    #[schema(example = "file")]
    pub kind: String,
    pub url: String,
    pub file_size: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckinView {
    pub id: i32,
    pub participant_id: i32,
    pub session_id: i32,
    pub checkin_time: DateTime<Utc>,
    pub checkout_time: Option<DateTime<Utc>>,
}
