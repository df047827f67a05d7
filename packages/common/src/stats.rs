//! Aggregated engagement views served to dashboards.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Event-level engagement summary.
///
/// `Default` is the zero summary, used for events with no activity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventStats {
    #[schema(example = 120)]
    pub total_participants: u64,
    /// Mean engagement score over the event's participants, 0 when there are none.
    #[schema(value_type = f64, example = 23.75)]
    pub avg_engagement: Decimal,
    #[schema(example = 2)]
    pub active_sessions: u64,
    #[schema(example = 310)]
    pub total_downloads: u64,
}

/// Vote count for a single poll option.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptionTally {
    /// Index of the option in the poll's option list.
    pub option: usize,
    pub label: String,
    pub count: u64,
    /// Share of all counted responses, in percent. 0 when nobody voted.
    pub percentage: f64,
}

/// Results of a poll, one entry per defined option (in definition order).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PollTally {
    pub poll_id: i32,
    pub total_responses: u64,
    pub options: Vec<OptionTally>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopEngager {
    pub participant_id: i32,
    pub user_id: i32,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[schema(value_type = f64, example = 87.0)]
    pub engagement_score: Decimal,
}
