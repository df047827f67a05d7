//! Real-time channel protocol.
//!
//! Every frame is a JSON text message tagged by `type`:
//!
//! ```json
//! {"type": "join_event", "eventId": 3, "participantId": 12}
//! {"type": "poll_results", "pollId": 9, "results": {"pollId": 9, "totalResponses": 4, "options": []}}
//! ```

use serde::{Deserialize, Serialize};

use crate::stats::{EventStats, PollTally};
use crate::views::{PollView, QuestionView, SessionView};

/// Messages a client may send over the real-time channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Scope the connection to an event. A second join replaces the first.
    JoinEvent {
        event_id: i32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        participant_id: Option<i32>,
    },
    /// Drop the event scope; the connection stays open but receives nothing.
    LeaveEvent,
    Ping,
}

/// Messages pushed by the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    Joined {
        event_id: i32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        participant_id: Option<i32>,
    },
    Pong,
    Error {
        message: String,
    },
    EventActivated {
        event_id: i32,
    },
    SessionUpdated {
        session: SessionView,
    },
    PollCreated {
        poll: PollView,
    },
    PollEnded {
        poll_id: i32,
        results: PollTally,
    },
    PollResults {
        poll_id: i32,
        results: PollTally,
    },
    QuestionPosted {
        question: QuestionView,
    },
    QuestionAnswered {
        question: QuestionView,
    },
    QuestionUpvoted {
        question_id: i32,
        upvotes: i32,
    },
    Checkin {
        session_id: i32,
        participant_id: i32,
    },
    ResourceDownloaded {
        resource_id: i32,
        participant_id: i32,
    },
    StatsUpdated {
        event_id: i32,
        stats: EventStats,
    },
}

impl ServerMessage {
    /// The `type` tag, for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Joined { .. } => "joined",
            Self::Pong => "pong",
            Self::Error { .. } => "error",
            Self::EventActivated { .. } => "event_activated",
            Self::SessionUpdated { .. } => "session_updated",
            Self::PollCreated { .. } => "poll_created",
            Self::PollEnded { .. } => "poll_ended",
            Self::PollResults { .. } => "poll_results",
            Self::QuestionPosted { .. } => "question_posted",
            Self::QuestionAnswered { .. } => "question_answered",
            Self::QuestionUpvoted { .. } => "question_upvoted",
            Self::Checkin { .. } => "checkin",
            Self::ResourceDownloaded { .. } => "resource_downloaded",
            Self::StatsUpdated { .. } => "stats_updated",
        }
    }
}
