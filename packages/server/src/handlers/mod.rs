pub mod events;
pub mod polls;
pub mod questions;
pub mod realtime;
pub mod resources;
pub mod sessions;
pub mod users;

use common::ServerMessage;
use sea_orm::*;
use tracing::warn;

use crate::engagement::{compute_event_stats, refresh_engagement_score};
use crate::entity::{event, participant, session};
use crate::error::AppError;
use crate::state::AppState;

pub(crate) async fn find_event<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<event::Model, AppError> {
    event::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))
}

pub(crate) async fn find_session<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<session::Model, AppError> {
    session::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Session not found".into()))
}

/// Load a participant and check it is registered for `event_id`.
pub(crate) async fn find_event_participant<C: ConnectionTrait>(
    db: &C,
    participant_id: i32,
    event_id: i32,
) -> Result<participant::Model, AppError> {
    let participant = participant::Entity::find_by_id(participant_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Participant not found".into()))?;
    if participant.event_id != event_id {
        return Err(AppError::Validation(
            "Participant is not registered for this event".into(),
        ));
    }
    Ok(participant)
}

/// Post-commit bookkeeping for an interaction that changed a participant's log.
///
/// The interaction itself is already stored, so failures here are logged and
/// swallowed. The next interaction recomputes the score from scratch.
pub(crate) async fn record_interaction(state: &AppState, event_id: i32, participant_id: i32) {
    if let Err(e) =
        refresh_engagement_score(&state.db, &state.config.engagement, participant_id).await
    {
        warn!(participant_id, error = %e, "Failed to refresh engagement score");
    }
    broadcast_stats(state, event_id).await;
}

/// Recompute event stats and push them to the event's subscribers.
pub(crate) async fn broadcast_stats(state: &AppState, event_id: i32) {
    match compute_event_stats(&state.db, event_id).await {
        Ok(Some(stats)) => {
            state
                .hub
                .broadcast(event_id, &ServerMessage::StatsUpdated { event_id, stats });
        }
        Ok(None) => {}
        Err(e) => warn!(event_id, error = %e, "Failed to compute stats for broadcast"),
    }
}
