use std::collections::HashMap;

use common::{EventStats, PollTally, TopEngager};
use rust_decimal::Decimal;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, Query as SeaQuery};
use sea_orm::*;
use tracing::{debug, instrument};

use super::error::EngagementError;
use super::scoring::{InteractionCounts, ScoringPolicy};
use super::tally::tally;
use crate::entity::{
    event, participant, poll, poll_response, question, question_upvote, resource,
    resource_download, session, session_checkin, user,
};

/// Number of entries returned by [`rank_top_engagers`] when the caller does not say.
pub const DEFAULT_TOP_ENGAGERS: u64 = 10;

/// Summarize an event: participants, mean score, active sessions, downloads.
///
/// The four counts are independent queries issued concurrently; under
/// concurrent writes they may not describe one single instant.
#[instrument(skip(db))]
pub async fn compute_event_stats<C: ConnectionTrait>(
    db: &C,
    event_id: i32,
) -> Result<Option<EventStats>, EngagementError> {
    if event::Entity::find_by_id(event_id).one(db).await?.is_none() {
        return Ok(None);
    }

    let (total_participants, avg_engagement, active_sessions, total_downloads) = tokio::try_join!(
        count_participants(db, event_id),
        average_engagement(db, event_id),
        count_active_sessions(db, event_id),
        count_downloads(db, event_id),
    )?;

    Ok(Some(EventStats {
        total_participants,
        avg_engagement,
        active_sessions,
        total_downloads,
    }))
}

async fn count_participants<C: ConnectionTrait>(db: &C, event_id: i32) -> Result<u64, DbErr> {
    participant::Entity::find()
        .filter(participant::Column::EventId.eq(event_id))
        .count(db)
        .await
}

/// `AVG` yields NULL on an empty set, which maps to zero here.
async fn average_engagement<C: ConnectionTrait>(
    db: &C,
    event_id: i32,
) -> Result<Decimal, DbErr> {
    let avg: Option<Option<Decimal>> = participant::Entity::find()
        .select_only()
        .column_as(
            Expr::expr(Func::avg(Expr::col(participant::Column::EngagementScore))),
            "avg",
        )
        .filter(participant::Column::EventId.eq(event_id))
        .into_tuple()
        .one(db)
        .await?;

    Ok(avg.flatten().unwrap_or_default().round_dp(2))
}

async fn count_active_sessions<C: ConnectionTrait>(db: &C, event_id: i32) -> Result<u64, DbErr> {
    session::Entity::find()
        .filter(session::Column::EventId.eq(event_id))
        .filter(session::Column::IsActive.eq(true))
        .count(db)
        .await
}

async fn count_downloads<C: ConnectionTrait>(db: &C, event_id: i32) -> Result<u64, DbErr> {
    let event_sessions = SeaQuery::select()
        .column(session::Column::Id)
        .from(session::Entity)
        .and_where(session::Column::EventId.eq(event_id))
        .to_owned();
    let event_resources = SeaQuery::select()
        .column(resource::Column::Id)
        .from(resource::Entity)
        .and_where(resource::Column::SessionId.in_subquery(event_sessions))
        .to_owned();

    resource_download::Entity::find()
        .filter(resource_download::Column::ResourceId.in_subquery(event_resources))
        .count(db)
        .await
}

/// Read a participant's interaction counts from the log tables.
pub async fn interaction_counts<C: ConnectionTrait>(
    db: &C,
    participant_id: i32,
) -> Result<InteractionCounts, DbErr> {
    let checkins = session_checkin::Entity::find()
        .filter(session_checkin::Column::ParticipantId.eq(participant_id))
        .count(db);
    let poll_votes = poll_response::Entity::find()
        .filter(poll_response::Column::ParticipantId.eq(participant_id))
        .count(db);
    let questions = question::Entity::find()
        .filter(question::Column::ParticipantId.eq(participant_id))
        .count(db);
    let upvotes_given = question_upvote::Entity::find()
        .filter(question_upvote::Column::ParticipantId.eq(participant_id))
        .count(db);
    // Downloading the same resource again is not extra engagement.
    let resources_downloaded = resource_download::Entity::find()
        .select_only()
        .column(resource_download::Column::ResourceId)
        .distinct()
        .filter(resource_download::Column::ParticipantId.eq(participant_id))
        .count(db);

    let (checkins, poll_votes, questions, upvotes_given, resources_downloaded) = tokio::try_join!(
        checkins,
        poll_votes,
        questions,
        upvotes_given,
        resources_downloaded
    )?;

    Ok(InteractionCounts {
        checkins,
        poll_votes,
        questions,
        upvotes_given,
        resources_downloaded,
    })
}

/// Fold a participant's interaction log into a score. Pure read.
#[instrument(skip(db, policy))]
pub async fn compute_engagement_score<C: ConnectionTrait>(
    db: &C,
    policy: &ScoringPolicy,
    participant_id: i32,
) -> Result<Option<Decimal>, EngagementError> {
    if participant::Entity::find_by_id(participant_id)
        .one(db)
        .await?
        .is_none()
    {
        return Ok(None);
    }

    let counts = interaction_counts(db, participant_id).await?;
    Ok(Some(policy.score(&counts)))
}

/// Recompute a participant's score and store it in the cached column.
///
/// Call after the interaction that changed the log has committed. The
/// participant row stays locked from the counts to the write, so concurrent
/// refreshes for one participant apply in order and the last one sees every
/// committed interaction.
#[instrument(skip(db, policy))]
pub async fn refresh_engagement_score<C: ConnectionTrait + TransactionTrait>(
    db: &C,
    policy: &ScoringPolicy,
    participant_id: i32,
) -> Result<Option<Decimal>, EngagementError> {
    let txn = db.begin().await?;

    if participant::Entity::find_by_id(participant_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .is_none()
    {
        return Ok(None);
    }

    let counts = interaction_counts(&txn, participant_id).await?;
    let score = policy.score(&counts);

    participant::Entity::update_many()
        .col_expr(participant::Column::EngagementScore, Expr::value(score))
        .filter(participant::Column::Id.eq(participant_id))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    debug!(participant_id, %score, "Engagement score refreshed");
    Ok(Some(score))
}

/// Count votes per option of a poll.
#[instrument(skip(db))]
pub async fn tally_poll_results<C: ConnectionTrait>(
    db: &C,
    poll_id: i32,
) -> Result<Option<PollTally>, EngagementError> {
    let Some(poll) = poll::Entity::find_by_id(poll_id).one(db).await? else {
        return Ok(None);
    };

    let rows: Vec<(i32, i64)> = poll_response::Entity::find()
        .select_only()
        .column(poll_response::Column::SelectedOption)
        .column_as(poll_response::Column::Id.count(), "count")
        .filter(poll_response::Column::PollId.eq(poll_id))
        .group_by(poll_response::Column::SelectedOption)
        .into_tuple()
        .all(db)
        .await?;

    let counts: HashMap<i32, u64> = rows
        .into_iter()
        .map(|(option, count)| (option, u64::try_from(count).unwrap_or(0)))
        .collect();

    Ok(Some(tally(poll.id, &poll.option_labels(), &counts)))
}

/// The event's participants by descending score, ties by ascending id.
///
/// Returns at most `limit` entries; fewer when the event has fewer participants.
#[instrument(skip(db))]
pub async fn rank_top_engagers<C: ConnectionTrait>(
    db: &C,
    event_id: i32,
    limit: u64,
) -> Result<Option<Vec<TopEngager>>, EngagementError> {
    if event::Entity::find_by_id(event_id).one(db).await?.is_none() {
        return Ok(None);
    }

    let rows = participant::Entity::find()
        .filter(participant::Column::EventId.eq(event_id))
        .find_also_related(user::Entity)
        .order_by_desc(participant::Column::EngagementScore)
        .order_by_asc(participant::Column::Id)
        .limit(Some(limit))
        .all(db)
        .await?;

    let ranked = rows
        .into_iter()
        .map(|(p, usr)| {
            let (username, first_name, last_name) = match usr {
                Some(u) => (u.username, u.first_name, u.last_name),
                None => (String::new(), None, None),
            };
            TopEngager {
                participant_id: p.id,
                user_id: p.user_id,
                username,
                first_name,
                last_name,
                engagement_score: p.engagement_score,
            }
        })
        .collect();

    Ok(Some(ranked))
}
