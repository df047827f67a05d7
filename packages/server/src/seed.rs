use sea_orm::sea_query::{Index, OnConflict, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::entity::{active_event, participant, poll_response, question_upvote, session_checkin};

/// Ensure the composite unique indexes exist.
///
/// Schema sync only creates single-column unique constraints. The upserts
/// in the handlers use `ON CONFLICT` on these column pairs, which Postgres
/// rejects without a matching unique index, so a failure here is fatal.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let indexes = [
        (
            "idx_participants_user_event",
            Index::create()
                .if_not_exists()
                .unique()
                .name("idx_participants_user_event")
                .table(participant::Entity)
                .col(participant::Column::UserId)
                .col(participant::Column::EventId)
                .to_owned(),
        ),
        (
            "idx_session_checkins_participant_session",
            Index::create()
                .if_not_exists()
                .unique()
                .name("idx_session_checkins_participant_session")
                .table(session_checkin::Entity)
                .col(session_checkin::Column::ParticipantId)
                .col(session_checkin::Column::SessionId)
                .to_owned(),
        ),
        (
            "idx_poll_responses_poll_participant",
            Index::create()
                .if_not_exists()
                .unique()
                .name("idx_poll_responses_poll_participant")
                .table(poll_response::Entity)
                .col(poll_response::Column::PollId)
                .col(poll_response::Column::ParticipantId)
                .to_owned(),
        ),
        (
            "idx_question_upvotes_question_participant",
            Index::create()
                .if_not_exists()
                .unique()
                .name("idx_question_upvotes_question_participant")
                .table(question_upvote::Entity)
                .col(question_upvote::Column::QuestionId)
                .col(question_upvote::Column::ParticipantId)
                .to_owned(),
        ),
    ];

    for (name, index) in indexes {
        db.execute_unprepared(&index.to_string(PostgresQueryBuilder))
            .await?;
        info!("Ensured index {} exists", name);
    }
    Ok(())
}

/// Make sure the single `active_event` row exists, pointing at no event.
pub async fn seed_active_event_slot(db: &DatabaseConnection) -> Result<(), DbErr> {
    let slot = active_event::ActiveModel {
        id: Set(active_event::SLOT_ID),
        event_id: Set(None),
        updated_at: Set(chrono::Utc::now()),
    };

    let result = active_event::Entity::insert(slot)
        .on_conflict(
            OnConflict::column(active_event::Column::Id)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(0) | Err(DbErr::RecordNotInserted) => {}
        Ok(_) => info!("Seeded active event slot"),
        Err(e) => return Err(e),
    }
    Ok(())
}
