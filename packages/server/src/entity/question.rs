use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "questions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub session_id: i32,
    #[sea_orm(belongs_to, from = "session_id", to = "id")]
    pub session: HasOne<super::session::Entity>,

    pub participant_id: i32,
    #[sea_orm(belongs_to, from = "participant_id", to = "id")]
    pub participant: HasOne<super::participant::Entity>,

    pub question: String,
    pub answer: Option<String>,
    /// Denormalized count of `question_upvotes` rows.
    pub upvotes: i32,
    pub is_answered: bool,
    pub is_anonymous: bool,

    #[sea_orm(has_many)]
    pub upvote_rows: HasMany<super::question_upvote::Entity>,

    pub created_at: DateTimeUtc,
    pub answered_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
