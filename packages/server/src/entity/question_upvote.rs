use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Unique per (question_id, participant_id).
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "question_upvotes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub question_id: i32,
    #[sea_orm(belongs_to, from = "question_id", to = "id")]
    pub question: HasOne<super::question::Entity>,

    pub participant_id: i32,
    #[sea_orm(belongs_to, from = "participant_id", to = "id")]
    pub participant: HasOne<super::participant::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
