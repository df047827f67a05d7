use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A participant's vote. Unique per (poll_id, participant_id); voting again
/// overwrites `selected_option`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "poll_responses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub poll_id: i32,
    #[sea_orm(belongs_to, from = "poll_id", to = "id")]
    pub poll: HasOne<super::poll::Entity>,

    pub participant_id: i32,
    #[sea_orm(belongs_to, from = "participant_id", to = "id")]
    pub participant: HasOne<super::participant::Entity>,

    /// Index into the poll's option list.
    pub selected_option: i32,
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
