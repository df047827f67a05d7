use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Unique per (participant_id, session_id).
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "session_checkins")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub participant_id: i32,
    #[sea_orm(belongs_to, from = "participant_id", to = "id")]
    pub participant: HasOne<super::participant::Entity>,

    pub session_id: i32,
    #[sea_orm(belongs_to, from = "session_id", to = "id")]
    pub session: HasOne<super::session::Entity>,

    pub checkin_time: DateTimeUtc,
    pub checkout_time: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
