use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Primary key of the only row in `active_event`.
pub const SLOT_ID: i32 = 1;

/// Single-row table holding the id of the currently active event.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "active_event")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub event_id: Option<i32>,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
