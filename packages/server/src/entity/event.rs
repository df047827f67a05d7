use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    pub description: Option<String>,
    pub start_date: DateTimeUtc,
    pub end_date: DateTimeUtc,
    pub organizer_id: i32,
    /// Mirrors the `active_event` slot; the slot is authoritative.
    pub is_active: bool,

    #[sea_orm(has_many)]
    pub sessions: HasMany<super::session::Entity>,

    #[sea_orm(has_many)]
    pub participants: HasMany<super::participant::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
