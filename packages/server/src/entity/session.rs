use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub event_id: i32,
    #[sea_orm(belongs_to, from = "event_id", to = "id")]
    pub event: HasOne<super::event::Entity>,

    pub title: String,
    pub description: Option<String>,
    pub speaker: Option<String>,
    pub room: Option<String>,
    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,
    pub max_capacity: Option<i32>,
    /// Independent of the parent event's flag.
    pub is_active: bool,
    pub qr_code: Option<String>,

    #[sea_orm(has_many)]
    pub polls: HasMany<super::poll::Entity>,

    #[sea_orm(has_many)]
    pub questions: HasMany<super::question::Entity>,

    #[sea_orm(has_many)]
    pub resources: HasMany<super::resource::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
