use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A user's registration in an event. Unique per (user_id, event_id).
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "participants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub event_id: i32,
    #[sea_orm(belongs_to, from = "event_id", to = "id")]
    pub event: HasOne<super::event::Entity>,

    pub registered_at: DateTimeUtc,

    /// Cached result of the scoring fold over this participant's interactions.
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub engagement_score: Decimal,
}

impl ActiveModelBehavior for ActiveModel {}
