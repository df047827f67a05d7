use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const ROLE_ORGANIZER: &str = "organizer";
pub const ROLE_PARTICIPANT: &str = "participant";

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    /// `organizer` or `participant`.
    pub role: String,

    #[sea_orm(has_many)]
    pub participations: HasMany<super::participant::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
