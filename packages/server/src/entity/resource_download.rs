use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per download; repeated downloads are all logged.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "resource_downloads")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub resource_id: i32,
    #[sea_orm(belongs_to, from = "resource_id", to = "id")]
    pub resource: HasOne<super::resource::Entity>,

    pub participant_id: i32,
    #[sea_orm(belongs_to, from = "participant_id", to = "id")]
    pub participant: HasOne<super::participant::Entity>,

    pub downloaded_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
