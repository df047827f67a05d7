use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const KINDS: &[&str] = &["file", "link", "video"];

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "resources")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub session_id: i32,
    #[sea_orm(belongs_to, from = "session_id", to = "id")]
    pub session: HasOne<super::session::Entity>,

    pub name: String,
    /// One of [`KINDS`].
    #[sea_orm(column_name = "type")]
    pub kind: String,
    pub url: String,
    pub file_size: Option<String>,
    pub description: Option<String>,

    #[sea_orm(has_many)]
    pub downloads: HasMany<super::resource_download::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
