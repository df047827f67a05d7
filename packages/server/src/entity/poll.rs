use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "polls")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub session_id: i32,
    #[sea_orm(belongs_to, from = "session_id", to = "id")]
    pub session: HasOne<super::session::Entity>,

    pub question: String,
    /// Option labels stored as a JSON array of strings. Votes refer to them by index.
    #[sea_orm(column_type = "JsonBinary")]
    pub options: serde_json::Value,
    pub is_active: bool,

    #[sea_orm(has_many)]
    pub responses: HasMany<super::poll_response::Entity>,

    pub created_at: DateTimeUtc,
    pub ended_at: Option<DateTimeUtc>,
}

impl Model {
    /// Option labels in definition order.
    pub fn option_labels(&self) -> Vec<String> {
        match self.options.as_array() {
            Some(values) => values
                .iter()
                .map(|v| match v.as_str() {
                    Some(s) => s.to_owned(),
                    None => v.to_string(),
                })
                .collect(),
            None => Vec::new(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
