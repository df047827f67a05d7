use common::views::ResourceView;
use serde::Deserialize;

use super::shared::{validate_optional_text, validate_text};
use crate::entity::resource;
use crate::error::AppError;
use crate::extractors::json::Validate;

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceRequest {
    #[schema(example = "Slides")]
    pub name: String,
    /// One of `file`, `link`, `video`.
    #[schema(example = "link")]
    pub kind: String,
    #[schema(example = "https://example.org/slides.pdf")]
    pub url: String,
    /// Human-readable size, e.g. `2.4 MB`.
    pub file_size: Option<String>,
    pub description: Option<String>,
}

impl Validate for CreateResourceRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_text(&self.name, "Name", 256)?;
        if !resource::KINDS.contains(&self.kind.as_str()) {
            return Err(AppError::Validation(format!(
                "kind must be one of: {}",
                resource::KINDS.join(", ")
            )));
        }
        validate_text(&self.url, "URL", 2048)?;
        let url = self.url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://") || url.starts_with('/')) {
            return Err(AppError::Validation(
                "URL must be absolute http(s) or a server path".into(),
            ));
        }
        validate_optional_text(self.file_size.as_deref(), "fileSize", 32)?;
        validate_optional_text(self.description.as_deref(), "Description", 10_000)
    }
}

impl From<resource::Model> for ResourceView {
    fn from(m: resource::Model) -> Self {
        Self {
            id: m.id,
            session_id: m.session_id,
            name: m.name,
            kind: m.kind,
            url: m.url,
            file_size: m.file_size,
            description: m.description,
            created_at: m.created_at,
        }
    }
}
