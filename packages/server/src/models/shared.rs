use serde::Deserialize;

use crate::error::AppError;
use crate::extractors::json::Validate;

/// Body of the participant interactions that carry nothing but the actor:
/// check-ins, upvotes and downloads.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantAction {
    #[schema(example = 12)]
    pub participant_id: i32,
}

impl Validate for ParticipantAction {
    fn validate(&self) -> Result<(), AppError> {
        validate_id(self.participant_id, "participantId")
    }
}

/// Validate a trimmed title (1-256 Unicode characters).
pub fn validate_title(title: &str) -> Result<(), AppError> {
    validate_text(title, "Title", 256)
}

/// Validate that trimmed text is non-empty and at most `max` characters.
pub fn validate_text(value: &str, field: &str, max: usize) -> Result<(), AppError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be 1-{max} characters"
        )));
    }
    Ok(())
}

/// Validate optional free text: when present, at most `max` characters.
pub fn validate_optional_text(
    value: Option<&str>,
    field: &str,
    max: usize,
) -> Result<(), AppError> {
    if let Some(value) = value
        && value.chars().count() > max
    {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Ids are generated serials, so anything below 1 can never match.
pub fn validate_id(id: i32, field: &str) -> Result<(), AppError> {
    if id < 1 {
        return Err(AppError::Validation(format!("{field} must be a positive id")));
    }
    Ok(())
}

/// Trim optional text, mapping blank strings to `None`.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
