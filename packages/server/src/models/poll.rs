use common::views::PollView;
use serde::Deserialize;

use super::shared::{validate_id, validate_text};
use crate::entity::poll;
use crate::error::AppError;
use crate::extractors::json::Validate;

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 10;

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    #[schema(example = "Which track next?")]
    pub question: String,
    /// 2-10 option labels.
    #[schema(example = json!(["Async", "Embedded"]))]
    pub options: Vec<String>,
}

impl Validate for CreatePollRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_text(&self.question, "Question", 500)?;
        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&self.options.len()) {
            return Err(AppError::Validation(format!(
                "A poll needs {MIN_OPTIONS}-{MAX_OPTIONS} options"
            )));
        }
        for option in &self.options {
            validate_text(option, "Option", 200)?;
        }
        Ok(())
    }
}

/// A participant's vote. Submitting again replaces the earlier choice.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponseRequest {
    #[schema(example = 12)]
    pub participant_id: i32,
    /// Zero-based index into the poll's options.
    #[schema(example = 0)]
    pub selected_option: i32,
}

impl Validate for SubmitResponseRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_id(self.participant_id, "participantId")?;
        if self.selected_option < 0 {
            return Err(AppError::Validation(
                "selectedOption must not be negative".into(),
            ));
        }
        Ok(())
    }
}

impl From<poll::Model> for PollView {
    fn from(m: poll::Model) -> Self {
        let options = m.option_labels();
        Self {
            id: m.id,
            session_id: m.session_id,
            question: m.question,
            options,
            is_active: m.is_active,
            created_at: m.created_at,
            ended_at: m.ended_at,
        }
    }
}
