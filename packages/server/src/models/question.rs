use common::views::QuestionView;
use serde::Deserialize;

use super::shared::{validate_id, validate_text};
use crate::entity::question;
use crate::error::AppError;
use crate::extractors::json::Validate;

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    #[schema(example = 12)]
    pub participant_id: i32,
    #[schema(example = "Will the slides be shared?")]
    pub question: String,
    /// Hide the asker from other clients. Defaults to `false`.
    pub is_anonymous: Option<bool>,
}

impl Validate for CreateQuestionRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_id(self.participant_id, "participantId")?;
        validate_text(&self.question, "Question", 1000)
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct AnswerQuestionRequest {
    #[schema(example = "Yes, after the talk.")]
    pub answer: String,
}

impl Validate for AnswerQuestionRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_text(&self.answer, "Answer", 5000)
    }
}

impl From<question::Model> for QuestionView {
    fn from(m: question::Model) -> Self {
        Self {
            id: m.id,
            session_id: m.session_id,
            participant_id: (!m.is_anonymous).then_some(m.participant_id),
            question: m.question,
            answer: m.answer,
            upvotes: m.upvotes,
            is_answered: m.is_answered,
            is_anonymous: m.is_anonymous,
            created_at: m.created_at,
            answered_at: m.answered_at,
        }
    }
}
