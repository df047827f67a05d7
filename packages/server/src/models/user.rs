use common::views::UserView;
use serde::Deserialize;

use super::shared::validate_optional_text;
use crate::entity::user;
use crate::error::AppError;
use crate::extractors::json::Validate;

/// Request body for creating a user.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Unique username (1-32 chars, alphanumeric and underscores).
    #[schema(example = "ada_l")]
    pub username: String,
    /// Unique email address.
    #[schema(example = "ada@example.org")]
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    /// `organizer` or `participant` (default).
    pub role: Option<String>,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), AppError> {
        let username = self.username.trim();
        if username.is_empty() || username.chars().count() > 32 {
            return Err(AppError::Validation(
                "Username must be 1-32 characters".into(),
            ));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(AppError::Validation(
                "Username must contain only letters, digits, and underscores".into(),
            ));
        }

        let email = self.email.trim();
        let well_formed = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !well_formed || email.len() > 254 {
            return Err(AppError::Validation("Email address is not valid".into()));
        }

        validate_optional_text(self.first_name.as_deref(), "firstName", 100)?;
        validate_optional_text(self.last_name.as_deref(), "lastName", 100)?;
        validate_optional_text(self.profile_image_url.as_deref(), "profileImageUrl", 2048)?;

        if let Some(ref role) = self.role
            && role != user::ROLE_ORGANIZER
            && role != user::ROLE_PARTICIPANT
        {
            return Err(AppError::Validation(
                "Role must be one of: organizer, participant".into(),
            ));
        }
        Ok(())
    }
}

impl From<user::Model> for UserView {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            email: m.email,
            first_name: m.first_name,
            last_name: m.last_name,
            profile_image_url: m.profile_image_url,
            role: m.role,
            created_at: m.created_at,
        }
    }
}
