use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::types::UserRole;
use crate::schemas::user::UserResponse;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct RegisterRequest {
    #[validate(length(min = 1, max = 255, message = "name must not be empty"))]
    pub(crate) name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub(crate) email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters long"))]
    pub(crate) password: String,
    #[serde(default = "default_role")]
    pub(crate) role: UserRole,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct LoginRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub(crate) email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub(crate) password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    pub(crate) token_type: String,
    pub(crate) user: UserResponse,
}

fn default_role() -> UserRole {
    UserRole::Student
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_defaults_to_student_and_validates() {
        let request: RegisterRequest = serde_json::from_value(serde_json::json!({
            "name": "Ada",
            "email": "ada@college.test",
            "password": "longenough"
        }))
        .unwrap();
        assert_eq!(request.role, UserRole::Student);
        assert!(request.validate().is_ok());

        let bad: RegisterRequest = serde_json::from_value(serde_json::json!({
            "name": "Ada",
            "email": "not-an-email",
            "password": "short"
        }))
        .unwrap();
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }
}
