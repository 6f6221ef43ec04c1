use validator::{Validate, ValidationErrors};

use crate::api::errors::ApiError;

/// Emails are stored trimmed and lower-cased.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

pub(crate) fn validate_payload<T: Validate>(payload: &T) -> Result<(), ApiError> {
    payload.validate().map_err(|errors| ApiError::BadRequest(describe(&errors)))
}

fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| match &error.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect();
    messages.sort();

    if messages.is_empty() {
        "Invalid request payload".to_string()
    } else {
        messages.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::auth::RegisterRequest;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  Ada@College.TEST "), "ada@college.test");
    }

    #[test]
    fn payload_errors_become_bad_request() {
        let request: RegisterRequest = serde_json::from_value(serde_json::json!({
            "name": "",
            "email": "ada@college.test",
            "password": "longenough"
        }))
        .unwrap();

        match validate_payload(&request) {
            Err(ApiError::BadRequest(message)) => assert_eq!(message, "name must not be empty"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
