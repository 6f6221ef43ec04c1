use thiserror::Error;

use crate::services::storage::StorageError;

#[derive(Debug, Error)]
pub(crate) enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

pub(crate) type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub(crate) fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub(crate) fn on_unique_violation(error: sqlx::Error, message: &str) -> Self {
        if crate::db::is_unique_violation(&error) {
            Self::Conflict(message.to_string())
        } else {
            Self::Database(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_not_conflicts() {
        let error = ServiceError::on_unique_violation(sqlx::Error::RowNotFound, "duplicate");
        assert!(matches!(error, ServiceError::Database(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn messages_render_verbatim() {
        assert_eq!(ServiceError::not_found("Course not found").to_string(), "Course not found");
        assert_eq!(ServiceError::conflict("Already enrolled").to_string(), "Already enrolled");
    }
}
