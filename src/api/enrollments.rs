use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::schemas::enrollment::{EnrolledCourseResponse, EnrollmentRequest, EnrollmentResponse};
use crate::schemas::MessageResponse;
use crate::services::student;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_enrollment))
        .route("/student/:student_id", get(student_enrollments))
        .route("/:enrollment_id", delete(delete_enrollment))
}

async fn student_enrollments(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<Vec<EnrolledCourseResponse>>, ApiError> {
    Ok(Json(student::enrollment_history(&state, &user, &student_id).await?))
}

async fn create_enrollment(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<EnrollmentRequest>,
) -> Result<(StatusCode, Json<EnrollmentResponse>), ApiError> {
    validate_payload(&payload)?;
    let enrollment =
        student::enroll(&state, &user, payload.student_id.trim(), payload.course_id.trim()).await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

async fn delete_enrollment(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(enrollment_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    student::delete_enrollment(&state, &user, &enrollment_id).await?;
    Ok(Json(MessageResponse::new("Enrollment deleted successfully")))
}

#[cfg(test)]
mod tests;
