use axum::{
    extract::{Path, State},
    routing::{delete, get, patch, put},
    Json, Router,
};

use crate::api::courses;
use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::core::state::AppState;
use crate::schemas::course::CourseResponse;
use crate::schemas::dashboard::AdminDashboardResponse;
use crate::schemas::enrollment::{EnrollmentResponse, EnrollmentStatusUpdate};
use crate::schemas::user::{StudentResponse, TeacherResponse, UserResponse};
use crate::schemas::MessageResponse;
use crate::services::admin;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/users", get(list_users))
        .route("/users/:user_id", delete(delete_user))
        .route("/students", get(list_students))
        .route("/teachers", get(list_teachers))
        .route("/courses", get(list_courses).post(courses::create_course))
        .route("/courses/:course_id", put(courses::update_course).delete(courses::delete_course))
        .route("/enrollments/:enrollment_id", patch(update_enrollment_status))
}

async fn dashboard(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Json<AdminDashboardResponse> {
    Json(admin::dashboard_stats(&state).await)
}

async fn list_users(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    Ok(Json(admin::list_users(&state).await?))
}

async fn list_students(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentResponse>>, ApiError> {
    Ok(Json(admin::list_students(&state).await?))
}

async fn list_teachers(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<TeacherResponse>>, ApiError> {
    Ok(Json(admin::list_teachers(&state).await?))
}

async fn list_courses(
    CurrentAdmin(_admin): CurrentAdmin,
    state: State<AppState>,
) -> Json<Vec<CourseResponse>> {
    courses::list_courses(state).await
}

async fn delete_user(
    CurrentAdmin(admin_user): CurrentAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    admin::delete_user(&state, &admin_user, &user_id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

async fn update_enrollment_status(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(enrollment_id): Path<String>,
    Json(payload): Json<EnrollmentStatusUpdate>,
) -> Result<Json<EnrollmentResponse>, ApiError> {
    let enrollment = admin::update_enrollment_status(&state, &enrollment_id, payload.status).await?;
    Ok(Json(enrollment))
}
