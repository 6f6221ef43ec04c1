use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::schemas::course::{CourseRequest, CourseResponse};
use crate::schemas::MessageResponse;
use crate::services::admin::{self, CourseInput};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/:course_id", get(get_course).put(update_course).delete(delete_course))
}

pub(crate) async fn list_courses(State(state): State<AppState>) -> Json<Vec<CourseResponse>> {
    Json(admin::list_courses(&state).await)
}

async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<CourseResponse>, ApiError> {
    Ok(Json(admin::get_course(&state, &course_id).await?))
}

pub(crate) async fn create_course(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<CourseRequest>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiError> {
    validate_payload(&payload)?;
    let course = admin::create_course(&state, course_input(&payload)).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

pub(crate) async fn update_course(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Json(payload): Json<CourseRequest>,
) -> Result<Json<CourseResponse>, ApiError> {
    validate_payload(&payload)?;
    let course = admin::update_course(&state, &course_id, course_input(&payload)).await?;
    Ok(Json(course))
}

pub(crate) async fn delete_course(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    admin::delete_course(&state, &course_id).await?;
    Ok(Json(MessageResponse::new("Course deleted successfully")))
}

fn course_input(payload: &CourseRequest) -> CourseInput<'_> {
    CourseInput {
        name: &payload.name,
        description: payload.description.as_deref(),
        teacher_id: payload.teacher_id.as_deref(),
    }
}

#[cfg(test)]
mod tests;
