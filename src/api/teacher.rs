use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    routing::{get, post, put},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentTeacher;
use crate::api::handlers::download_response;
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::schemas::assignment::{AssignmentRequest, AssignmentResponse};
use crate::schemas::course::CourseResponse;
use crate::schemas::dashboard::TeacherDashboardResponse;
use crate::schemas::enrollment::{CourseStudentResponse, TeacherStudentResponse};
use crate::schemas::submission::{GradeRequest, SubmissionDetailResponse, SubmissionResponse};
use crate::schemas::MessageResponse;
use crate::services::teacher::{self, AssignmentInput};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/courses", get(my_courses))
        .route("/courses/:course_id/students", get(course_students))
        .route(
            "/courses/:course_id/assignments",
            get(course_assignments).post(create_assignment),
        )
        .route("/assignments/:assignment_id", put(update_assignment).delete(delete_assignment))
        .route("/assignments/:assignment_id/submissions", get(assignment_submissions))
        .route("/submissions/:submission_id/grade", post(grade_submission))
        .route("/submissions/:submission_id/file", get(submission_file))
        .route("/students", get(my_students))
        .route("/students/:student_id", get(student_details))
        .route("/students/:student_id/submissions", get(student_submissions))
}

async fn dashboard(
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<TeacherDashboardResponse>, ApiError> {
    Ok(Json(teacher::dashboard_stats(&state, &user).await?))
}

async fn my_courses(
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    Ok(Json(teacher::my_courses(&state, &user).await?))
}

async fn course_students(
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<CourseStudentResponse>>, ApiError> {
    Ok(Json(teacher::course_students(&state, &user, &course_id).await?))
}

async fn course_assignments(
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<AssignmentResponse>>, ApiError> {
    Ok(Json(teacher::course_assignments(&state, &user, &course_id).await?))
}

async fn create_assignment(
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Json(payload): Json<AssignmentRequest>,
) -> Result<(StatusCode, Json<AssignmentResponse>), ApiError> {
    validate_payload(&payload)?;
    let assignment =
        teacher::create_assignment(&state, &user, &course_id, assignment_input(&payload)).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

async fn update_assignment(
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
    Path(assignment_id): Path<String>,
    Json(payload): Json<AssignmentRequest>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    validate_payload(&payload)?;
    let assignment =
        teacher::update_assignment(&state, &user, &assignment_id, assignment_input(&payload))
            .await?;
    Ok(Json(assignment))
}

async fn delete_assignment(
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
    Path(assignment_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    teacher::delete_assignment(&state, &user, &assignment_id).await?;
    Ok(Json(MessageResponse::new("Assignment deleted successfully")))
}

async fn assignment_submissions(
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
    Path(assignment_id): Path<String>,
) -> Result<Json<Vec<SubmissionDetailResponse>>, ApiError> {
    Ok(Json(teacher::assignment_submissions(&state, &user, &assignment_id).await?))
}

async fn grade_submission(
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
    Path(submission_id): Path<String>,
    Json(payload): Json<GradeRequest>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    validate_payload(&payload)?;
    let submission = teacher::grade_submission(
        &state,
        &user,
        &submission_id,
        payload.grade,
        payload.feedback.as_deref(),
    )
    .await?;
    Ok(Json(submission))
}

async fn submission_file(
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
    Path(submission_id): Path<String>,
) -> Result<Response, ApiError> {
    let file = teacher::submission_file(&state, &user, &submission_id).await?;
    Ok(download_response(file))
}

async fn my_students(
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<Vec<TeacherStudentResponse>>, ApiError> {
    Ok(Json(teacher::my_students(&state, &user).await?))
}

async fn student_details(
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<TeacherStudentResponse>, ApiError> {
    Ok(Json(teacher::student_details(&state, &user, &student_id).await?))
}

async fn student_submissions(
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<Vec<SubmissionDetailResponse>>, ApiError> {
    Ok(Json(teacher::student_submissions(&state, &user, &student_id).await?))
}

fn assignment_input(payload: &AssignmentRequest) -> AssignmentInput<'_> {
    AssignmentInput {
        title: &payload.title,
        description: &payload.description,
        due_date: payload.due_date,
    }
}
