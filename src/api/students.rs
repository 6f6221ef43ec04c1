use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentStudent, CurrentUser};
use crate::api::handlers::download_response;
use crate::core::state::AppState;
use crate::schemas::assignment::{AssignmentResponse, StudentAssignmentResponse};
use crate::schemas::course::CourseResponse;
use crate::schemas::dashboard::StudentDashboardResponse;
use crate::schemas::enrollment::{EnrollAllResponse, EnrolledCourseResponse, EnrollmentResponse};
use crate::schemas::submission::{GradeResponse, SubmissionDetailResponse, SubmissionResponse};
use crate::schemas::MessageResponse;
use crate::services::student::{self, UploadedFile};

/// Room for multipart framing and the text field on top of the file limit.
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

pub(crate) fn router(max_upload_bytes: u64) -> Router<AppState> {
    let body_limit = usize::try_from(max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES))
        .unwrap_or(usize::MAX);

    Router::new()
        .route("/me/courses", get(my_courses))
        .route("/me/courses/:course_id", get(course_details))
        .route("/me/courses/:course_id/assignments", get(course_assignments))
        .route("/me/assignments/:assignment_id", get(assignment_details))
        .route(
            "/me/assignments/:assignment_id/submit",
            post(submit).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/me/assignments/:assignment_id/submission", get(my_submission))
        .route("/me/assignments/:assignment_id/submission/file", get(my_submission_file))
        .route("/me/submissions", get(my_submissions))
        .route("/me/grades", get(my_grades))
        .route("/:student_id/courses", get(student_courses))
        .route("/:student_id/grades", get(student_grades))
        .route("/:student_id/dashboard", get(student_dashboard))
        .route("/:student_id/enroll/:course_id", post(enroll).delete(unenroll))
        .route("/:student_id/enroll-all", post(enroll_all))
}

async fn my_courses(
    CurrentStudent(user): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<Vec<EnrolledCourseResponse>>, ApiError> {
    Ok(Json(student::enrolled_courses(&state, &user, &user.id).await?))
}

async fn course_details(
    CurrentStudent(user): CurrentStudent,
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<CourseResponse>, ApiError> {
    Ok(Json(student::course_details(&state, &user, &course_id).await?))
}

async fn course_assignments(
    CurrentStudent(user): CurrentStudent,
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<AssignmentResponse>>, ApiError> {
    Ok(Json(student::course_assignments(&state, &user, &course_id).await?))
}

async fn assignment_details(
    CurrentStudent(user): CurrentStudent,
    State(state): State<AppState>,
    Path(assignment_id): Path<String>,
) -> Result<Json<StudentAssignmentResponse>, ApiError> {
    Ok(Json(student::assignment_details(&state, &user, &assignment_id).await?))
}

async fn submit(
    CurrentStudent(user): CurrentStudent,
    State(state): State<AppState>,
    Path(assignment_id): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<SubmissionResponse>), ApiError> {
    let mut text = None;
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("submission_text") | Some("submissionText") => {
                text = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("file") => {
                let original_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some(UploadedFile { original_name, bytes: bytes.to_vec() });
            }
            _ => {}
        }
    }

    let submission = student::submit(&state, &user, &assignment_id, text, file).await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

async fn my_submission(
    CurrentStudent(user): CurrentStudent,
    State(state): State<AppState>,
    Path(assignment_id): Path<String>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    Ok(Json(student::my_submission(&state, &user, &assignment_id).await?))
}

async fn my_submission_file(
    CurrentStudent(user): CurrentStudent,
    State(state): State<AppState>,
    Path(assignment_id): Path<String>,
) -> Result<Response, ApiError> {
    let file = student::submission_file(&state, &user, &assignment_id).await?;
    Ok(download_response(file))
}

async fn my_submissions(
    CurrentStudent(user): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubmissionDetailResponse>>, ApiError> {
    Ok(Json(student::my_submissions(&state, &user).await?))
}

async fn my_grades(
    CurrentStudent(user): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<Vec<GradeResponse>>, ApiError> {
    Ok(Json(student::grades(&state, &user, &user.id).await?))
}

async fn student_courses(
    CurrentStudent(user): CurrentStudent,
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<Vec<EnrolledCourseResponse>>, ApiError> {
    Ok(Json(student::enrolled_courses(&state, &user, &student_id).await?))
}

async fn student_grades(
    CurrentStudent(user): CurrentStudent,
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<Vec<GradeResponse>>, ApiError> {
    Ok(Json(student::grades(&state, &user, &student_id).await?))
}

async fn student_dashboard(
    CurrentStudent(user): CurrentStudent,
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<StudentDashboardResponse>, ApiError> {
    Ok(Json(student::dashboard(&state, &user, &student_id).await?))
}

async fn enroll(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path((student_id, course_id)): Path<(String, String)>,
) -> Result<(StatusCode, Json<EnrollmentResponse>), ApiError> {
    let enrollment = student::enroll(&state, &user, &student_id, &course_id).await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

async fn unenroll(
    CurrentStudent(user): CurrentStudent,
    State(state): State<AppState>,
    Path((student_id, course_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    student::unenroll(&state, &user, &student_id, &course_id).await?;
    Ok(Json(MessageResponse::new("Successfully unenrolled from course")))
}

async fn enroll_all(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<EnrollAllResponse>, ApiError> {
    let enrolled = student::enroll_in_all(&state, &user, &student_id).await?;
    Ok(Json(EnrollAllResponse {
        enrolled,
        message: format!("Enrolled in {enrolled} new course(s)"),
    }))
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge("Upload exceeds the allowed size".to_string())
    } else {
        ApiError::BadRequest(format!("Invalid multipart payload: {}", err.body_text()))
    }
}
