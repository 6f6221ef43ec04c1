use uuid::Uuid;

use crate::core::metrics::record_event;
use crate::core::state::AppState;
use crate::core::time::{is_past_due, primitive_now_utc, today_utc};
use crate::db::models::{Assignment, Course, Submission, User};
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::assignment::{
    AssignmentResponse, StudentAssignmentResponse, UpcomingAssignmentResponse,
};
use crate::schemas::course::CourseResponse;
use crate::schemas::dashboard::StudentDashboardResponse;
use crate::schemas::enrollment::{EnrolledCourseResponse, EnrollmentResponse};
use crate::schemas::submission::{GradeResponse, SubmissionDetailResponse, SubmissionResponse};
use crate::services::access::{ensure_enrolled, ensure_role, ensure_self, ensure_self_or_admin};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::storage::{DownloadedFile, StoredFile};

const DASHBOARD_UPCOMING_LIMIT: i64 = 5;
const DASHBOARD_GRADES_LIMIT: i64 = 5;

pub(crate) struct UploadedFile {
    pub(crate) original_name: Option<String>,
    pub(crate) bytes: Vec<u8>,
}

pub(crate) async fn enroll(
    state: &AppState,
    actor: &User,
    student_id: &str,
    course_id: &str,
) -> ServiceResult<EnrollmentResponse> {
    ensure_self_or_admin(actor, student_id)?;

    let mut tx = state.db().begin().await?;

    let student = repositories::users::find_by_id(&mut *tx, student_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Student not found"))?;
    if student.role != UserRole::Student {
        return Err(ServiceError::validation("Only students can be enrolled in courses"));
    }
    if repositories::courses::find_by_id(&mut *tx, course_id).await?.is_none() {
        return Err(ServiceError::not_found("Course not found"));
    }
    if repositories::enrollments::find_active(&mut *tx, student_id, course_id).await?.is_some() {
        return Err(ServiceError::conflict("Student is already enrolled in this course"));
    }

    let enrollment = repositories::enrollments::create(
        &mut *tx,
        &Uuid::new_v4().to_string(),
        student_id,
        course_id,
        primitive_now_utc(),
    )
    .await
    .map_err(|err| {
        ServiceError::on_unique_violation(err, "Student is already enrolled in this course")
    })?;

    tx.commit().await?;

    record_event("enrollment_created");
    tracing::info!(
        actor_id = %actor.id,
        student_id = %student_id,
        course_id = %course_id,
        action = "enroll",
        "Student enrolled"
    );
    Ok(EnrollmentResponse::from_db(enrollment))
}

pub(crate) async fn unenroll(
    state: &AppState,
    actor: &User,
    student_id: &str,
    course_id: &str,
) -> ServiceResult<()> {
    ensure_self(actor, student_id)?;

    let deleted =
        repositories::enrollments::delete_active(state.db(), student_id, course_id).await?;
    if deleted == 0 {
        return Err(ServiceError::not_found("Enrollment not found"));
    }

    record_event("enrollment_deleted");
    tracing::info!(student_id = %student_id, course_id = %course_id, action = "unenroll", "Student unenrolled");
    Ok(())
}

pub(crate) async fn enroll_in_all(
    state: &AppState,
    actor: &User,
    student_id: &str,
) -> ServiceResult<usize> {
    ensure_self_or_admin(actor, student_id)?;

    let mut tx = state.db().begin().await?;

    let student = repositories::users::find_by_id(&mut *tx, student_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Student not found"))?;
    if student.role != UserRole::Student {
        return Err(ServiceError::validation("Only students can be enrolled in courses"));
    }

    let course_ids = repositories::courses::list_ids_not_enrolled(&mut *tx, student_id).await?;
    let now = primitive_now_utc();
    let mut created = 0;
    for course_id in &course_ids {
        let inserted = repositories::enrollments::create_if_absent(
            &mut *tx,
            &Uuid::new_v4().to_string(),
            student_id,
            course_id,
            now,
        )
        .await?;
        if inserted.is_some() {
            created += 1;
        }
    }

    tx.commit().await?;

    tracing::info!(student_id = %student_id, created, action = "enroll_all", "Bulk enrollment finished");
    Ok(created)
}

pub(crate) async fn enrollment_history(
    state: &AppState,
    actor: &User,
    student_id: &str,
) -> ServiceResult<Vec<EnrolledCourseResponse>> {
    ensure_self_or_admin(actor, student_id)?;
    let rows = repositories::enrollments::list_for_student(state.db(), student_id).await?;
    Ok(rows.into_iter().map(EnrolledCourseResponse::from_row).collect())
}

pub(crate) async fn delete_enrollment(
    state: &AppState,
    actor: &User,
    enrollment_id: &str,
) -> ServiceResult<()> {
    let enrollment = repositories::enrollments::find_by_id(state.db(), enrollment_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Enrollment not found"))?;
    ensure_self_or_admin(actor, &enrollment.student_id)?;

    let deleted = repositories::enrollments::delete(state.db(), enrollment_id).await?;
    if deleted == 0 {
        return Err(ServiceError::not_found("Enrollment not found"));
    }

    record_event("enrollment_deleted");
    tracing::info!(
        actor_id = %actor.id,
        enrollment_id = %enrollment_id,
        action = "enrollment_delete",
        "Enrollment deleted"
    );
    Ok(())
}

pub(crate) async fn enrolled_courses(
    state: &AppState,
    actor: &User,
    student_id: &str,
) -> ServiceResult<Vec<EnrolledCourseResponse>> {
    ensure_self(actor, student_id)?;

    match repositories::enrollments::list_active_for_student(state.db(), student_id).await {
        Ok(rows) => Ok(rows.into_iter().map(EnrolledCourseResponse::from_row).collect()),
        Err(err) => {
            tracing::error!(error = %err, student_id = %student_id, "Failed to list enrolled courses");
            Ok(Vec::new())
        }
    }
}

pub(crate) async fn course_details(
    state: &AppState,
    student: &User,
    course_id: &str,
) -> ServiceResult<CourseResponse> {
    enrolled_course(state, student, course_id).await?;
    repositories::courses::find_summary(state.db(), course_id)
        .await?
        .map(CourseResponse::from_summary)
        .ok_or_else(|| ServiceError::not_found("Course not found"))
}

pub(crate) async fn course_assignments(
    state: &AppState,
    student: &User,
    course_id: &str,
) -> ServiceResult<Vec<AssignmentResponse>> {
    enrolled_course(state, student, course_id).await?;
    let assignments = repositories::assignments::list_for_course(state.db(), course_id).await?;
    Ok(assignments.into_iter().map(AssignmentResponse::from_db).collect())
}

pub(crate) async fn assignment_details(
    state: &AppState,
    student: &User,
    assignment_id: &str,
) -> ServiceResult<StudentAssignmentResponse> {
    let (assignment, course) = enrolled_assignment(state, student, assignment_id).await?;
    let submission = repositories::submissions::find_for_assignment_student(
        state.db(),
        assignment_id,
        &student.id,
    )
    .await?;

    Ok(StudentAssignmentResponse {
        past_due: is_past_due(assignment.due_date, today_utc()),
        assignment: AssignmentResponse::from_db(assignment),
        course_name: course.name,
        submission: submission.map(SubmissionResponse::from_db),
    })
}

pub(crate) async fn submit(
    state: &AppState,
    student: &User,
    assignment_id: &str,
    text: Option<String>,
    file: Option<UploadedFile>,
) -> ServiceResult<SubmissionResponse> {
    let (assignment, _) = enrolled_assignment(state, student, assignment_id).await?;

    if is_past_due(assignment.due_date, today_utc()) {
        return Err(ServiceError::validation("The due date for this assignment has passed"));
    }

    let text = text.map(|value| value.trim().to_string()).filter(|value| !value.is_empty());
    let file = file.filter(|upload| !upload.bytes.is_empty());
    if text.is_none() && file.is_none() {
        return Err(ServiceError::validation("Submission text or file is required"));
    }

    let existing = repositories::submissions::find_for_assignment_student(
        state.db(),
        assignment_id,
        &student.id,
    )
    .await?;
    if existing.is_some() {
        return Err(ServiceError::conflict("You have already submitted this assignment"));
    }

    let stored = match file {
        Some(upload) => {
            Some(state.storage().store(upload.original_name.as_deref(), &upload.bytes).await?)
        }
        None => None,
    };

    let inserted = insert_submission(state, student, assignment_id, text.as_deref(), stored.as_ref())
        .await;

    let submission = match inserted {
        Ok(submission) => submission,
        Err(err) => {
            if let Some(stored) = &stored {
                state.storage().delete_all_best_effort([stored.file_name.clone()]).await;
            }
            return Err(ServiceError::on_unique_violation(
                err,
                "You have already submitted this assignment",
            ));
        }
    };

    record_event("submission_created");
    tracing::info!(
        student_id = %student.id,
        assignment_id = %assignment_id,
        submission_id = %submission.id,
        has_file = stored.is_some(),
        action = "submit",
        "Submission received"
    );
    Ok(SubmissionResponse::from_db(submission))
}

pub(crate) async fn my_submission(
    state: &AppState,
    student: &User,
    assignment_id: &str,
) -> ServiceResult<SubmissionResponse> {
    ensure_role(student, UserRole::Student)?;
    repositories::submissions::find_for_assignment_student(state.db(), assignment_id, &student.id)
        .await?
        .map(SubmissionResponse::from_db)
        .ok_or_else(|| ServiceError::not_found("Submission not found"))
}

pub(crate) async fn submission_file(
    state: &AppState,
    student: &User,
    assignment_id: &str,
) -> ServiceResult<DownloadedFile> {
    ensure_role(student, UserRole::Student)?;
    let submission = repositories::submissions::find_for_assignment_student(
        state.db(),
        assignment_id,
        &student.id,
    )
    .await?
    .ok_or_else(|| ServiceError::not_found("Submission not found"))?;

    let file_name =
        submission.file_name.ok_or_else(|| ServiceError::not_found("Submission has no file"))?;
    let bytes = state.storage().load(&file_name).await?;
    Ok(DownloadedFile { file_name, bytes })
}

pub(crate) async fn my_submissions(
    state: &AppState,
    student: &User,
) -> ServiceResult<Vec<SubmissionDetailResponse>> {
    ensure_role(student, UserRole::Student)?;
    let rows = repositories::submissions::list_for_student(state.db(), &student.id).await?;
    Ok(rows.into_iter().map(SubmissionDetailResponse::from_row).collect())
}

pub(crate) async fn grades(
    state: &AppState,
    actor: &User,
    student_id: &str,
) -> ServiceResult<Vec<GradeResponse>> {
    ensure_self(actor, student_id)?;

    match repositories::submissions::list_graded_for_student(state.db(), student_id, None).await {
        Ok(rows) => Ok(rows.into_iter().map(GradeResponse::from_row).collect()),
        Err(err) => {
            tracing::error!(error = %err, student_id = %student_id, "Failed to list grades");
            Ok(Vec::new())
        }
    }
}

pub(crate) async fn dashboard(
    state: &AppState,
    actor: &User,
    student_id: &str,
) -> ServiceResult<StudentDashboardResponse> {
    let courses = enrolled_courses(state, actor, student_id).await?;

    let upcoming = repositories::assignments::list_upcoming_unsubmitted(
        state.db(),
        student_id,
        today_utc(),
        DASHBOARD_UPCOMING_LIMIT,
    )
    .await?;
    let recent = repositories::submissions::list_graded_for_student(
        state.db(),
        student_id,
        Some(DASHBOARD_GRADES_LIMIT),
    )
    .await?;

    Ok(StudentDashboardResponse {
        courses,
        upcoming_assignments: upcoming.into_iter().map(UpcomingAssignmentResponse::from_row).collect(),
        recent_grades: recent.into_iter().map(GradeResponse::from_row).collect(),
    })
}

async fn insert_submission(
    state: &AppState,
    student: &User,
    assignment_id: &str,
    text: Option<&str>,
    stored: Option<&StoredFile>,
) -> Result<Submission, sqlx::Error> {
    let mut tx = state.db().begin().await?;
    let submission = repositories::submissions::create(
        &mut *tx,
        repositories::submissions::CreateSubmission {
            id: &Uuid::new_v4().to_string(),
            assignment_id,
            student_id: &student.id,
            submission_text: text,
            file_name: stored.map(|file| file.file_name.as_str()),
            file_size: stored.map(|file| file.size),
            file_hash: stored.map(|file| file.sha256.as_str()),
            submitted_at: primitive_now_utc(),
        },
    )
    .await?;
    tx.commit().await?;
    Ok(submission)
}

async fn enrolled_course(state: &AppState, student: &User, course_id: &str) -> ServiceResult<Course> {
    ensure_role(student, UserRole::Student)?;
    let course = repositories::courses::find_by_id(state.db(), course_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Course not found"))?;
    ensure_enrolled(state.db(), student, course_id).await?;
    Ok(course)
}

async fn enrolled_assignment(
    state: &AppState,
    student: &User,
    assignment_id: &str,
) -> ServiceResult<(Assignment, Course)> {
    ensure_role(student, UserRole::Student)?;
    let assignment = repositories::assignments::find_by_id(state.db(), assignment_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Assignment not found"))?;
    let course = enrolled_course(state, student, &assignment.course_id).await?;
    Ok((assignment, course))
}

#[cfg(test)]
mod tests;
