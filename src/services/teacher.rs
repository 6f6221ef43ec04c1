use time::Date;
use uuid::Uuid;

use crate::core::metrics::record_event;
use crate::core::state::AppState;
use crate::core::time::{is_past_due, primitive_now_utc, today_utc};
use crate::db::models::{Assignment, Course, User};
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::assignment::AssignmentResponse;
use crate::schemas::course::CourseResponse;
use crate::schemas::dashboard::TeacherDashboardResponse;
use crate::schemas::enrollment::{
    group_teacher_students, CourseStudentResponse, TeacherStudentResponse,
};
use crate::schemas::submission::{SubmissionDetailResponse, SubmissionResponse};
use crate::services::access::{ensure_course_owner, ensure_role};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::storage::DownloadedFile;

pub(crate) const MIN_GRADE: f64 = 0.0;
pub(crate) const MAX_GRADE: f64 = 100.0;

pub(crate) struct AssignmentInput<'a> {
    pub(crate) title: &'a str,
    pub(crate) description: &'a str,
    pub(crate) due_date: Option<Date>,
}

pub(crate) async fn dashboard_stats(
    state: &AppState,
    teacher: &User,
) -> ServiceResult<TeacherDashboardResponse> {
    ensure_role(teacher, UserRole::Teacher)?;

    let total_courses = repositories::courses::count_for_teacher(state.db(), &teacher.id).await?;
    let total_students =
        repositories::enrollments::count_distinct_students_for_teacher(state.db(), &teacher.id)
            .await?;
    let total_assignments =
        repositories::assignments::count_for_teacher(state.db(), &teacher.id).await?;
    let pending_submissions =
        repositories::submissions::count_ungraded_for_teacher(state.db(), &teacher.id).await?;

    Ok(TeacherDashboardResponse {
        total_courses,
        total_students,
        total_assignments,
        pending_submissions,
    })
}

pub(crate) async fn my_courses(state: &AppState, teacher: &User) -> ServiceResult<Vec<CourseResponse>> {
    ensure_role(teacher, UserRole::Teacher)?;
    let rows = repositories::courses::list_summaries_for_teacher(state.db(), &teacher.id).await?;
    Ok(rows.into_iter().map(CourseResponse::from_summary).collect())
}

pub(crate) async fn course_students(
    state: &AppState,
    teacher: &User,
    course_id: &str,
) -> ServiceResult<Vec<CourseStudentResponse>> {
    owned_course(state, teacher, course_id).await?;
    let rows = repositories::enrollments::list_students_for_course(state.db(), course_id).await?;
    Ok(rows.into_iter().map(CourseStudentResponse::from_row).collect())
}

pub(crate) async fn course_assignments(
    state: &AppState,
    teacher: &User,
    course_id: &str,
) -> ServiceResult<Vec<AssignmentResponse>> {
    owned_course(state, teacher, course_id).await?;
    let assignments = repositories::assignments::list_for_course(state.db(), course_id).await?;
    Ok(assignments.into_iter().map(AssignmentResponse::from_db).collect())
}

pub(crate) async fn create_assignment(
    state: &AppState,
    teacher: &User,
    course_id: &str,
    input: AssignmentInput<'_>,
) -> ServiceResult<AssignmentResponse> {
    let fields = validate_assignment(&input)?;
    if is_past_due(fields.due_date, today_utc()) {
        return Err(ServiceError::validation("Due date cannot be in the past"));
    }

    owned_course(state, teacher, course_id).await?;

    let now = primitive_now_utc();
    let assignment = repositories::assignments::create(
        state.db(),
        repositories::assignments::CreateAssignment {
            id: &Uuid::new_v4().to_string(),
            course_id,
            title: fields.title,
            description: fields.description,
            due_date: fields.due_date,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    record_event("assignment_created");
    tracing::info!(
        teacher_id = %teacher.id,
        course_id = %course_id,
        assignment_id = %assignment.id,
        action = "assignment_create",
        "Assignment created"
    );
    Ok(AssignmentResponse::from_db(assignment))
}

pub(crate) async fn update_assignment(
    state: &AppState,
    teacher: &User,
    assignment_id: &str,
    input: AssignmentInput<'_>,
) -> ServiceResult<AssignmentResponse> {
    let fields = validate_assignment(&input)?;
    owned_assignment(state, teacher, assignment_id).await?;

    let assignment = repositories::assignments::update(
        state.db(),
        assignment_id,
        repositories::assignments::UpdateAssignment {
            title: fields.title,
            description: fields.description,
            due_date: fields.due_date,
            updated_at: primitive_now_utc(),
        },
    )
    .await?
    .ok_or_else(|| ServiceError::not_found("Assignment not found"))?;

    tracing::info!(
        teacher_id = %teacher.id,
        assignment_id = %assignment_id,
        action = "assignment_update",
        "Assignment updated"
    );
    Ok(AssignmentResponse::from_db(assignment))
}

pub(crate) async fn delete_assignment(
    state: &AppState,
    teacher: &User,
    assignment_id: &str,
) -> ServiceResult<()> {
    owned_assignment(state, teacher, assignment_id).await?;

    let mut tx = state.db().begin().await?;
    let files = repositories::submissions::delete_for_assignment(&mut *tx, assignment_id).await?;
    let deleted = repositories::assignments::delete(&mut *tx, assignment_id).await?;
    if deleted == 0 {
        return Err(ServiceError::not_found("Assignment not found"));
    }
    tx.commit().await?;

    state.storage().delete_all_best_effort(files.into_iter().flatten()).await;

    record_event("assignment_deleted");
    tracing::info!(
        teacher_id = %teacher.id,
        assignment_id = %assignment_id,
        action = "assignment_delete",
        "Assignment deleted"
    );
    Ok(())
}

pub(crate) async fn assignment_submissions(
    state: &AppState,
    teacher: &User,
    assignment_id: &str,
) -> ServiceResult<Vec<SubmissionDetailResponse>> {
    owned_assignment(state, teacher, assignment_id).await?;
    let rows = repositories::submissions::list_for_assignment(state.db(), assignment_id).await?;
    Ok(rows.into_iter().map(SubmissionDetailResponse::from_row).collect())
}

pub(crate) async fn grade_submission(
    state: &AppState,
    teacher: &User,
    submission_id: &str,
    grade: f64,
    feedback: Option<&str>,
) -> ServiceResult<SubmissionResponse> {
    validate_grade(grade)?;
    owned_submission(state, teacher, submission_id).await?;

    let feedback = feedback.map(str::trim).filter(|value| !value.is_empty());
    let submission = repositories::submissions::grade(
        state.db(),
        submission_id,
        grade,
        feedback,
        primitive_now_utc(),
    )
    .await?
    .ok_or_else(|| ServiceError::not_found("Submission not found"))?;

    record_event("submission_graded");
    tracing::info!(
        teacher_id = %teacher.id,
        submission_id = %submission_id,
        grade,
        action = "submission_grade",
        "Submission graded"
    );
    Ok(SubmissionResponse::from_db(submission))
}

pub(crate) async fn submission_file(
    state: &AppState,
    teacher: &User,
    submission_id: &str,
) -> ServiceResult<DownloadedFile> {
    let owner = owned_submission(state, teacher, submission_id).await?;
    let file_name =
        owner.file_name.ok_or_else(|| ServiceError::not_found("Submission has no file"))?;

    let bytes = state.storage().load(&file_name).await?;
    Ok(DownloadedFile { file_name, bytes })
}

pub(crate) async fn my_students(
    state: &AppState,
    teacher: &User,
) -> ServiceResult<Vec<TeacherStudentResponse>> {
    ensure_role(teacher, UserRole::Teacher)?;
    let rows =
        repositories::enrollments::list_students_for_teacher(state.db(), &teacher.id, None).await?;
    Ok(group_teacher_students(rows))
}

pub(crate) async fn student_details(
    state: &AppState,
    teacher: &User,
    student_id: &str,
) -> ServiceResult<TeacherStudentResponse> {
    ensure_role(teacher, UserRole::Teacher)?;
    let rows = repositories::enrollments::list_students_for_teacher(
        state.db(),
        &teacher.id,
        Some(student_id),
    )
    .await?;

    group_teacher_students(rows)
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::not_found("Student not found in your courses"))
}

pub(crate) async fn student_submissions(
    state: &AppState,
    teacher: &User,
    student_id: &str,
) -> ServiceResult<Vec<SubmissionDetailResponse>> {
    ensure_role(teacher, UserRole::Teacher)?;
    let rows = repositories::submissions::list_for_student_in_teacher_courses(
        state.db(),
        student_id,
        &teacher.id,
    )
    .await?;
    Ok(rows.into_iter().map(SubmissionDetailResponse::from_row).collect())
}

pub(crate) fn validate_grade(grade: f64) -> ServiceResult<()> {
    if grade.is_finite() && (MIN_GRADE..=MAX_GRADE).contains(&grade) {
        Ok(())
    } else {
        Err(ServiceError::validation(format!(
            "Grade must be between {MIN_GRADE} and {MAX_GRADE}"
        )))
    }
}

struct AssignmentFields<'a> {
    title: &'a str,
    description: &'a str,
    due_date: Date,
}

fn validate_assignment<'a>(input: &AssignmentInput<'a>) -> ServiceResult<AssignmentFields<'a>> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(ServiceError::validation("Title is required"));
    }
    let description = input.description.trim();
    if description.is_empty() {
        return Err(ServiceError::validation("Description is required"));
    }
    let due_date = input.due_date.ok_or_else(|| ServiceError::validation("Due date is required"))?;

    Ok(AssignmentFields { title, description, due_date })
}

async fn owned_course(state: &AppState, teacher: &User, course_id: &str) -> ServiceResult<Course> {
    ensure_role(teacher, UserRole::Teacher)?;
    let course = repositories::courses::find_by_id(state.db(), course_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Course not found"))?;
    ensure_course_owner(teacher, &course)?;
    Ok(course)
}

async fn owned_assignment(
    state: &AppState,
    teacher: &User,
    assignment_id: &str,
) -> ServiceResult<Assignment> {
    ensure_role(teacher, UserRole::Teacher)?;
    let assignment = repositories::assignments::find_by_id(state.db(), assignment_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Assignment not found"))?;
    owned_course(state, teacher, &assignment.course_id).await?;
    Ok(assignment)
}

async fn owned_submission(
    state: &AppState,
    teacher: &User,
    submission_id: &str,
) -> ServiceResult<repositories::submissions::SubmissionOwnerRow> {
    ensure_role(teacher, UserRole::Teacher)?;
    let owner = repositories::submissions::find_owner(state.db(), submission_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Submission not found"))?;
    owned_course(state, teacher, &owner.course_id).await?;
    Ok(owner)
}
