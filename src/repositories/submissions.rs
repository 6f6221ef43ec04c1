use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::models::Submission;
use crate::db::types::SubmissionStatus;

const COLUMNS: &str = "\
    id, assignment_id, student_id, submission_text, file_name, file_size, file_hash, \
    submitted_at, grade, feedback, graded_at, status";

pub(crate) struct CreateSubmission<'a> {
    pub(crate) id: &'a str,
    pub(crate) assignment_id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) submission_text: Option<&'a str>,
    pub(crate) file_name: Option<&'a str>,
    pub(crate) file_size: Option<i64>,
    pub(crate) file_hash: Option<&'a str>,
    pub(crate) submitted_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct SubmissionDetailRow {
    pub(crate) id: String,
    pub(crate) assignment_id: String,
    pub(crate) assignment_title: String,
    pub(crate) course_id: String,
    pub(crate) course_name: String,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) student_email: String,
    pub(crate) submission_text: Option<String>,
    pub(crate) file_name: Option<String>,
    pub(crate) file_size: Option<i64>,
    pub(crate) submitted_at: PrimitiveDateTime,
    pub(crate) grade: Option<f64>,
    pub(crate) feedback: Option<String>,
    pub(crate) graded_at: Option<PrimitiveDateTime>,
    pub(crate) status: SubmissionStatus,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct SubmissionOwnerRow {
    pub(crate) course_id: String,
    pub(crate) file_name: Option<String>,
}

const DETAIL_SELECT: &str = "\
    SELECT s.id, s.assignment_id, a.title AS assignment_title,
           c.id AS course_id, c.name AS course_name,
           u.id AS student_id, u.name AS student_name, u.email AS student_email,
           s.submission_text, s.file_name, s.file_size, s.submitted_at,
           s.grade, s.feedback, s.graded_at, s.status
    FROM submissions s
    JOIN assignments a ON a.id = s.assignment_id
    JOIN courses c ON c.id = a.course_id
    JOIN users u ON u.id = s.student_id";

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateSubmission<'_>,
) -> Result<Submission, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "INSERT INTO submissions (
            id, assignment_id, student_id, submission_text, file_name, file_size, file_hash,
            submitted_at, status
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,'submitted')
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.assignment_id)
    .bind(params.student_id)
    .bind(params.submission_text)
    .bind(params.file_name)
    .bind(params.file_size)
    .bind(params.file_hash)
    .bind(params.submitted_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_owner(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<SubmissionOwnerRow>, sqlx::Error> {
    sqlx::query_as::<_, SubmissionOwnerRow>(
        "SELECT a.course_id, s.file_name
         FROM submissions s
         JOIN assignments a ON a.id = s.assignment_id
         WHERE s.id = $1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn find_for_assignment_student(
    executor: impl sqlx::PgExecutor<'_>,
    assignment_id: &str,
    student_id: &str,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS} FROM submissions WHERE assignment_id = $1 AND student_id = $2"
    ))
    .bind(assignment_id)
    .bind(student_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn list_for_assignment(
    executor: impl sqlx::PgExecutor<'_>,
    assignment_id: &str,
) -> Result<Vec<SubmissionDetailRow>, sqlx::Error> {
    sqlx::query_as::<_, SubmissionDetailRow>(&format!(
        "{DETAIL_SELECT} WHERE s.assignment_id = $1 ORDER BY s.submitted_at, s.id"
    ))
    .bind(assignment_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_for_student(
    executor: impl sqlx::PgExecutor<'_>,
    student_id: &str,
) -> Result<Vec<SubmissionDetailRow>, sqlx::Error> {
    sqlx::query_as::<_, SubmissionDetailRow>(&format!(
        "{DETAIL_SELECT} WHERE s.student_id = $1 ORDER BY s.submitted_at DESC, s.id"
    ))
    .bind(student_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_for_student_in_teacher_courses(
    executor: impl sqlx::PgExecutor<'_>,
    student_id: &str,
    teacher_id: &str,
) -> Result<Vec<SubmissionDetailRow>, sqlx::Error> {
    sqlx::query_as::<_, SubmissionDetailRow>(&format!(
        "{DETAIL_SELECT} WHERE s.student_id = $1 AND c.teacher_id = $2
         ORDER BY s.submitted_at DESC, s.id"
    ))
    .bind(student_id)
    .bind(teacher_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_graded_for_student(
    executor: impl sqlx::PgExecutor<'_>,
    student_id: &str,
    limit: Option<i64>,
) -> Result<Vec<SubmissionDetailRow>, sqlx::Error> {
    sqlx::query_as::<_, SubmissionDetailRow>(&format!(
        "{DETAIL_SELECT} WHERE s.student_id = $1 AND s.grade IS NOT NULL
         ORDER BY s.graded_at DESC NULLS LAST, s.submitted_at DESC, s.id
         LIMIT $2"
    ))
    .bind(student_id)
    .bind(limit)
    .fetch_all(executor)
    .await
}

pub(crate) async fn count_ungraded_for_teacher(
    executor: impl sqlx::PgExecutor<'_>,
    teacher_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM submissions s
         JOIN assignments a ON a.id = s.assignment_id
         JOIN courses c ON c.id = a.course_id
         WHERE c.teacher_id = $1 AND s.grade IS NULL",
    )
    .bind(teacher_id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn grade(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    grade: f64,
    feedback: Option<&str>,
    graded_at: PrimitiveDateTime,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "UPDATE submissions SET grade = $1, feedback = $2, graded_at = $3, status = $4
         WHERE id = $5
         RETURNING {COLUMNS}",
    ))
    .bind(grade)
    .bind(feedback)
    .bind(graded_at)
    .bind(SubmissionStatus::Graded)
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn delete_for_assignment(
    executor: impl sqlx::PgExecutor<'_>,
    assignment_id: &str,
) -> Result<Vec<Option<String>>, sqlx::Error> {
    sqlx::query_scalar::<_, Option<String>>(
        "DELETE FROM submissions WHERE assignment_id = $1 RETURNING file_name",
    )
    .bind(assignment_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn delete_for_course(
    executor: impl sqlx::PgExecutor<'_>,
    course_id: &str,
) -> Result<Vec<Option<String>>, sqlx::Error> {
    sqlx::query_scalar::<_, Option<String>>(
        "DELETE FROM submissions
         WHERE assignment_id IN (SELECT id FROM assignments WHERE course_id = $1)
         RETURNING file_name",
    )
    .bind(course_id)
    .fetch_all(executor)
    .await
}
