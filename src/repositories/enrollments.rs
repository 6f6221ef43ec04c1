use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::models::Enrollment;
use crate::db::types::EnrollmentStatus;

const COLUMNS: &str = "id, student_id, course_id, status, enrolled_at";

#[derive(Debug, Clone, FromRow)]
pub(crate) struct EnrolledCourseRow {
    pub(crate) enrollment_id: String,
    pub(crate) course_id: String,
    pub(crate) course_name: String,
    pub(crate) course_description: Option<String>,
    pub(crate) teacher_id: Option<String>,
    pub(crate) teacher_name: Option<String>,
    pub(crate) status: EnrollmentStatus,
    pub(crate) enrolled_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct CourseStudentRow {
    pub(crate) enrollment_id: String,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) student_email: String,
    pub(crate) course_id: String,
    pub(crate) course_name: String,
    pub(crate) status: EnrollmentStatus,
    pub(crate) enrolled_at: PrimitiveDateTime,
}

const ENROLLED_COURSE_SELECT: &str = "\
    SELECT e.id AS enrollment_id, c.id AS course_id, c.name AS course_name,
           c.description AS course_description, c.teacher_id, t.name AS teacher_name,
           e.status, e.enrolled_at
    FROM enrollments e
    JOIN courses c ON c.id = e.course_id
    LEFT JOIN users t ON t.id = c.teacher_id";

const COURSE_STUDENT_SELECT: &str = "\
    SELECT e.id AS enrollment_id, u.id AS student_id, u.name AS student_name,
           u.email AS student_email, c.id AS course_id, c.name AS course_name,
           e.status, e.enrolled_at
    FROM enrollments e
    JOIN users u ON u.id = e.student_id
    JOIN courses c ON c.id = e.course_id";

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    student_id: &str,
    course_id: &str,
    enrolled_at: PrimitiveDateTime,
) -> Result<Enrollment, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "INSERT INTO enrollments (id, student_id, course_id, status, enrolled_at)
         VALUES ($1,$2,$3,'enrolled',$4)
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(student_id)
    .bind(course_id)
    .bind(enrolled_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn create_if_absent(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    student_id: &str,
    course_id: &str,
    enrolled_at: PrimitiveDateTime,
) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "INSERT INTO enrollments (id, student_id, course_id, status, enrolled_at)
         VALUES ($1,$2,$3,'enrolled',$4)
         ON CONFLICT (student_id, course_id) WHERE status <> 'dropped' DO NOTHING
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(student_id)
    .bind(course_id)
    .bind(enrolled_at)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!("SELECT {COLUMNS} FROM enrollments WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn find_active(
    executor: impl sqlx::PgExecutor<'_>,
    student_id: &str,
    course_id: &str,
) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "SELECT {COLUMNS} FROM enrollments
         WHERE student_id = $1 AND course_id = $2 AND status <> 'dropped'"
    ))
    .bind(student_id)
    .bind(course_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn count_for_course(
    executor: impl sqlx::PgExecutor<'_>,
    course_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM enrollments WHERE course_id = $1")
        .bind(course_id)
        .fetch_one(executor)
        .await
}

pub(crate) async fn list_for_student(
    executor: impl sqlx::PgExecutor<'_>,
    student_id: &str,
) -> Result<Vec<EnrolledCourseRow>, sqlx::Error> {
    sqlx::query_as::<_, EnrolledCourseRow>(&format!(
        "{ENROLLED_COURSE_SELECT} WHERE e.student_id = $1 ORDER BY e.enrolled_at, e.id"
    ))
    .bind(student_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_active_for_student(
    executor: impl sqlx::PgExecutor<'_>,
    student_id: &str,
) -> Result<Vec<EnrolledCourseRow>, sqlx::Error> {
    sqlx::query_as::<_, EnrolledCourseRow>(&format!(
        "{ENROLLED_COURSE_SELECT}
         WHERE e.student_id = $1 AND e.status <> 'dropped'
         ORDER BY c.name, c.id"
    ))
    .bind(student_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_students_for_course(
    executor: impl sqlx::PgExecutor<'_>,
    course_id: &str,
) -> Result<Vec<CourseStudentRow>, sqlx::Error> {
    sqlx::query_as::<_, CourseStudentRow>(&format!(
        "{COURSE_STUDENT_SELECT} WHERE e.course_id = $1 ORDER BY u.name, u.id"
    ))
    .bind(course_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_students_for_teacher(
    executor: impl sqlx::PgExecutor<'_>,
    teacher_id: &str,
    student_id: Option<&str>,
) -> Result<Vec<CourseStudentRow>, sqlx::Error> {
    sqlx::query_as::<_, CourseStudentRow>(&format!(
        "{COURSE_STUDENT_SELECT}
         WHERE c.teacher_id = $1 AND ($2::varchar IS NULL OR u.id = $2)
         ORDER BY u.name, u.id, c.name"
    ))
    .bind(teacher_id)
    .bind(student_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn count_distinct_students_for_teacher(
    executor: impl sqlx::PgExecutor<'_>,
    teacher_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(DISTINCT e.student_id)
         FROM enrollments e
         JOIN courses c ON c.id = e.course_id
         WHERE c.teacher_id = $1",
    )
    .bind(teacher_id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn update_status(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    status: EnrollmentStatus,
) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "UPDATE enrollments SET status = $1 WHERE id = $2 RETURNING {COLUMNS}"
    ))
    .bind(status)
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn delete(executor: impl sqlx::PgExecutor<'_>, id: &str) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM enrollments WHERE id = $1").bind(id).execute(executor).await?;
    Ok(result.rows_affected())
}

pub(crate) async fn delete_active(
    executor: impl sqlx::PgExecutor<'_>,
    student_id: &str,
    course_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM enrollments WHERE student_id = $1 AND course_id = $2 AND status <> 'dropped'",
    )
    .bind(student_id)
    .bind(course_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
