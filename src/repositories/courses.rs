use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::models::Course;

const COLUMNS: &str = "id, name, description, teacher_id, created_at, updated_at";

pub(crate) struct CreateCourse<'a> {
    pub(crate) id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) teacher_id: Option<&'a str>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) struct UpdateCourse<'a> {
    pub(crate) name: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) teacher_id: Option<&'a str>,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct CourseSummaryRow {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) teacher_id: Option<String>,
    pub(crate) teacher_name: Option<String>,
    pub(crate) teacher_email: Option<String>,
    pub(crate) enrollment_count: i64,
    pub(crate) assignment_count: i64,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

const SUMMARY_SELECT: &str = "\
    SELECT c.id, c.name, c.description, c.teacher_id,
           t.name AS teacher_name, t.email AS teacher_email,
           (SELECT COUNT(*) FROM enrollments e WHERE e.course_id = c.id) AS enrollment_count,
           (SELECT COUNT(*) FROM assignments a WHERE a.course_id = c.id) AS assignment_count,
           c.created_at, c.updated_at
    FROM courses c
    LEFT JOIN users t ON t.id = c.teacher_id";

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateCourse<'_>,
) -> Result<Course, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "INSERT INTO courses (id, name, description, teacher_id, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.description)
    .bind(params.teacher_id)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn update(
    executor: impl sqlx::PgExecutor<'_>,
    course_id: &str,
    params: UpdateCourse<'_>,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "UPDATE courses SET name = $1, description = $2, teacher_id = $3, updated_at = $4
         WHERE id = $5
         RETURNING {COLUMNS}",
    ))
    .bind(params.name)
    .bind(params.description)
    .bind(params.teacher_id)
    .bind(params.updated_at)
    .bind(course_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    course_id: &str,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COLUMNS} FROM courses WHERE id = $1"))
        .bind(course_id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn find_summary(
    executor: impl sqlx::PgExecutor<'_>,
    course_id: &str,
) -> Result<Option<CourseSummaryRow>, sqlx::Error> {
    sqlx::query_as::<_, CourseSummaryRow>(&format!("{SUMMARY_SELECT} WHERE c.id = $1"))
        .bind(course_id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn list_summaries(
    executor: impl sqlx::PgExecutor<'_>,
) -> Result<Vec<CourseSummaryRow>, sqlx::Error> {
    sqlx::query_as::<_, CourseSummaryRow>(&format!("{SUMMARY_SELECT} ORDER BY c.name, c.id"))
        .fetch_all(executor)
        .await
}

pub(crate) async fn list_summaries_for_teacher(
    executor: impl sqlx::PgExecutor<'_>,
    teacher_id: &str,
) -> Result<Vec<CourseSummaryRow>, sqlx::Error> {
    sqlx::query_as::<_, CourseSummaryRow>(&format!(
        "{SUMMARY_SELECT} WHERE c.teacher_id = $1 ORDER BY c.name, c.id"
    ))
    .bind(teacher_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn count_all(executor: impl sqlx::PgExecutor<'_>) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses").fetch_one(executor).await
}

pub(crate) async fn count_for_teacher(
    executor: impl sqlx::PgExecutor<'_>,
    teacher_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses WHERE teacher_id = $1")
        .bind(teacher_id)
        .fetch_one(executor)
        .await
}

pub(crate) async fn list_ids_not_enrolled(
    executor: impl sqlx::PgExecutor<'_>,
    student_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT c.id FROM courses c
         WHERE NOT EXISTS (
             SELECT 1 FROM enrollments e
             WHERE e.course_id = c.id AND e.student_id = $1 AND e.status <> 'dropped'
         )
         ORDER BY c.created_at, c.id",
    )
    .bind(student_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn detach_teacher(
    executor: impl sqlx::PgExecutor<'_>,
    course_id: &str,
    updated_at: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE courses SET teacher_id = NULL, updated_at = $1 WHERE id = $2")
        .bind(updated_at)
        .bind(course_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) async fn delete(
    executor: impl sqlx::PgExecutor<'_>,
    course_id: &str,
) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM courses WHERE id = $1").bind(course_id).execute(executor).await?;
    Ok(result.rows_affected())
}
