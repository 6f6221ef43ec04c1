use sqlx::FromRow;
use time::{Date, PrimitiveDateTime};

use crate::db::models::Assignment;

const COLUMNS: &str = "id, course_id, title, description, due_date, created_at, updated_at";

pub(crate) struct CreateAssignment<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: &'a str,
    pub(crate) due_date: Date,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) struct UpdateAssignment<'a> {
    pub(crate) title: &'a str,
    pub(crate) description: &'a str,
    pub(crate) due_date: Date,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct AssignmentWithCourseRow {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) course_name: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) due_date: Date,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateAssignment<'_>,
) -> Result<Assignment, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!(
        "INSERT INTO assignments (id, course_id, title, description, due_date, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6,$7)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.due_date)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn update(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    params: UpdateAssignment<'_>,
) -> Result<Option<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!(
        "UPDATE assignments SET title = $1, description = $2, due_date = $3, updated_at = $4
         WHERE id = $5
         RETURNING {COLUMNS}",
    ))
    .bind(params.title)
    .bind(params.description)
    .bind(params.due_date)
    .bind(params.updated_at)
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!("SELECT {COLUMNS} FROM assignments WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn list_for_course(
    executor: impl sqlx::PgExecutor<'_>,
    course_id: &str,
) -> Result<Vec<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!(
        "SELECT {COLUMNS} FROM assignments WHERE course_id = $1 ORDER BY due_date, created_at, id"
    ))
    .bind(course_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn count_for_teacher(
    executor: impl sqlx::PgExecutor<'_>,
    teacher_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM assignments a
         JOIN courses c ON c.id = a.course_id
         WHERE c.teacher_id = $1",
    )
    .bind(teacher_id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn list_upcoming_unsubmitted(
    executor: impl sqlx::PgExecutor<'_>,
    student_id: &str,
    today: Date,
    limit: i64,
) -> Result<Vec<AssignmentWithCourseRow>, sqlx::Error> {
    sqlx::query_as::<_, AssignmentWithCourseRow>(
        "SELECT a.id, a.course_id, c.name AS course_name, a.title, a.description,
                a.due_date
         FROM assignments a
         JOIN courses c ON c.id = a.course_id
         JOIN enrollments e ON e.course_id = c.id
         WHERE e.student_id = $1
           AND e.status <> 'dropped'
           AND a.due_date >= $2
           AND NOT EXISTS (
               SELECT 1 FROM submissions s WHERE s.assignment_id = a.id AND s.student_id = $1
           )
         ORDER BY a.due_date, a.created_at, a.id
         LIMIT $3",
    )
    .bind(student_id)
    .bind(today)
    .bind(limit)
    .fetch_all(executor)
    .await
}

pub(crate) async fn delete(executor: impl sqlx::PgExecutor<'_>, id: &str) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM assignments WHERE id = $1").bind(id).execute(executor).await?;
    Ok(result.rows_affected())
}

pub(crate) async fn delete_for_course(
    executor: impl sqlx::PgExecutor<'_>,
    course_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM assignments WHERE course_id = $1")
        .bind(course_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
