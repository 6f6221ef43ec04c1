use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::models::User;
use crate::db::types::{EnrollmentStatus, UserRole};

const COLUMNS: &str = "id, name, email, hashed_password, role, created_at, updated_at";

pub(crate) struct CreateUser<'a> {
    pub(crate) id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) email: &'a str,
    pub(crate) hashed_password: String,
    pub(crate) role: UserRole,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct StudentEnrollmentRow {
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) student_email: String,
    pub(crate) enrollment_id: Option<String>,
    pub(crate) course_id: Option<String>,
    pub(crate) course_name: Option<String>,
    pub(crate) teacher_name: Option<String>,
    pub(crate) status: Option<EnrollmentStatus>,
    pub(crate) enrolled_at: Option<PrimitiveDateTime>,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct TeacherCourseRow {
    pub(crate) teacher_id: String,
    pub(crate) teacher_name: String,
    pub(crate) teacher_email: String,
    pub(crate) course_id: Option<String>,
    pub(crate) course_name: Option<String>,
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn find_by_email(
    executor: impl sqlx::PgExecutor<'_>,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE email = $1"))
        .bind(email)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateUser<'_>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (id, name, email, hashed_password, role, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6,$7)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.email)
    .bind(params.hashed_password)
    .bind(params.role)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn update_password(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    hashed_password: &str,
    updated_at: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET hashed_password = $1, updated_at = $2 WHERE id = $3")
        .bind(hashed_password)
        .bind(updated_at)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) async fn list_all(executor: impl sqlx::PgExecutor<'_>) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users ORDER BY created_at, id"))
        .fetch_all(executor)
        .await
}

pub(crate) async fn count_by_role(
    executor: impl sqlx::PgExecutor<'_>,
    role: UserRole,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = $1")
        .bind(role)
        .fetch_one(executor)
        .await
}

pub(crate) async fn list_students_with_enrollments(
    executor: impl sqlx::PgExecutor<'_>,
) -> Result<Vec<StudentEnrollmentRow>, sqlx::Error> {
    sqlx::query_as::<_, StudentEnrollmentRow>(
        "SELECT u.id AS student_id, u.name AS student_name, u.email AS student_email,
                e.id AS enrollment_id, c.id AS course_id, c.name AS course_name,
                t.name AS teacher_name, e.status, e.enrolled_at
         FROM users u
         LEFT JOIN enrollments e ON e.student_id = u.id
         LEFT JOIN courses c ON c.id = e.course_id
         LEFT JOIN users t ON t.id = c.teacher_id
         WHERE u.role = 'student'
         ORDER BY u.name, u.id, e.enrolled_at",
    )
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_teachers_with_courses(
    executor: impl sqlx::PgExecutor<'_>,
) -> Result<Vec<TeacherCourseRow>, sqlx::Error> {
    sqlx::query_as::<_, TeacherCourseRow>(
        "SELECT u.id AS teacher_id, u.name AS teacher_name, u.email AS teacher_email,
                c.id AS course_id, c.name AS course_name
         FROM users u
         LEFT JOIN courses c ON c.teacher_id = u.id
         WHERE u.role = 'teacher'
         ORDER BY u.name, u.id, c.name",
    )
    .fetch_all(executor)
    .await
}

pub(crate) async fn delete(executor: impl sqlx::PgExecutor<'_>, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1").bind(id).execute(executor).await?;
    Ok(result.rows_affected())
}
