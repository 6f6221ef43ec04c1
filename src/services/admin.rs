use uuid::Uuid;

use crate::core::metrics::record_event;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::is_foreign_key_violation;
use crate::db::models::User;
use crate::db::types::{EnrollmentStatus, UserRole};
use crate::repositories;
use crate::schemas::course::CourseResponse;
use crate::schemas::dashboard::AdminDashboardResponse;
use crate::schemas::enrollment::EnrollmentResponse;
use crate::schemas::user::{group_students, group_teachers, StudentResponse, TeacherResponse, UserResponse};
use crate::services::error::{ServiceError, ServiceResult};

pub(crate) struct CourseInput<'a> {
    pub(crate) name: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) teacher_id: Option<&'a str>,
}

pub(crate) async fn dashboard_stats(state: &AppState) -> AdminDashboardResponse {
    let counts = async {
        let total_students =
            repositories::users::count_by_role(state.db(), UserRole::Student).await?;
        let total_teachers =
            repositories::users::count_by_role(state.db(), UserRole::Teacher).await?;
        let total_courses = repositories::courses::count_all(state.db()).await?;
        Ok::<_, sqlx::Error>(AdminDashboardResponse { total_students, total_teachers, total_courses })
    };

    match counts.await {
        Ok(stats) => stats,
        Err(err) => {
            tracing::error!(error = %err, "Failed to compute admin dashboard stats");
            AdminDashboardResponse::default()
        }
    }
}

pub(crate) async fn list_users(state: &AppState) -> ServiceResult<Vec<UserResponse>> {
    let users = repositories::users::list_all(state.db()).await?;
    Ok(users.into_iter().map(UserResponse::from_db).collect())
}

pub(crate) async fn list_students(state: &AppState) -> ServiceResult<Vec<StudentResponse>> {
    let rows = repositories::users::list_students_with_enrollments(state.db()).await?;
    Ok(group_students(rows))
}

pub(crate) async fn list_teachers(state: &AppState) -> ServiceResult<Vec<TeacherResponse>> {
    let rows = repositories::users::list_teachers_with_courses(state.db()).await?;
    Ok(group_teachers(rows))
}

pub(crate) async fn list_courses(state: &AppState) -> Vec<CourseResponse> {
    match repositories::courses::list_summaries(state.db()).await {
        Ok(rows) => rows.into_iter().map(CourseResponse::from_summary).collect(),
        Err(err) => {
            tracing::error!(error = %err, "Failed to list courses");
            Vec::new()
        }
    }
}

pub(crate) async fn get_course(state: &AppState, course_id: &str) -> ServiceResult<CourseResponse> {
    repositories::courses::find_summary(state.db(), course_id)
        .await?
        .map(CourseResponse::from_summary)
        .ok_or_else(|| ServiceError::not_found("Course not found"))
}

pub(crate) async fn delete_user(state: &AppState, actor: &User, user_id: &str) -> ServiceResult<()> {
    if actor.id == user_id {
        return Err(ServiceError::validation("You cannot delete your own account"));
    }

    let deleted = repositories::users::delete(state.db(), user_id).await.map_err(|err| {
        if is_foreign_key_violation(&err) {
            ServiceError::conflict(
                "User is still referenced by courses, enrollments or submissions",
            )
        } else {
            ServiceError::Database(err)
        }
    })?;

    if deleted == 0 {
        return Err(ServiceError::not_found("User not found"));
    }

    record_event("user_deleted");
    tracing::info!(admin_id = %actor.id, user_id = %user_id, action = "user_delete", "User deleted");
    Ok(())
}

pub(crate) async fn create_course(
    state: &AppState,
    input: CourseInput<'_>,
) -> ServiceResult<CourseResponse> {
    let name = validate_course_name(input.name)?;
    let description = normalize_description(input.description);
    let teacher_id = normalize_teacher_id(input.teacher_id);
    if let Some(teacher_id) = teacher_id {
        ensure_teacher(state, teacher_id).await?;
    }

    let now = primitive_now_utc();
    let course = repositories::courses::create(
        state.db(),
        repositories::courses::CreateCourse {
            id: &Uuid::new_v4().to_string(),
            name,
            description,
            teacher_id,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    record_event("course_created");
    tracing::info!(course_id = %course.id, action = "course_create", "Course created");
    get_course(state, &course.id).await
}

pub(crate) async fn update_course(
    state: &AppState,
    course_id: &str,
    input: CourseInput<'_>,
) -> ServiceResult<CourseResponse> {
    let name = validate_course_name(input.name)?;
    let description = normalize_description(input.description);
    let teacher_id = normalize_teacher_id(input.teacher_id);
    if let Some(teacher_id) = teacher_id {
        ensure_teacher(state, teacher_id).await?;
    }

    let updated = repositories::courses::update(
        state.db(),
        course_id,
        repositories::courses::UpdateCourse {
            name,
            description,
            teacher_id,
            updated_at: primitive_now_utc(),
        },
    )
    .await?;

    if updated.is_none() {
        return Err(ServiceError::not_found("Course not found"));
    }

    tracing::info!(course_id = %course_id, action = "course_update", "Course updated");
    get_course(state, course_id).await
}

pub(crate) async fn delete_course(state: &AppState, course_id: &str) -> ServiceResult<()> {
    let mut tx = state.db().begin().await?;

    if repositories::courses::find_by_id(&mut *tx, course_id).await?.is_none() {
        return Err(ServiceError::not_found("Course not found"));
    }

    let enrollments = repositories::enrollments::count_for_course(&mut *tx, course_id).await?;
    if enrollments > 0 {
        return Err(ServiceError::conflict(format!(
            "Cannot delete course with {enrollments} enrollment(s); remove them first"
        )));
    }

    repositories::courses::detach_teacher(&mut *tx, course_id, primitive_now_utc()).await?;
    let files = repositories::submissions::delete_for_course(&mut *tx, course_id).await?;
    repositories::assignments::delete_for_course(&mut *tx, course_id).await?;
    repositories::courses::delete(&mut *tx, course_id).await.map_err(|err| {
        if is_foreign_key_violation(&err) {
            ServiceError::conflict("Course gained enrollments while being deleted")
        } else {
            ServiceError::Database(err)
        }
    })?;

    tx.commit().await?;

    state.storage().delete_all_best_effort(files.into_iter().flatten()).await;

    record_event("course_deleted");
    tracing::info!(course_id = %course_id, action = "course_delete", "Course deleted");
    Ok(())
}

pub(crate) async fn update_enrollment_status(
    state: &AppState,
    enrollment_id: &str,
    status: EnrollmentStatus,
) -> ServiceResult<EnrollmentResponse> {
    let enrollment = repositories::enrollments::update_status(state.db(), enrollment_id, status)
        .await
        .map_err(|err| {
            ServiceError::on_unique_violation(
                err,
                "Student already has an active enrollment in this course",
            )
        })?
        .ok_or_else(|| ServiceError::not_found("Enrollment not found"))?;

    tracing::info!(
        enrollment_id = %enrollment_id,
        status = ?status,
        action = "enrollment_status_update",
        "Enrollment status updated"
    );
    Ok(EnrollmentResponse::from_db(enrollment))
}

async fn ensure_teacher(state: &AppState, teacher_id: &str) -> ServiceResult<()> {
    let teacher = repositories::users::find_by_id(state.db(), teacher_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Teacher not found"))?;

    if teacher.role != UserRole::Teacher {
        return Err(ServiceError::validation("Assigned user is not a teacher"));
    }
    Ok(())
}

fn validate_course_name(name: &str) -> ServiceResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation("Course name is required"));
    }
    Ok(trimmed)
}

fn normalize_description(description: Option<&str>) -> Option<&str> {
    description.map(str::trim).filter(|value| !value.is_empty())
}

fn normalize_teacher_id(teacher_id: Option<&str>) -> Option<&str> {
    teacher_id.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests;
