use crate::db::models::{Course, User};
use crate::db::types::UserRole;
use crate::repositories;
use crate::services::error::{ServiceError, ServiceResult};

pub(crate) fn ensure_role(actor: &User, role: UserRole) -> ServiceResult<()> {
    if actor.role == role {
        Ok(())
    } else {
        Err(ServiceError::forbidden(format!("{} access required", role_label(role))))
    }
}

pub(crate) fn ensure_course_owner(teacher: &User, course: &Course) -> ServiceResult<()> {
    ensure_role(teacher, UserRole::Teacher)?;
    if course.teacher_id.as_deref() == Some(teacher.id.as_str()) {
        Ok(())
    } else {
        Err(ServiceError::forbidden("You are not the teacher of this course"))
    }
}

pub(crate) fn ensure_self(actor: &User, student_id: &str) -> ServiceResult<()> {
    if actor.id == student_id {
        Ok(())
    } else {
        Err(ServiceError::forbidden("You can only access your own records"))
    }
}

pub(crate) fn ensure_self_or_admin(actor: &User, student_id: &str) -> ServiceResult<()> {
    if actor.role == UserRole::Admin {
        return Ok(());
    }
    ensure_self(actor, student_id)
}

pub(crate) async fn ensure_enrolled(
    executor: impl sqlx::PgExecutor<'_>,
    student: &User,
    course_id: &str,
) -> ServiceResult<()> {
    ensure_role(student, UserRole::Student)?;
    let enrollment = repositories::enrollments::find_active(executor, &student.id, course_id).await?;
    if enrollment.is_some() {
        Ok(())
    } else {
        Err(ServiceError::forbidden("You are not enrolled in this course"))
    }
}

fn role_label(role: UserRole) -> &'static str {
    match role {
        UserRole::Admin => "Admin",
        UserRole::Teacher => "Teacher",
        UserRole::Student => "Student",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::primitive_now_utc;

    fn user(id: &str, role: UserRole) -> User {
        let now = primitive_now_utc();
        User {
            id: id.to_string(),
            name: format!("User {id}"),
            email: format!("{id}@college.test"),
            hashed_password: String::new(),
            role,
            created_at: now,
            updated_at: now,
        }
    }

    fn course(teacher_id: Option<&str>) -> Course {
        let now = primitive_now_utc();
        Course {
            id: "course-1".to_string(),
            name: "CS101".to_string(),
            description: None,
            teacher_id: teacher_id.map(str::to_string),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn role_check_names_required_role() {
        let student = user("s1", UserRole::Student);
        assert!(ensure_role(&student, UserRole::Student).is_ok());

        let error = ensure_role(&student, UserRole::Teacher).unwrap_err();
        assert!(matches!(error, ServiceError::Forbidden(ref msg) if msg == "Teacher access required"));
    }

    #[test]
    fn course_owner_must_match_teacher() {
        let teacher = user("t1", UserRole::Teacher);
        let other = user("t2", UserRole::Teacher);

        assert!(ensure_course_owner(&teacher, &course(Some("t1"))).is_ok());
        assert!(matches!(
            ensure_course_owner(&other, &course(Some("t1"))),
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            ensure_course_owner(&teacher, &course(None)),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn admin_cannot_act_as_course_owner() {
        let admin = user("t1", UserRole::Admin);
        assert!(ensure_course_owner(&admin, &course(Some("t1"))).is_err());
    }

    #[test]
    fn self_checks() {
        let student = user("s1", UserRole::Student);
        let admin = user("a1", UserRole::Admin);

        assert!(ensure_self(&student, "s1").is_ok());
        assert!(ensure_self(&student, "s2").is_err());
        assert!(ensure_self(&admin, "s1").is_err());
        assert!(ensure_self_or_admin(&admin, "s1").is_ok());
        assert!(ensure_self_or_admin(&student, "s2").is_err());
    }
}
