use serde::Serialize;

use crate::core::time::format_primitive;
use crate::db::models::User;
use crate::db::types::{EnrollmentStatus, UserRole};
use crate::repositories::users::{StudentEnrollmentRow, TeacherCourseRow};

#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) role: UserRole,
    pub(crate) created_at: String,
}

impl UserResponse {
    pub(crate) fn from_db(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: format_primitive(user.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentEnrollmentResponse {
    pub(crate) enrollment_id: String,
    pub(crate) course_id: String,
    pub(crate) course_name: String,
    pub(crate) teacher_name: Option<String>,
    pub(crate) status: EnrollmentStatus,
    pub(crate) enrolled_at: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) enrollments: Vec<StudentEnrollmentResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseRef {
    pub(crate) id: String,
    pub(crate) name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TeacherResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) courses: Vec<CourseRef>,
}

/// Folds the flat (student, enrollment) projection into one entry per student,
/// preserving row order.
pub(crate) fn group_students(rows: Vec<StudentEnrollmentRow>) -> Vec<StudentResponse> {
    let mut students: Vec<StudentResponse> = Vec::new();

    for row in rows {
        let needs_new = students.last().map_or(true, |last| last.id != row.student_id);
        if needs_new {
            students.push(StudentResponse {
                id: row.student_id.clone(),
                name: row.student_name.clone(),
                email: row.student_email.clone(),
                enrollments: Vec::new(),
            });
        }

        let (Some(enrollment_id), Some(course_id), Some(course_name), Some(status), Some(at)) =
            (row.enrollment_id, row.course_id, row.course_name, row.status, row.enrolled_at)
        else {
            continue;
        };

        if let Some(student) = students.last_mut() {
            student.enrollments.push(StudentEnrollmentResponse {
                enrollment_id,
                course_id,
                course_name,
                teacher_name: row.teacher_name,
                status,
                enrolled_at: format_primitive(at),
            });
        }
    }

    students
}

pub(crate) fn group_teachers(rows: Vec<TeacherCourseRow>) -> Vec<TeacherResponse> {
    let mut teachers: Vec<TeacherResponse> = Vec::new();

    for row in rows {
        let needs_new = teachers.last().map_or(true, |last| last.id != row.teacher_id);
        if needs_new {
            teachers.push(TeacherResponse {
                id: row.teacher_id.clone(),
                name: row.teacher_name.clone(),
                email: row.teacher_email.clone(),
                courses: Vec::new(),
            });
        }

        if let (Some(id), Some(name), Some(teacher)) =
            (row.course_id, row.course_name, teachers.last_mut())
        {
            teacher.courses.push(CourseRef { id, name });
        }
    }

    teachers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::primitive_now_utc;

    fn student_row(student: &str, course: Option<&str>) -> StudentEnrollmentRow {
        StudentEnrollmentRow {
            student_id: student.to_string(),
            student_name: format!("Student {student}"),
            student_email: format!("{student}@college.test"),
            enrollment_id: course.map(|c| format!("e-{student}-{c}")),
            course_id: course.map(str::to_string),
            course_name: course.map(|c| format!("Course {c}")),
            teacher_name: None,
            status: course.map(|_| EnrollmentStatus::Enrolled),
            enrolled_at: course.map(|_| primitive_now_utc()),
        }
    }

    #[test]
    fn groups_enrollments_per_student() {
        let rows = vec![
            student_row("s1", Some("c1")),
            student_row("s1", Some("c2")),
            student_row("s2", None),
        ];

        let grouped = group_students(rows);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].enrollments.len(), 2);
        assert_eq!(grouped[0].enrollments[1].course_name, "Course c2");
        assert!(grouped[1].enrollments.is_empty());
    }

    #[test]
    fn groups_courses_per_teacher() {
        let rows = vec![
            TeacherCourseRow {
                teacher_id: "t1".to_string(),
                teacher_name: "T1".to_string(),
                teacher_email: "t1@college.test".to_string(),
                course_id: Some("c1".to_string()),
                course_name: Some("CS101".to_string()),
            },
            TeacherCourseRow {
                teacher_id: "t2".to_string(),
                teacher_name: "T2".to_string(),
                teacher_email: "t2@college.test".to_string(),
                course_id: None,
                course_name: None,
            },
        ];

        let grouped = group_teachers(rows);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].courses.len(), 1);
        assert!(grouped[1].courses.is_empty());
    }
}
