use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Enrollment;
use crate::db::types::EnrollmentStatus;
use crate::repositories::enrollments::{CourseStudentRow, EnrolledCourseRow};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct EnrollmentRequest {
    #[serde(alias = "studentId")]
    #[validate(length(min = 1, message = "student_id is required"))]
    pub(crate) student_id: String,
    #[serde(alias = "courseId")]
    #[validate(length(min = 1, message = "course_id is required"))]
    pub(crate) course_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EnrollmentStatusUpdate {
    pub(crate) status: EnrollmentStatus,
}

#[derive(Debug, Serialize)]
pub(crate) struct EnrollmentResponse {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) course_id: String,
    pub(crate) status: EnrollmentStatus,
    pub(crate) enrolled_at: String,
}

impl EnrollmentResponse {
    pub(crate) fn from_db(enrollment: Enrollment) -> Self {
        Self {
            id: enrollment.id,
            student_id: enrollment.student_id,
            course_id: enrollment.course_id,
            status: enrollment.status,
            enrolled_at: format_primitive(enrollment.enrolled_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct EnrolledCourseResponse {
    pub(crate) enrollment_id: String,
    pub(crate) course_id: String,
    pub(crate) course_name: String,
    pub(crate) course_description: Option<String>,
    pub(crate) teacher_id: Option<String>,
    pub(crate) teacher_name: Option<String>,
    pub(crate) status: EnrollmentStatus,
    pub(crate) enrolled_at: String,
}

impl EnrolledCourseResponse {
    pub(crate) fn from_row(row: EnrolledCourseRow) -> Self {
        Self {
            enrollment_id: row.enrollment_id,
            course_id: row.course_id,
            course_name: row.course_name,
            course_description: row.course_description,
            teacher_id: row.teacher_id,
            teacher_name: row.teacher_name,
            status: row.status,
            enrolled_at: format_primitive(row.enrolled_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseStudentResponse {
    pub(crate) enrollment_id: String,
    pub(crate) student_id: String,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) status: EnrollmentStatus,
    pub(crate) enrolled_at: String,
}

impl CourseStudentResponse {
    pub(crate) fn from_row(row: CourseStudentRow) -> Self {
        Self {
            enrollment_id: row.enrollment_id,
            student_id: row.student_id,
            name: row.student_name,
            email: row.student_email,
            status: row.status,
            enrolled_at: format_primitive(row.enrolled_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TeacherStudentCourse {
    pub(crate) course_id: String,
    pub(crate) course_name: String,
    pub(crate) status: EnrollmentStatus,
    pub(crate) enrolled_at: String,
}

/// A student as seen by one teacher: only enrollments in that teacher's courses.
#[derive(Debug, Serialize)]
pub(crate) struct TeacherStudentResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) courses: Vec<TeacherStudentCourse>,
}

pub(crate) fn group_teacher_students(rows: Vec<CourseStudentRow>) -> Vec<TeacherStudentResponse> {
    let mut students: Vec<TeacherStudentResponse> = Vec::new();

    for row in rows {
        let course = TeacherStudentCourse {
            course_id: row.course_id,
            course_name: row.course_name,
            status: row.status,
            enrolled_at: format_primitive(row.enrolled_at),
        };

        match students.last_mut() {
            Some(last) if last.id == row.student_id => last.courses.push(course),
            _ => students.push(TeacherStudentResponse {
                id: row.student_id,
                name: row.student_name,
                email: row.student_email,
                courses: vec![course],
            }),
        }
    }

    students
}

#[derive(Debug, Serialize)]
pub(crate) struct EnrollAllResponse {
    pub(crate) enrolled: usize,
    pub(crate) message: String,
}
