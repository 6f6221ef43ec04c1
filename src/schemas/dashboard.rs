use serde::Serialize;

use crate::schemas::assignment::UpcomingAssignmentResponse;
use crate::schemas::enrollment::EnrolledCourseResponse;
use crate::schemas::submission::GradeResponse;

#[derive(Debug, Default, Serialize)]
pub(crate) struct AdminDashboardResponse {
    pub(crate) total_students: i64,
    pub(crate) total_teachers: i64,
    pub(crate) total_courses: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct TeacherDashboardResponse {
    pub(crate) total_courses: i64,
    pub(crate) total_students: i64,
    pub(crate) total_assignments: i64,
    pub(crate) pending_submissions: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentDashboardResponse {
    pub(crate) courses: Vec<EnrolledCourseResponse>,
    pub(crate) upcoming_assignments: Vec<UpcomingAssignmentResponse>,
    pub(crate) recent_grades: Vec<GradeResponse>,
}
