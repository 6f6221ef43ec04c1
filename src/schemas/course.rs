use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::repositories::courses::CourseSummaryRow;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CourseRequest {
    #[validate(length(min = 1, max = 255, message = "name must not be empty"))]
    pub(crate) name: String,
    #[serde(default)]
    #[validate(length(max = 1000, message = "description is too long"))]
    pub(crate) description: Option<String>,
    #[serde(default, alias = "teacherId")]
    pub(crate) teacher_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TeacherSummary {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) email: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) teacher: Option<TeacherSummary>,
    pub(crate) enrollment_count: i64,
    pub(crate) assignment_count: i64,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl CourseResponse {
    pub(crate) fn from_summary(row: CourseSummaryRow) -> Self {
        let teacher = match (row.teacher_id, row.teacher_name, row.teacher_email) {
            (Some(id), Some(name), Some(email)) => Some(TeacherSummary { id, name, email }),
            _ => None,
        };

        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            teacher,
            enrollment_count: row.enrollment_count,
            assignment_count: row.assignment_count,
            created_at: format_primitive(row.created_at),
            updated_at: format_primitive(row.updated_at),
        }
    }
}
