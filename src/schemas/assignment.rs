use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use time::Date;
use validator::Validate;

use crate::core::time::{format_date, format_primitive, parse_date_flexible};
use crate::db::models::Assignment;
use crate::repositories::assignments::AssignmentWithCourseRow;
use crate::schemas::submission::SubmissionResponse;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AssignmentRequest {
    #[serde(default)]
    #[validate(length(max = 255, message = "title is too long"))]
    pub(crate) title: String,
    #[serde(default)]
    #[validate(length(max = 1000, message = "description is too long"))]
    pub(crate) description: String,
    #[serde(default, alias = "dueDate", deserialize_with = "deserialize_optional_date")]
    pub(crate) due_date: Option<Date>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssignmentResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) due_date: String,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl AssignmentResponse {
    pub(crate) fn from_db(assignment: Assignment) -> Self {
        Self {
            id: assignment.id,
            course_id: assignment.course_id,
            title: assignment.title,
            description: assignment.description,
            due_date: format_date(assignment.due_date),
            created_at: format_primitive(assignment.created_at),
            updated_at: format_primitive(assignment.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UpcomingAssignmentResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) course_name: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) due_date: String,
}

impl UpcomingAssignmentResponse {
    pub(crate) fn from_row(row: AssignmentWithCourseRow) -> Self {
        Self {
            id: row.id,
            course_id: row.course_id,
            course_name: row.course_name,
            title: row.title,
            description: row.description,
            due_date: format_date(row.due_date),
        }
    }
}

/// An assignment as seen by an enrolled student, with their own submission.
#[derive(Debug, Serialize)]
pub(crate) struct StudentAssignmentResponse {
    #[serde(flatten)]
    pub(crate) assignment: AssignmentResponse,
    pub(crate) course_name: String,
    pub(crate) past_due: bool,
    pub(crate) submission: Option<SubmissionResponse>,
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => parse_date_flexible(&value)
            .ok_or_else(|| D::Error::custom(format!("invalid date: {value}")))
            .map(Some),
        None => Ok(None),
    }
}
