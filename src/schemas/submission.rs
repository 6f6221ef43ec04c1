use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Submission;
use crate::db::types::SubmissionStatus;
use crate::repositories::submissions::SubmissionDetailRow;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct GradeRequest {
    #[validate(range(min = 0.0, max = 100.0, message = "Grade must be between 0 and 100"))]
    pub(crate) grade: f64,
    #[serde(default)]
    pub(crate) feedback: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionResponse {
    pub(crate) id: String,
    pub(crate) assignment_id: String,
    pub(crate) student_id: String,
    pub(crate) submission_text: Option<String>,
    pub(crate) file_name: Option<String>,
    pub(crate) file_size: Option<i64>,
    pub(crate) file_hash: Option<String>,
    pub(crate) submitted_at: String,
    pub(crate) grade: Option<f64>,
    pub(crate) feedback: Option<String>,
    pub(crate) graded_at: Option<String>,
    pub(crate) status: SubmissionStatus,
}

impl SubmissionResponse {
    pub(crate) fn from_db(submission: Submission) -> Self {
        Self {
            id: submission.id,
            assignment_id: submission.assignment_id,
            student_id: submission.student_id,
            submission_text: submission.submission_text,
            file_name: submission.file_name,
            file_size: submission.file_size,
            file_hash: submission.file_hash,
            submitted_at: format_primitive(submission.submitted_at),
            grade: submission.grade,
            feedback: submission.feedback,
            graded_at: submission.graded_at.map(format_primitive),
            status: submission.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionDetailResponse {
    pub(crate) id: String,
    pub(crate) assignment_id: String,
    pub(crate) assignment_title: String,
    pub(crate) course_id: String,
    pub(crate) course_name: String,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) student_email: String,
    pub(crate) submission_text: Option<String>,
    pub(crate) file_name: Option<String>,
    pub(crate) file_size: Option<i64>,
    pub(crate) submitted_at: String,
    pub(crate) grade: Option<f64>,
    pub(crate) feedback: Option<String>,
    pub(crate) graded_at: Option<String>,
    pub(crate) status: SubmissionStatus,
}

impl SubmissionDetailResponse {
    pub(crate) fn from_row(row: SubmissionDetailRow) -> Self {
        Self {
            id: row.id,
            assignment_id: row.assignment_id,
            assignment_title: row.assignment_title,
            course_id: row.course_id,
            course_name: row.course_name,
            student_id: row.student_id,
            student_name: row.student_name,
            student_email: row.student_email,
            submission_text: row.submission_text,
            file_name: row.file_name,
            file_size: row.file_size,
            submitted_at: format_primitive(row.submitted_at),
            grade: row.grade,
            feedback: row.feedback,
            graded_at: row.graded_at.map(format_primitive),
            status: row.status,
        }
    }
}

/// One graded submission in a student's transcript.
#[derive(Debug, Serialize)]
pub(crate) struct GradeResponse {
    pub(crate) submission_id: String,
    pub(crate) assignment_id: String,
    pub(crate) assignment_title: String,
    pub(crate) course_id: String,
    pub(crate) course_name: String,
    pub(crate) grade: Option<f64>,
    pub(crate) feedback: Option<String>,
    pub(crate) submitted_at: String,
    pub(crate) graded_at: Option<String>,
}

impl GradeResponse {
    pub(crate) fn from_row(row: SubmissionDetailRow) -> Self {
        Self {
            submission_id: row.id,
            assignment_id: row.assignment_id,
            assignment_title: row.assignment_title,
            course_id: row.course_id,
            course_name: row.course_name,
            grade: row.grade,
            feedback: row.feedback,
            submitted_at: format_primitive(row.submitted_at),
            graded_at: row.graded_at.map(format_primitive),
        }
    }
}
