use serde::Serialize;

use crate::core::time::format_primitive;
use crate::db::models::Enrollment;
use crate::db::types::EnrollmentStatus;

#[derive(Debug, Serialize)]
pub(crate) struct EnrollmentResponse {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) course_id: String,
    pub(crate) enrolled_at: String,
    pub(crate) started_at: Option<String>,
    pub(crate) completed_at: Option<String>,
    pub(crate) last_accessed: Option<String>,
    pub(crate) progress_percentage: f64,
    pub(crate) status: EnrollmentStatus,
    pub(crate) is_active: bool,
}

impl EnrollmentResponse {
    pub(crate) fn from_db(enrollment: Enrollment) -> Self {
        Self {
            id: enrollment.id,
            student_id: enrollment.student_id,
            course_id: enrollment.course_id,
            enrolled_at: format_primitive(enrollment.enrolled_at),
            started_at: enrollment.started_at.map(format_primitive),
            completed_at: enrollment.completed_at.map(format_primitive),
            last_accessed: enrollment.last_accessed.map(format_primitive),
            progress_percentage: enrollment.progress_percentage,
            status: enrollment.status,
            is_active: enrollment.is_active,
        }
    }
}
