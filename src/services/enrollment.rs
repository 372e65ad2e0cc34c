use sqlx::PgPool;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::Enrollment;
use crate::db::types::CourseStatus;
use crate::repositories::{courses, enrollments};
use crate::services::error::FlowError;

/// Enrolls a student into a published course.
///
/// The course row is locked for the duration of the transaction so the
/// capacity check cannot race with a concurrent enrollment into the same
/// course.
pub(crate) async fn enroll(
    pool: &PgPool,
    student_id: &str,
    course_id: &str,
) -> Result<Enrollment, FlowError> {
    let mut tx = pool.begin().await?;

    let course = courses::lock_by_id(&mut *tx, course_id)
        .await?
        .filter(|course| course.status == CourseStatus::Published)
        .ok_or(FlowError::NotFound("Course"))?;

    // Any prior row blocks re-enrollment, dropped or not.
    let existing =
        enrollments::find_any_for_student_course(&mut *tx, student_id, course_id).await?;
    if existing.is_some() {
        return Err(FlowError::AlreadyExists("Already enrolled in this course"));
    }

    if let Some(limit) = course.enrollment_limit {
        let active = enrollments::count_active_by_course(&mut *tx, course_id).await?;
        if active >= limit as i64 {
            return Err(FlowError::LimitExceeded("Course enrollment limit reached"));
        }
    }

    let enrollment = enrollments::create(
        &mut *tx,
        enrollments::CreateEnrollment {
            id: &Uuid::new_v4().to_string(),
            student_id,
            course_id,
            enrolled_at: primitive_now_utc(),
        },
    )
    .await?;

    tx.commit().await?;
    Ok(enrollment)
}
