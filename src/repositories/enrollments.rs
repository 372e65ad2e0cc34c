use sqlx::PgExecutor;

use crate::db::models::Enrollment;
use crate::db::types::EnrollmentStatus;

const ENROLLMENT_COLUMNS: &str = "id, student_id, course_id, enrolled_at, started_at, \
     completed_at, last_accessed, progress_percentage, status, is_active, certificate_issued, \
     certificate_issued_at";

pub(crate) struct CreateEnrollment<'a> {
    pub(crate) id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) enrolled_at: time::PrimitiveDateTime,
}

/// Unconditional aggregate write: the stored percentage is always updated,
/// status and lifecycle timestamps only on their transition edges.
pub(crate) struct ProgressWrite {
    pub(crate) progress_percentage: f64,
    pub(crate) status: Option<EnrollmentStatus>,
    pub(crate) started_at: Option<time::PrimitiveDateTime>,
    pub(crate) completed_at: Option<time::PrimitiveDateTime>,
    pub(crate) last_accessed: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl PgExecutor<'_>,
    params: CreateEnrollment<'_>,
) -> Result<Enrollment, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "INSERT INTO enrollments (
            id, student_id, course_id, enrolled_at, progress_percentage, status, is_active,
            certificate_issued
         ) VALUES ($1,$2,$3,$4,0,'enrolled',TRUE,FALSE)
         RETURNING {ENROLLMENT_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.student_id)
    .bind(params.course_id)
    .bind(params.enrolled_at)
    .fetch_one(executor)
    .await
}

/// Any enrollment row for the pair, active or not. Used by the duplicate
/// check on enroll.
pub(crate) async fn find_any_for_student_course(
    executor: impl PgExecutor<'_>,
    student_id: &str,
    course_id: &str,
) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "SELECT {ENROLLMENT_COLUMNS} FROM enrollments
         WHERE student_id = $1 AND course_id = $2",
    ))
    .bind(student_id)
    .bind(course_id)
    .fetch_optional(executor)
    .await
}

/// Locks the active enrollment row; every progress recalculation and
/// attempt count for the same enrollment serializes on this lock.
pub(crate) async fn lock_active_for_student_course(
    executor: impl PgExecutor<'_>,
    student_id: &str,
    course_id: &str,
) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "SELECT {ENROLLMENT_COLUMNS} FROM enrollments
         WHERE student_id = $1 AND course_id = $2 AND is_active
         FOR UPDATE",
    ))
    .bind(student_id)
    .bind(course_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn find_completed_for_student_course(
    executor: impl PgExecutor<'_>,
    student_id: &str,
    course_id: &str,
) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "SELECT {ENROLLMENT_COLUMNS} FROM enrollments
         WHERE student_id = $1 AND course_id = $2 AND status = 'completed'",
    ))
    .bind(student_id)
    .bind(course_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn count_active_by_course(
    executor: impl PgExecutor<'_>,
    course_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(id) FROM enrollments WHERE course_id = $1 AND is_active",
    )
    .bind(course_id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn list_by_student(
    executor: impl PgExecutor<'_>,
    student_id: &str,
) -> Result<Vec<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "SELECT {ENROLLMENT_COLUMNS} FROM enrollments
         WHERE student_id = $1 AND is_active
         ORDER BY enrolled_at DESC",
    ))
    .bind(student_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn write_progress(
    executor: impl PgExecutor<'_>,
    enrollment_id: &str,
    params: ProgressWrite,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE enrollments SET
            progress_percentage = $1,
            status = COALESCE($2, status),
            started_at = COALESCE($3, started_at),
            completed_at = COALESCE($4, completed_at),
            last_accessed = $5
         WHERE id = $6",
    )
    .bind(params.progress_percentage)
    .bind(params.status)
    .bind(params.started_at)
    .bind(params.completed_at)
    .bind(params.last_accessed)
    .bind(enrollment_id)
    .execute(executor)
    .await?;
    Ok(())
}
