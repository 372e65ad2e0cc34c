use sqlx::PgExecutor;

use crate::db::models::LessonProgress;

const PROGRESS_COLUMNS: &str = "id, enrollment_id, lesson_id, started_at, completed_at, \
     last_position, is_completed, time_spent_seconds, notes";

pub(crate) async fn find_for_lesson(
    executor: impl PgExecutor<'_>,
    enrollment_id: &str,
    lesson_id: &str,
) -> Result<Option<LessonProgress>, sqlx::Error> {
    sqlx::query_as::<_, LessonProgress>(&format!(
        "SELECT {PROGRESS_COLUMNS} FROM lesson_progress
         WHERE enrollment_id = $1 AND lesson_id = $2",
    ))
    .bind(enrollment_id)
    .bind(lesson_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn create(
    executor: impl PgExecutor<'_>,
    id: &str,
    enrollment_id: &str,
    lesson_id: &str,
    started_at: time::PrimitiveDateTime,
) -> Result<LessonProgress, sqlx::Error> {
    sqlx::query_as::<_, LessonProgress>(&format!(
        "INSERT INTO lesson_progress (
            id, enrollment_id, lesson_id, started_at, last_position, is_completed,
            time_spent_seconds
         ) VALUES ($1,$2,$3,$4,0,FALSE,0)
         RETURNING {PROGRESS_COLUMNS}",
    ))
    .bind(id)
    .bind(enrollment_id)
    .bind(lesson_id)
    .bind(started_at)
    .fetch_one(executor)
    .await
}

/// Partial update: absent fields keep their stored value. Time spent is
/// incremental, not a replacement.
pub(crate) struct ProgressUpdate<'a> {
    pub(crate) last_position: Option<i32>,
    pub(crate) time_spent_delta: Option<i32>,
    pub(crate) notes: Option<&'a str>,
}

pub(crate) async fn apply_update(
    executor: impl PgExecutor<'_>,
    progress_id: &str,
    params: ProgressUpdate<'_>,
) -> Result<LessonProgress, sqlx::Error> {
    sqlx::query_as::<_, LessonProgress>(&format!(
        "UPDATE lesson_progress SET
            last_position = COALESCE($1, last_position),
            time_spent_seconds = time_spent_seconds + COALESCE($2, 0),
            notes = COALESCE($3, notes)
         WHERE id = $4
         RETURNING {PROGRESS_COLUMNS}",
    ))
    .bind(params.last_position)
    .bind(params.time_spent_delta)
    .bind(params.notes)
    .bind(progress_id)
    .fetch_one(executor)
    .await
}

/// Sets the completion flag and timestamp only if the row is not already
/// completed, so the first completion timestamp is never overwritten.
pub(crate) async fn mark_completed(
    executor: impl PgExecutor<'_>,
    progress_id: &str,
    completed_at: time::PrimitiveDateTime,
) -> Result<LessonProgress, sqlx::Error> {
    sqlx::query_as::<_, LessonProgress>(&format!(
        "UPDATE lesson_progress SET
            is_completed = TRUE,
            completed_at = CASE WHEN is_completed THEN completed_at ELSE $1 END
         WHERE id = $2
         RETURNING {PROGRESS_COLUMNS}",
    ))
    .bind(completed_at)
    .bind(progress_id)
    .fetch_one(executor)
    .await
}

/// Completed rows whose lesson is still eligible (published lesson in a
/// published module of the enrollment's course).
pub(crate) async fn count_completed_eligible(
    executor: impl PgExecutor<'_>,
    enrollment_id: &str,
    course_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(lp.id)
         FROM lesson_progress lp
         JOIN lessons l ON l.id = lp.lesson_id
         JOIN modules m ON m.id = l.module_id
         WHERE lp.enrollment_id = $1
           AND lp.is_completed
           AND m.course_id = $2
           AND l.is_published
           AND m.is_published",
    )
    .bind(enrollment_id)
    .bind(course_id)
    .fetch_one(executor)
    .await
}
