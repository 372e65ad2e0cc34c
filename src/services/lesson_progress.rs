use sqlx::PgPool;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::LessonProgress;
use crate::repositories::{enrollments, lesson_progress, lessons};
use crate::services::error::FlowError;
use crate::services::progress;

/// Partial update payload; absent fields leave the stored value unchanged.
#[derive(Debug, Default)]
pub(crate) struct LessonProgressInput {
    pub(crate) last_position: Option<i32>,
    pub(crate) time_spent_seconds: Option<i32>,
    pub(crate) notes: Option<String>,
}

/// Records per-lesson progress for the student and recalculates the owning
/// enrollment's aggregate inside the same transaction, so the stored
/// percentage never diverges from the lesson rows.
///
/// Marking an already-completed lesson complete again keeps its original
/// completion timestamp.
pub(crate) async fn record(
    pool: &PgPool,
    student_id: &str,
    lesson_id: &str,
    update: LessonProgressInput,
    mark_completed: bool,
) -> Result<LessonProgress, FlowError> {
    let mut tx = pool.begin().await?;

    let context = lessons::find_context(&mut *tx, lesson_id)
        .await?
        .ok_or(FlowError::NotFound("Lesson"))?;

    let enrollment =
        enrollments::lock_active_for_student_course(&mut *tx, student_id, &context.course_id)
            .await?
            .ok_or(FlowError::NotEnrolled)?;

    let now = primitive_now_utc();

    let existing =
        lesson_progress::find_for_lesson(&mut *tx, &enrollment.id, lesson_id).await?;
    let record = match existing {
        Some(record) => record,
        None => {
            lesson_progress::create(
                &mut *tx,
                &Uuid::new_v4().to_string(),
                &enrollment.id,
                lesson_id,
                now,
            )
            .await?
        }
    };

    let mut record = lesson_progress::apply_update(
        &mut *tx,
        &record.id,
        lesson_progress::ProgressUpdate {
            last_position: update.last_position,
            time_spent_delta: update.time_spent_seconds,
            notes: update.notes.as_deref(),
        },
    )
    .await?;

    if mark_completed && !record.is_completed {
        record = lesson_progress::mark_completed(&mut *tx, &record.id, now).await?;
    }

    progress::recalculate(&mut *tx, &enrollment, now).await?;

    tx.commit().await?;
    Ok(record)
}
