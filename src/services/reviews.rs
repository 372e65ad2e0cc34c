use sqlx::PgPool;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::CourseReview;
use crate::repositories::{courses, enrollments, reviews};
use crate::services::error::FlowError;

/// One review per student per course, gated on a completed enrollment.
pub(crate) async fn create(
    pool: &PgPool,
    student_id: &str,
    course_id: &str,
    rating: i32,
    comment: &str,
) -> Result<CourseReview, FlowError> {
    if !(1..=5).contains(&rating) {
        return Err(FlowError::Validation("Rating must be between 1 and 5".to_string()));
    }
    if comment.trim().is_empty() {
        return Err(FlowError::Validation("Review comment must not be empty".to_string()));
    }

    let mut tx = pool.begin().await?;

    courses::find_by_id(&mut *tx, course_id).await?.ok_or(FlowError::NotFound("Course"))?;

    let completed =
        enrollments::find_completed_for_student_course(&mut *tx, student_id, course_id).await?;
    if completed.is_none() {
        return Err(FlowError::Validation(
            "Must complete course before reviewing".to_string(),
        ));
    }

    let existing = reviews::find_for_student_course(&mut *tx, student_id, course_id).await?;
    if existing.is_some() {
        return Err(FlowError::AlreadyExists("Already reviewed this course"));
    }

    let now = primitive_now_utc();
    let review = reviews::create(
        &mut *tx,
        reviews::CreateReview {
            id: &Uuid::new_v4().to_string(),
            course_id,
            student_id,
            rating,
            comment: comment.trim(),
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    tx.commit().await?;
    Ok(review)
}
