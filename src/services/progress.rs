use sqlx::PgConnection;
use time::PrimitiveDateTime;

use crate::db::models::Enrollment;
use crate::db::types::EnrollmentStatus;
use crate::repositories::{enrollments, lesson_progress, lessons};
use crate::services::grading::round2;

/// Status edge derived from a freshly computed percentage. `completed`
/// never regresses; `Started` fires only on the enrolled -> in_progress
/// edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusTransition {
    None,
    Started,
    Completed,
}

pub(crate) fn percentage(completed_lessons: i64, total_lessons: i64) -> f64 {
    round2(completed_lessons as f64 / total_lessons as f64 * 100.0)
}

pub(crate) fn plan_transition(
    current: EnrollmentStatus,
    percentage: f64,
) -> StatusTransition {
    if percentage >= 100.0 && current != EnrollmentStatus::Completed {
        StatusTransition::Completed
    } else if percentage > 0.0
        && percentage < 100.0
        && current == EnrollmentStatus::Enrolled
    {
        StatusTransition::Started
    } else {
        StatusTransition::None
    }
}

/// Recomputes the enrollment aggregate from eligible-lesson completion
/// counts. Runs inside the caller's transaction; the caller must already
/// hold the enrollment row lock.
///
/// A course with zero eligible lessons is a defined no-op: there is no
/// denominator to compute a percentage from.
pub(crate) async fn recalculate(
    conn: &mut PgConnection,
    enrollment: &Enrollment,
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    let total_lessons = lessons::count_eligible(&mut *conn, &enrollment.course_id).await?;
    if total_lessons == 0 {
        return Ok(());
    }

    let completed_lessons =
        lesson_progress::count_completed_eligible(&mut *conn, &enrollment.id, &enrollment.course_id)
            .await?;

    let progress_percentage = percentage(completed_lessons, total_lessons);
    let transition = plan_transition(enrollment.status, progress_percentage);

    let (status, started_at, completed_at) = match transition {
        StatusTransition::Completed => (Some(EnrollmentStatus::Completed), None, Some(now)),
        StatusTransition::Started => (Some(EnrollmentStatus::InProgress), Some(now), None),
        StatusTransition::None => (None, None, None),
    };

    enrollments::write_progress(
        &mut *conn,
        &enrollment.id,
        enrollments::ProgressWrite {
            progress_percentage,
            status,
            started_at,
            completed_at,
            last_accessed: now,
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_is_two_decimal() {
        assert_eq!(percentage(2, 4), 50.0);
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(4, 4), 100.0);
    }

    #[test]
    fn first_completion_starts_enrollment() {
        assert_eq!(plan_transition(EnrollmentStatus::Enrolled, 25.0), StatusTransition::Started);
    }

    #[test]
    fn started_does_not_refire_once_in_progress() {
        assert_eq!(plan_transition(EnrollmentStatus::InProgress, 75.0), StatusTransition::None);
    }

    #[test]
    fn full_percentage_completes() {
        assert_eq!(plan_transition(EnrollmentStatus::InProgress, 100.0), StatusTransition::Completed);
        assert_eq!(plan_transition(EnrollmentStatus::Enrolled, 100.0), StatusTransition::Completed);
    }

    #[test]
    fn completed_never_regresses() {
        assert_eq!(plan_transition(EnrollmentStatus::Completed, 100.0), StatusTransition::None);
        assert_eq!(plan_transition(EnrollmentStatus::Completed, 50.0), StatusTransition::None);
    }

    #[test]
    fn zero_percentage_stays_enrolled() {
        assert_eq!(plan_transition(EnrollmentStatus::Enrolled, 0.0), StatusTransition::None);
    }
}
