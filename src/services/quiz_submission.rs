use std::collections::HashSet;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::{QuestionResponse, QuizAttempt};
use crate::repositories::{enrollments, quiz_attempts, quizzes};
use crate::services::error::FlowError;
use crate::services::grading;

#[derive(Debug)]
pub(crate) struct SubmittedResponse {
    pub(crate) question_id: String,
    pub(crate) selected_answer_id: Option<String>,
    pub(crate) text_response: Option<String>,
}

#[derive(Debug)]
pub(crate) struct AttemptOutcome {
    pub(crate) attempt: QuizAttempt,
    pub(crate) responses: Vec<QuestionResponse>,
}

/// Grades and persists one quiz submission.
///
/// The whole flow runs in a single transaction with the enrollment row
/// locked, so attempt numbering is strictly sequential per student and a
/// failed grading pass leaves no partial responses behind.
pub(crate) async fn submit(
    pool: &PgPool,
    student_id: &str,
    quiz_id: &str,
    submitted: &[SubmittedResponse],
) -> Result<AttemptOutcome, FlowError> {
    let mut tx = pool.begin().await?;
    let now = primitive_now_utc();

    let aggregate = quizzes::load_aggregate(&mut *tx, quiz_id)
        .await?
        .filter(|aggregate| aggregate.quiz.is_published)
        .ok_or(FlowError::NotFound("Quiz"))?;

    if let Some(available_from) = aggregate.quiz.available_from {
        if now < available_from {
            return Err(FlowError::Validation("Quiz is not yet available".to_string()));
        }
    }
    if let Some(available_until) = aggregate.quiz.available_until {
        if now > available_until {
            return Err(FlowError::Validation("Quiz is no longer available".to_string()));
        }
    }

    let enrollment = enrollments::lock_active_for_student_course(
        &mut *tx,
        student_id,
        &aggregate.quiz.course_id,
    )
    .await?
    .ok_or(FlowError::NotFound("Enrollment"))?;

    let prior_attempts = quiz_attempts::count_for_student(&mut *tx, quiz_id, student_id).await?;
    if prior_attempts >= aggregate.quiz.max_attempts as i64 {
        return Err(FlowError::LimitExceeded("Maximum attempts exceeded"));
    }
    let attempt_number = prior_attempts as i32 + 1;

    validate_submission(&aggregate, submitted)?;

    let attempt = quiz_attempts::create(
        &mut *tx,
        quiz_attempts::CreateAttempt {
            id: &Uuid::new_v4().to_string(),
            quiz_id,
            student_id,
            enrollment_id: &enrollment.id,
            attempt_number,
            started_at: now,
        },
    )
    .await?;

    let mut total_points = 0.0;
    let mut earned_points = 0.0;
    let mut responses = Vec::with_capacity(submitted.len());

    for response in submitted {
        // Validated above, so the lookup cannot fail.
        let Some(entry) = aggregate.question(&response.question_id) else {
            continue;
        };

        let graded = grading::grade_response(
            &entry.question,
            &entry.answers,
            response.selected_answer_id.as_deref(),
        );

        let feedback = response.selected_answer_id.as_deref().and_then(|selected| {
            entry
                .answers
                .iter()
                .find(|answer| answer.id == selected)
                .and_then(|answer| answer.feedback.as_deref())
        });

        total_points += entry.question.points;
        earned_points += graded.points_earned;

        let row = quiz_attempts::create_response(
            &mut *tx,
            quiz_attempts::CreateResponse {
                id: &Uuid::new_v4().to_string(),
                attempt_id: &attempt.id,
                question_id: &entry.question.id,
                selected_answer_id: response.selected_answer_id.as_deref(),
                text_response: response.text_response.as_deref(),
                points_earned: graded.points_earned,
                is_correct: graded.is_correct,
                feedback,
                answered_at: now,
            },
        )
        .await?;
        responses.push(row);
    }

    let score = grading::final_score(earned_points, total_points);
    let passed = score >= aggregate.quiz.passing_score;

    let attempt =
        quiz_attempts::finalize(&mut *tx, &attempt.id, score, passed, now, None).await?;

    tx.commit().await?;

    tracing::info!(
        quiz_id = %quiz_id,
        student_id = %student_id,
        attempt_number = attempt_number,
        score = score,
        passed = passed,
        "Quiz attempt graded"
    );

    Ok(AttemptOutcome { attempt, responses })
}

/// Rejects submissions referencing questions outside the quiz, answers
/// outside their question, or the same question twice.
fn validate_submission(
    aggregate: &quizzes::QuizAggregate,
    submitted: &[SubmittedResponse],
) -> Result<(), FlowError> {
    let mut seen = HashSet::new();

    for response in submitted {
        if !seen.insert(response.question_id.as_str()) {
            return Err(FlowError::Validation(format!(
                "Duplicate response for question {}",
                response.question_id
            )));
        }

        let Some(entry) = aggregate.question(&response.question_id) else {
            return Err(FlowError::Validation(format!(
                "Question {} does not belong to this quiz",
                response.question_id
            )));
        };

        if let Some(selected) = response.selected_answer_id.as_deref() {
            if !entry.answers.iter().any(|answer| answer.id == selected) {
                return Err(FlowError::Validation(format!(
                    "Answer {selected} does not belong to question {}",
                    response.question_id
                )));
            }
        }
    }

    Ok(())
}
