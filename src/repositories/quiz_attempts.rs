use sqlx::PgExecutor;

use crate::db::models::{QuestionResponse, QuizAttempt};

const ATTEMPT_COLUMNS: &str = "id, quiz_id, student_id, enrollment_id, attempt_number, \
     started_at, completed_at, score, passed, time_taken_seconds";

const RESPONSE_COLUMNS: &str = "id, attempt_id, question_id, selected_answer_id, text_response, \
     points_earned, is_correct, feedback, answered_at";

pub(crate) async fn count_for_student(
    executor: impl PgExecutor<'_>,
    quiz_id: &str,
    student_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(id) FROM quiz_attempts WHERE quiz_id = $1 AND student_id = $2",
    )
    .bind(quiz_id)
    .bind(student_id)
    .fetch_one(executor)
    .await
}

pub(crate) struct CreateAttempt<'a> {
    pub(crate) id: &'a str,
    pub(crate) quiz_id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) enrollment_id: &'a str,
    pub(crate) attempt_number: i32,
    pub(crate) started_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl PgExecutor<'_>,
    params: CreateAttempt<'_>,
) -> Result<QuizAttempt, sqlx::Error> {
    sqlx::query_as::<_, QuizAttempt>(&format!(
        "INSERT INTO quiz_attempts (
            id, quiz_id, student_id, enrollment_id, attempt_number, started_at, passed
         ) VALUES ($1,$2,$3,$4,$5,$6,FALSE)
         RETURNING {ATTEMPT_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.quiz_id)
    .bind(params.student_id)
    .bind(params.enrollment_id)
    .bind(params.attempt_number)
    .bind(params.started_at)
    .fetch_one(executor)
    .await
}

pub(crate) struct CreateResponse<'a> {
    pub(crate) id: &'a str,
    pub(crate) attempt_id: &'a str,
    pub(crate) question_id: &'a str,
    pub(crate) selected_answer_id: Option<&'a str>,
    pub(crate) text_response: Option<&'a str>,
    pub(crate) points_earned: f64,
    pub(crate) is_correct: Option<bool>,
    pub(crate) feedback: Option<&'a str>,
    pub(crate) answered_at: time::PrimitiveDateTime,
}

pub(crate) async fn create_response(
    executor: impl PgExecutor<'_>,
    params: CreateResponse<'_>,
) -> Result<QuestionResponse, sqlx::Error> {
    sqlx::query_as::<_, QuestionResponse>(&format!(
        "INSERT INTO question_responses (
            id, attempt_id, question_id, selected_answer_id, text_response, points_earned,
            is_correct, feedback, answered_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
         RETURNING {RESPONSE_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.attempt_id)
    .bind(params.question_id)
    .bind(params.selected_answer_id)
    .bind(params.text_response)
    .bind(params.points_earned)
    .bind(params.is_correct)
    .bind(params.feedback)
    .bind(params.answered_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn finalize(
    executor: impl PgExecutor<'_>,
    attempt_id: &str,
    score: f64,
    passed: bool,
    completed_at: time::PrimitiveDateTime,
    time_taken_seconds: Option<i32>,
) -> Result<QuizAttempt, sqlx::Error> {
    sqlx::query_as::<_, QuizAttempt>(&format!(
        "UPDATE quiz_attempts SET
            score = $1,
            passed = $2,
            completed_at = $3,
            time_taken_seconds = $4
         WHERE id = $5
         RETURNING {ATTEMPT_COLUMNS}",
    ))
    .bind(score)
    .bind(passed)
    .bind(completed_at)
    .bind(time_taken_seconds)
    .bind(attempt_id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn list_for_student_quiz(
    executor: impl PgExecutor<'_>,
    quiz_id: &str,
    student_id: &str,
) -> Result<Vec<QuizAttempt>, sqlx::Error> {
    sqlx::query_as::<_, QuizAttempt>(&format!(
        "SELECT {ATTEMPT_COLUMNS} FROM quiz_attempts
         WHERE quiz_id = $1 AND student_id = $2
         ORDER BY attempt_number",
    ))
    .bind(quiz_id)
    .bind(student_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_responses(
    executor: impl PgExecutor<'_>,
    attempt_id: &str,
) -> Result<Vec<QuestionResponse>, sqlx::Error> {
    sqlx::query_as::<_, QuestionResponse>(&format!(
        "SELECT {RESPONSE_COLUMNS} FROM question_responses
         WHERE attempt_id = $1
         ORDER BY answered_at",
    ))
    .bind(attempt_id)
    .fetch_all(executor)
    .await
}
