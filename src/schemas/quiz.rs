use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::core::time::format_primitive;
use crate::db::models::{QuestionResponse, Quiz, QuizAttempt};
use crate::db::types::QuestionType;

#[derive(Debug, Deserialize)]
pub(crate) struct QuizCreate {
    pub(crate) course_id: String,
    #[serde(default)]
    pub(crate) module_id: Option<String>,
    #[serde(default)]
    pub(crate) lesson_id: Option<String>,
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) instructions: Option<String>,
    #[serde(default = "default_passing_score")]
    pub(crate) passing_score: f64,
    #[serde(default = "default_max_attempts")]
    pub(crate) max_attempts: i32,
    #[serde(default)]
    pub(crate) time_limit_minutes: Option<i32>,
    #[serde(default = "default_true")]
    pub(crate) randomize_questions: bool,
    #[serde(default = "default_true")]
    pub(crate) randomize_answers: bool,
    #[serde(default = "default_true")]
    pub(crate) show_correct_answers: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub(crate) available_from: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub(crate) available_until: Option<OffsetDateTime>,
    #[serde(default)]
    pub(crate) is_published: bool,
    pub(crate) questions: Vec<QuestionCreate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuestionCreate {
    pub(crate) question_text: String,
    pub(crate) question_type: QuestionType,
    #[serde(default)]
    pub(crate) explanation: Option<String>,
    #[serde(default = "default_points")]
    pub(crate) points: f64,
    #[serde(default)]
    pub(crate) order_index: i32,
    #[serde(default = "default_true")]
    pub(crate) is_required: bool,
    #[serde(default)]
    pub(crate) answers: Vec<AnswerCreate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerCreate {
    pub(crate) answer_text: String,
    #[serde(default)]
    pub(crate) is_correct: bool,
    #[serde(default)]
    pub(crate) order_index: i32,
    #[serde(default)]
    pub(crate) feedback: Option<String>,
}

impl QuizCreate {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Quiz title must not be empty".to_string());
        }
        if !(0.0..=100.0).contains(&self.passing_score) {
            return Err("Passing score must be between 0 and 100".to_string());
        }
        if self.max_attempts < 1 {
            return Err("Max attempts must be at least 1".to_string());
        }
        if self.questions.is_empty() {
            return Err("Quiz must contain at least one question".to_string());
        }
        for question in &self.questions {
            if question.question_text.trim().is_empty() {
                return Err("Question text must not be empty".to_string());
            }
            if question.points < 0.0 {
                return Err("Question points must not be negative".to_string());
            }
            if question.question_type.is_auto_gradable() && question.answers.is_empty() {
                return Err(format!(
                    "A {} question needs at least one answer option",
                    match question.question_type {
                        QuestionType::MultipleChoice => "multiple choice",
                        _ => "true/false",
                    }
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) module_id: Option<String>,
    pub(crate) lesson_id: Option<String>,
    pub(crate) title: String,
    pub(crate) instructions: Option<String>,
    pub(crate) passing_score: f64,
    pub(crate) max_attempts: i32,
    pub(crate) time_limit_minutes: Option<i32>,
    pub(crate) available_from: Option<String>,
    pub(crate) available_until: Option<String>,
    pub(crate) is_published: bool,
    pub(crate) question_count: usize,
}

impl QuizResponse {
    pub(crate) fn from_db(quiz: Quiz, question_count: usize) -> Self {
        Self {
            id: quiz.id,
            course_id: quiz.course_id,
            module_id: quiz.module_id,
            lesson_id: quiz.lesson_id,
            title: quiz.title,
            instructions: quiz.instructions,
            passing_score: quiz.passing_score,
            max_attempts: quiz.max_attempts,
            time_limit_minutes: quiz.time_limit_minutes,
            available_from: quiz.available_from.map(format_primitive),
            available_until: quiz.available_until.map(format_primitive),
            is_published: quiz.is_published,
            question_count,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuizSubmissionRequest {
    pub(crate) quiz_id: String,
    pub(crate) responses: Vec<SubmissionResponseInput>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmissionResponseInput {
    pub(crate) question_id: String,
    #[serde(default)]
    pub(crate) selected_answer_id: Option<String>,
    #[serde(default)]
    pub(crate) text_response: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizAttemptResponse {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) enrollment_id: String,
    pub(crate) attempt_number: i32,
    pub(crate) started_at: String,
    pub(crate) completed_at: Option<String>,
    pub(crate) score: Option<f64>,
    pub(crate) passed: bool,
    pub(crate) time_taken_seconds: Option<i32>,
}

impl QuizAttemptResponse {
    pub(crate) fn from_db(attempt: QuizAttempt) -> Self {
        Self {
            id: attempt.id,
            quiz_id: attempt.quiz_id,
            enrollment_id: attempt.enrollment_id,
            attempt_number: attempt.attempt_number,
            started_at: format_primitive(attempt.started_at),
            completed_at: attempt.completed_at.map(format_primitive),
            score: attempt.score,
            passed: attempt.passed,
            time_taken_seconds: attempt.time_taken_seconds,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponseView {
    pub(crate) question_id: String,
    pub(crate) selected_answer_id: Option<String>,
    pub(crate) text_response: Option<String>,
    pub(crate) points_earned: f64,
    pub(crate) is_correct: Option<bool>,
    pub(crate) feedback: Option<String>,
}

impl QuestionResponseView {
    pub(crate) fn from_db(response: QuestionResponse) -> Self {
        Self {
            question_id: response.question_id,
            selected_answer_id: response.selected_answer_id,
            text_response: response.text_response,
            points_earned: response.points_earned,
            is_correct: response.is_correct,
            feedback: response.feedback,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptWithResponses {
    #[serde(flatten)]
    pub(crate) attempt: QuizAttemptResponse,
    pub(crate) responses: Vec<QuestionResponseView>,
}

fn default_passing_score() -> f64 {
    60.0
}

fn default_max_attempts() -> i32 {
    3
}

fn default_points() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}
