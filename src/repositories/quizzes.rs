use sqlx::{PgConnection, PgExecutor};

use crate::db::models::{Answer, Question, Quiz};
use crate::db::types::QuestionType;

const QUIZ_COLUMNS: &str = "id, course_id, module_id, lesson_id, title, instructions, \
     passing_score, max_attempts, time_limit_minutes, randomize_questions, randomize_answers, \
     show_correct_answers, available_from, available_until, is_published, created_at, updated_at";

const QUESTION_COLUMNS: &str = "id, quiz_id, question_text, question_type, explanation, points, \
     order_index, is_required, created_at, updated_at";

const ANSWER_COLUMNS: &str = "id, question_id, answer_text, is_correct, order_index, feedback";

/// Fully-resolved quiz definition: the quiz row plus every question with
/// its answers, loaded eagerly for grading.
#[derive(Debug, Clone)]
pub(crate) struct QuizAggregate {
    pub(crate) quiz: Quiz,
    pub(crate) questions: Vec<QuestionWithAnswers>,
}

#[derive(Debug, Clone)]
pub(crate) struct QuestionWithAnswers {
    pub(crate) question: Question,
    pub(crate) answers: Vec<Answer>,
}

pub(crate) struct CreateQuiz<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) module_id: Option<&'a str>,
    pub(crate) lesson_id: Option<&'a str>,
    pub(crate) title: &'a str,
    pub(crate) instructions: Option<&'a str>,
    pub(crate) passing_score: f64,
    pub(crate) max_attempts: i32,
    pub(crate) time_limit_minutes: Option<i32>,
    pub(crate) randomize_questions: bool,
    pub(crate) randomize_answers: bool,
    pub(crate) show_correct_answers: bool,
    pub(crate) available_from: Option<time::PrimitiveDateTime>,
    pub(crate) available_until: Option<time::PrimitiveDateTime>,
    pub(crate) is_published: bool,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) struct CreateQuestion<'a> {
    pub(crate) id: &'a str,
    pub(crate) quiz_id: &'a str,
    pub(crate) question_text: &'a str,
    pub(crate) question_type: QuestionType,
    pub(crate) explanation: Option<&'a str>,
    pub(crate) points: f64,
    pub(crate) order_index: i32,
    pub(crate) is_required: bool,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) struct CreateAnswer<'a> {
    pub(crate) id: &'a str,
    pub(crate) question_id: &'a str,
    pub(crate) answer_text: &'a str,
    pub(crate) is_correct: bool,
    pub(crate) order_index: i32,
    pub(crate) feedback: Option<&'a str>,
}

pub(crate) async fn create_quiz(
    executor: impl PgExecutor<'_>,
    params: CreateQuiz<'_>,
) -> Result<Quiz, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!(
        "INSERT INTO quizzes (
            id, course_id, module_id, lesson_id, title, instructions, passing_score,
            max_attempts, time_limit_minutes, randomize_questions, randomize_answers,
            show_correct_answers, available_from, available_until, is_published,
            created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17)
         RETURNING {QUIZ_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.module_id)
    .bind(params.lesson_id)
    .bind(params.title)
    .bind(params.instructions)
    .bind(params.passing_score)
    .bind(params.max_attempts)
    .bind(params.time_limit_minutes)
    .bind(params.randomize_questions)
    .bind(params.randomize_answers)
    .bind(params.show_correct_answers)
    .bind(params.available_from)
    .bind(params.available_until)
    .bind(params.is_published)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn create_question(
    executor: impl PgExecutor<'_>,
    params: CreateQuestion<'_>,
) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (
            id, quiz_id, question_text, question_type, explanation, points, order_index,
            is_required, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
         RETURNING {QUESTION_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.quiz_id)
    .bind(params.question_text)
    .bind(params.question_type)
    .bind(params.explanation)
    .bind(params.points)
    .bind(params.order_index)
    .bind(params.is_required)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn create_answer(
    executor: impl PgExecutor<'_>,
    params: CreateAnswer<'_>,
) -> Result<Answer, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "INSERT INTO answers (id, question_id, answer_text, is_correct, order_index, feedback)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {ANSWER_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.question_id)
    .bind(params.answer_text)
    .bind(params.is_correct)
    .bind(params.order_index)
    .bind(params.feedback)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_by_id(
    executor: impl PgExecutor<'_>,
    quiz_id: &str,
) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1"))
        .bind(quiz_id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn load_aggregate(
    conn: &mut PgConnection,
    quiz_id: &str,
) -> Result<Option<QuizAggregate>, sqlx::Error> {
    let quiz =
        sqlx::query_as::<_, Quiz>(&format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1"))
            .bind(quiz_id)
            .fetch_optional(&mut *conn)
            .await?;

    let Some(quiz) = quiz else {
        return Ok(None);
    };

    let questions = sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions WHERE quiz_id = $1 ORDER BY order_index",
    ))
    .bind(quiz_id)
    .fetch_all(&mut *conn)
    .await?;

    let answers = sqlx::query_as::<_, Answer>(&format!(
        "SELECT {ANSWER_COLUMNS} FROM answers
         WHERE question_id IN (SELECT id FROM questions WHERE quiz_id = $1)
         ORDER BY order_index",
    ))
    .bind(quiz_id)
    .fetch_all(&mut *conn)
    .await?;

    let questions = questions
        .into_iter()
        .map(|question| {
            let answers = answers
                .iter()
                .filter(|answer| answer.question_id == question.id)
                .cloned()
                .collect();
            QuestionWithAnswers { question, answers }
        })
        .collect();

    Ok(Some(QuizAggregate { quiz, questions }))
}

impl QuizAggregate {
    pub(crate) fn question(&self, question_id: &str) -> Option<&QuestionWithAnswers> {
        self.questions.iter().find(|entry| entry.question.id == question_id)
    }
}
