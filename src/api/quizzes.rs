use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{require_course_owner, CurrentInstructor, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::{primitive_now_utc, to_primitive_utc};
use crate::repositories;
use crate::schemas::quiz::{
    AttemptWithResponses, QuestionResponseView, QuizAttemptResponse, QuizCreate, QuizResponse,
    QuizSubmissionRequest,
};
use crate::services::quiz_submission::{self, SubmittedResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_quiz))
        .route("/submit", post(submit_quiz))
        .route("/:quiz_id/attempts", get(list_my_attempts))
}

async fn create_quiz(
    CurrentInstructor(instructor): CurrentInstructor,
    State(state): State<AppState>,
    Json(payload): Json<QuizCreate>,
) -> Result<(StatusCode, Json<QuizResponse>), ApiError> {
    payload.validate().map_err(ApiError::BadRequest)?;

    let course = require_course_owner(&state, &instructor, &payload.course_id).await?;

    if let Some(module_id) = payload.module_id.as_deref() {
        let module = repositories::modules::find_by_id(state.db(), module_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch module"))?;
        if module.map(|module| module.course_id) != Some(course.id.clone()) {
            return Err(ApiError::BadRequest(
                "Module does not belong to this course".to_string(),
            ));
        }
    }

    if let Some(lesson_id) = payload.lesson_id.as_deref() {
        let context = repositories::lessons::find_context(state.db(), lesson_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch lesson"))?;
        if context.map(|context| context.course_id) != Some(course.id.clone()) {
            return Err(ApiError::BadRequest(
                "Lesson does not belong to this course".to_string(),
            ));
        }
    }

    let now = primitive_now_utc();

    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let quiz = repositories::quizzes::create_quiz(
        &mut *tx,
        repositories::quizzes::CreateQuiz {
            id: &Uuid::new_v4().to_string(),
            course_id: &course.id,
            module_id: payload.module_id.as_deref(),
            lesson_id: payload.lesson_id.as_deref(),
            title: payload.title.trim(),
            instructions: payload.instructions.as_deref(),
            passing_score: payload.passing_score,
            max_attempts: payload.max_attempts,
            time_limit_minutes: payload.time_limit_minutes,
            randomize_questions: payload.randomize_questions,
            randomize_answers: payload.randomize_answers,
            show_correct_answers: payload.show_correct_answers,
            available_from: payload.available_from.map(to_primitive_utc),
            available_until: payload.available_until.map(to_primitive_utc),
            is_published: payload.is_published,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create quiz"))?;

    for (position, question) in payload.questions.iter().enumerate() {
        let order_index =
            if question.order_index != 0 { question.order_index } else { position as i32 };
        let created = repositories::quizzes::create_question(
            &mut *tx,
            repositories::quizzes::CreateQuestion {
                id: &Uuid::new_v4().to_string(),
                quiz_id: &quiz.id,
                question_text: question.question_text.trim(),
                question_type: question.question_type,
                explanation: question.explanation.as_deref(),
                points: question.points,
                order_index,
                is_required: question.is_required,
                created_at: now,
                updated_at: now,
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create question"))?;

        for (answer_position, answer) in question.answers.iter().enumerate() {
            let order_index =
                if answer.order_index != 0 { answer.order_index } else { answer_position as i32 };
            repositories::quizzes::create_answer(
                &mut *tx,
                repositories::quizzes::CreateAnswer {
                    id: &Uuid::new_v4().to_string(),
                    question_id: &created.id,
                    answer_text: &answer.answer_text,
                    is_correct: answer.is_correct,
                    order_index,
                    feedback: answer.feedback.as_deref(),
                },
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to create answer"))?;
        }
    }

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit quiz"))?;

    let question_count = payload.questions.len();
    Ok((StatusCode::CREATED, Json(QuizResponse::from_db(quiz, question_count))))
}

async fn submit_quiz(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<QuizSubmissionRequest>,
) -> Result<Json<AttemptWithResponses>, ApiError> {
    let submitted = payload
        .responses
        .into_iter()
        .map(|response| SubmittedResponse {
            question_id: response.question_id,
            selected_answer_id: response.selected_answer_id,
            text_response: response.text_response,
        })
        .collect::<Vec<_>>();

    let outcome =
        quiz_submission::submit(state.db(), &user.id, &payload.quiz_id, &submitted).await?;

    let response = AttemptWithResponses {
        attempt: QuizAttemptResponse::from_db(outcome.attempt),
        responses: outcome
            .responses
            .into_iter()
            .map(QuestionResponseView::from_db)
            .collect(),
    };

    Ok(Json(response))
}

async fn list_my_attempts(
    Path(quiz_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AttemptWithResponses>>, ApiError> {
    let quiz = repositories::quizzes::find_by_id(state.db(), &quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch quiz"))?;

    if quiz.is_none() {
        return Err(ApiError::NotFound("Quiz not found".to_string()));
    }

    let attempts =
        repositories::quiz_attempts::list_for_student_quiz(state.db(), &quiz_id, &user.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list attempts"))?;

    let mut response = Vec::with_capacity(attempts.len());
    for attempt in attempts {
        let rows = repositories::quiz_attempts::list_responses(state.db(), &attempt.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list attempt responses"))?;
        response.push(AttemptWithResponses {
            attempt: QuizAttemptResponse::from_db(attempt),
            responses: rows.into_iter().map(QuestionResponseView::from_db).collect(),
        });
    }

    Ok(Json(response))
}
