use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::schemas::lesson::{LessonProgressResponse, LessonProgressUpdateRequest};
use crate::services::lesson_progress::{self, LessonProgressInput};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:lesson_id/complete", post(complete_lesson))
        .route("/:lesson_id/progress", post(update_lesson_progress))
}

async fn complete_lesson(
    Path(lesson_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    payload: Option<Json<LessonProgressUpdateRequest>>,
) -> Result<Json<LessonProgressResponse>, ApiError> {
    let update = payload.map(|Json(body)| body).unwrap_or_default();

    let record = lesson_progress::record(
        state.db(),
        &user.id,
        &lesson_id,
        LessonProgressInput {
            last_position: update.last_position,
            time_spent_seconds: update.time_spent_seconds,
            notes: update.notes,
        },
        true,
    )
    .await?;

    Ok(Json(LessonProgressResponse::from_db(record)))
}

async fn update_lesson_progress(
    Path(lesson_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<LessonProgressUpdateRequest>,
) -> Result<Json<LessonProgressResponse>, ApiError> {
    let record = lesson_progress::record(
        state.db(),
        &user.id,
        &lesson_id,
        LessonProgressInput {
            last_position: payload.last_position,
            time_spent_seconds: payload.time_spent_seconds,
            notes: payload.notes,
        },
        false,
    )
    .await?;

    Ok(Json(LessonProgressResponse::from_db(record)))
}

#[cfg(test)]
mod tests;
