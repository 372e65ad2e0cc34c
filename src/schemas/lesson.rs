use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::LessonProgress;

/// All fields optional: absent ones keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct LessonProgressUpdateRequest {
    #[serde(default)]
    pub(crate) last_position: Option<i32>,
    #[serde(default)]
    pub(crate) time_spent_seconds: Option<i32>,
    #[serde(default)]
    pub(crate) notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LessonProgressResponse {
    pub(crate) id: String,
    pub(crate) enrollment_id: String,
    pub(crate) lesson_id: String,
    pub(crate) started_at: String,
    pub(crate) completed_at: Option<String>,
    pub(crate) last_position: i32,
    pub(crate) is_completed: bool,
    pub(crate) time_spent_seconds: i32,
    pub(crate) notes: Option<String>,
}

impl LessonProgressResponse {
    pub(crate) fn from_db(progress: LessonProgress) -> Self {
        Self {
            id: progress.id,
            enrollment_id: progress.enrollment_id,
            lesson_id: progress.lesson_id,
            started_at: format_primitive(progress.started_at),
            completed_at: progress.completed_at.map(format_primitive),
            last_position: progress.last_position,
            is_completed: progress.is_completed,
            time_spent_seconds: progress.time_spent_seconds,
            notes: progress.notes,
        }
    }
}
