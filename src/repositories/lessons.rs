use sqlx::{FromRow, PgExecutor};

use crate::db::models::Lesson;

const LESSON_COLUMNS: &str =
    "id, module_id, title, order_index, estimated_time_minutes, is_published, created_at, \
     updated_at";

/// A lesson resolved through its module up to the owning course, so callers
/// never traverse relationships lazily.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct LessonContext {
    pub(crate) lesson_id: String,
    pub(crate) module_id: String,
    pub(crate) course_id: String,
}

pub(crate) struct CreateLesson<'a> {
    pub(crate) id: &'a str,
    pub(crate) module_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) order_index: i32,
    pub(crate) estimated_time_minutes: i32,
    pub(crate) is_published: bool,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl PgExecutor<'_>,
    params: CreateLesson<'_>,
) -> Result<Lesson, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(&format!(
        "INSERT INTO lessons (
            id, module_id, title, order_index, estimated_time_minutes, is_published,
            created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
         RETURNING {LESSON_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.module_id)
    .bind(params.title)
    .bind(params.order_index)
    .bind(params.estimated_time_minutes)
    .bind(params.is_published)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_context(
    executor: impl PgExecutor<'_>,
    lesson_id: &str,
) -> Result<Option<LessonContext>, sqlx::Error> {
    sqlx::query_as::<_, LessonContext>(
        "SELECT l.id AS lesson_id,
                l.module_id,
                m.course_id
         FROM lessons l
         JOIN modules m ON m.id = l.module_id
         WHERE l.id = $1",
    )
    .bind(lesson_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn list_by_module(
    executor: impl PgExecutor<'_>,
    module_id: &str,
) -> Result<Vec<Lesson>, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(&format!(
        "SELECT {LESSON_COLUMNS} FROM lessons
         WHERE module_id = $1
         ORDER BY order_index, created_at",
    ))
    .bind(module_id)
    .fetch_all(executor)
    .await
}

/// Lessons counted in progress denominators: published, inside a published
/// module of the given course.
pub(crate) async fn count_eligible(
    executor: impl PgExecutor<'_>,
    course_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(l.id)
         FROM lessons l
         JOIN modules m ON m.id = l.module_id
         WHERE m.course_id = $1 AND l.is_published AND m.is_published",
    )
    .bind(course_id)
    .fetch_one(executor)
    .await
}
