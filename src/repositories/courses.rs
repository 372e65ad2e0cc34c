use sqlx::PgExecutor;

use crate::db::models::Course;
use crate::db::types::CourseStatus;

const COURSE_COLUMNS: &str = "id, slug, title, description, instructor_id, status, \
     enrollment_limit, created_at, updated_at, published_at";

pub(crate) struct CreateCourse<'a> {
    pub(crate) id: &'a str,
    pub(crate) slug: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: &'a str,
    pub(crate) instructor_id: &'a str,
    pub(crate) status: CourseStatus,
    pub(crate) enrollment_limit: Option<i32>,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
    pub(crate) published_at: Option<time::PrimitiveDateTime>,
}

pub(crate) async fn create(
    executor: impl PgExecutor<'_>,
    params: CreateCourse<'_>,
) -> Result<Course, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "INSERT INTO courses (
            id, slug, title, description, instructor_id, status,
            enrollment_limit, created_at, updated_at, published_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
         RETURNING {COURSE_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.slug)
    .bind(params.title)
    .bind(params.description)
    .bind(params.instructor_id)
    .bind(params.status)
    .bind(params.enrollment_limit)
    .bind(params.created_at)
    .bind(params.updated_at)
    .bind(params.published_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_by_id(
    executor: impl PgExecutor<'_>,
    course_id: &str,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"))
        .bind(course_id)
        .fetch_optional(executor)
        .await
}

/// Locks the course row so concurrent enrollment-capacity checks on the
/// same course serialize.
pub(crate) async fn lock_by_id(
    executor: impl PgExecutor<'_>,
    course_id: &str,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1 FOR UPDATE"
    ))
    .bind(course_id)
    .fetch_optional(executor)
    .await
}

/// Published courses, plus the caller's own unpublished ones when an
/// instructor id is given.
pub(crate) async fn list_visible(
    executor: impl PgExecutor<'_>,
    instructor_id: Option<&str>,
) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses
         WHERE status = 'published' OR instructor_id = $1
         ORDER BY created_at DESC",
    ))
    .bind(instructor_id.unwrap_or(""))
    .fetch_all(executor)
    .await
}
