use sqlx::PgExecutor;

use crate::db::models::CourseReview;

const REVIEW_COLUMNS: &str =
    "id, course_id, student_id, rating, comment, created_at, updated_at";

pub(crate) struct CreateReview<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) rating: i32,
    pub(crate) comment: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl PgExecutor<'_>,
    params: CreateReview<'_>,
) -> Result<CourseReview, sqlx::Error> {
    sqlx::query_as::<_, CourseReview>(&format!(
        "INSERT INTO course_reviews (id, course_id, student_id, rating, comment, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6,$7)
         RETURNING {REVIEW_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.student_id)
    .bind(params.rating)
    .bind(params.comment)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_for_student_course(
    executor: impl PgExecutor<'_>,
    student_id: &str,
    course_id: &str,
) -> Result<Option<CourseReview>, sqlx::Error> {
    sqlx::query_as::<_, CourseReview>(&format!(
        "SELECT {REVIEW_COLUMNS} FROM course_reviews
         WHERE student_id = $1 AND course_id = $2",
    ))
    .bind(student_id)
    .bind(course_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn list_by_course(
    executor: impl PgExecutor<'_>,
    course_id: &str,
) -> Result<Vec<CourseReview>, sqlx::Error> {
    sqlx::query_as::<_, CourseReview>(&format!(
        "SELECT {REVIEW_COLUMNS} FROM course_reviews
         WHERE course_id = $1
         ORDER BY created_at DESC",
    ))
    .bind(course_id)
    .fetch_all(executor)
    .await
}
