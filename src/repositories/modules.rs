use sqlx::PgExecutor;

use crate::db::models::Module;

const MODULE_COLUMNS: &str =
    "id, course_id, title, description, order_index, is_published, created_at, updated_at";

pub(crate) struct CreateModule<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) order_index: i32,
    pub(crate) is_published: bool,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl PgExecutor<'_>,
    params: CreateModule<'_>,
) -> Result<Module, sqlx::Error> {
    sqlx::query_as::<_, Module>(&format!(
        "INSERT INTO modules (
            id, course_id, title, description, order_index, is_published, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
         RETURNING {MODULE_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.order_index)
    .bind(params.is_published)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_by_id(
    executor: impl PgExecutor<'_>,
    module_id: &str,
) -> Result<Option<Module>, sqlx::Error> {
    sqlx::query_as::<_, Module>(&format!("SELECT {MODULE_COLUMNS} FROM modules WHERE id = $1"))
        .bind(module_id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn list_by_course(
    executor: impl PgExecutor<'_>,
    course_id: &str,
) -> Result<Vec<Module>, sqlx::Error> {
    sqlx::query_as::<_, Module>(&format!(
        "SELECT {MODULE_COLUMNS} FROM modules
         WHERE course_id = $1
         ORDER BY order_index, created_at",
    ))
    .bind(course_id)
    .fetch_all(executor)
    .await
}
