use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{require_course_owner, CurrentInstructor, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::{CourseStatus, UserRole};
use crate::repositories;
use crate::schemas::course::{
    CourseCreate, CourseDetailResponse, CourseResponse, LessonCreate, LessonResponse,
    ModuleCreate, ModuleResponse, ModuleWithLessons,
};
use crate::schemas::enrollment::EnrollmentResponse;
use crate::schemas::review::{ReviewCreate, ReviewResponse};
use crate::services::{enrollment, reviews};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/:course_id", get(get_course))
        .route("/:course_id/modules", post(create_module))
        .route("/:course_id/enroll", post(enroll_course))
        .route("/:course_id/reviews", get(list_reviews).post(create_review))
}

pub(crate) fn enrollments_router() -> Router<AppState> {
    Router::new().route("/", get(list_my_enrollments))
}

pub(crate) fn modules_router() -> Router<AppState> {
    Router::new().route("/:module_id/lessons", post(create_lesson))
}

async fn create_course(
    CurrentInstructor(instructor): CurrentInstructor,
    State(state): State<AppState>,
    Json(payload): Json<CourseCreate>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiError> {
    if payload.slug.trim().is_empty() {
        return Err(ApiError::BadRequest("Course slug must not be empty".to_string()));
    }
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Course title must not be empty".to_string()));
    }

    let now = primitive_now_utc();
    let (status, published_at) =
        if payload.publish { (CourseStatus::Published, Some(now)) } else { (CourseStatus::Draft, None) };

    let course = repositories::courses::create(
        state.db(),
        repositories::courses::CreateCourse {
            id: &Uuid::new_v4().to_string(),
            slug: payload.slug.trim(),
            title: payload.title.trim(),
            description: &payload.description,
            instructor_id: &instructor.id,
            status,
            enrollment_limit: payload.enrollment_limit,
            created_at: now,
            updated_at: now,
            published_at,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create course"))?;

    Ok((StatusCode::CREATED, Json(CourseResponse::from_db(course))))
}

async fn list_courses(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let own_courses = match user.role {
        UserRole::Student => None,
        UserRole::Instructor | UserRole::Admin => Some(user.id.as_str()),
    };

    let courses = repositories::courses::list_visible(state.db(), own_courses)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list courses"))?;

    Ok(Json(courses.into_iter().map(CourseResponse::from_db).collect()))
}

async fn get_course(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<CourseDetailResponse>, ApiError> {
    let course = repositories::courses::find_by_id(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?;

    let Some(course) = course else {
        return Err(ApiError::NotFound("Course not found".to_string()));
    };

    let can_manage = user.role == UserRole::Admin || course.instructor_id == user.id;
    if course.status != CourseStatus::Published && !can_manage {
        return Err(ApiError::NotFound("Course not found".to_string()));
    }

    let module_rows = repositories::modules::list_by_course(state.db(), &course.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list modules"))?;

    let mut modules = Vec::with_capacity(module_rows.len());
    for module in module_rows {
        if !module.is_published && !can_manage {
            continue;
        }
        let lessons = repositories::lessons::list_by_module(state.db(), &module.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list lessons"))?;
        let lessons = lessons
            .into_iter()
            .filter(|lesson| lesson.is_published || can_manage)
            .map(LessonResponse::from_db)
            .collect();
        modules.push(ModuleWithLessons { module: ModuleResponse::from_db(module), lessons });
    }

    Ok(Json(CourseDetailResponse { course: CourseResponse::from_db(course), modules }))
}

async fn create_module(
    Path(course_id): Path<String>,
    CurrentInstructor(instructor): CurrentInstructor,
    State(state): State<AppState>,
    Json(payload): Json<ModuleCreate>,
) -> Result<(StatusCode, Json<ModuleResponse>), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Module title must not be empty".to_string()));
    }

    let course = require_course_owner(&state, &instructor, &course_id).await?;

    let now = primitive_now_utc();
    let module = repositories::modules::create(
        state.db(),
        repositories::modules::CreateModule {
            id: &Uuid::new_v4().to_string(),
            course_id: &course.id,
            title: payload.title.trim(),
            description: payload.description.as_deref(),
            order_index: payload.order_index,
            is_published: payload.is_published,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create module"))?;

    Ok((StatusCode::CREATED, Json(ModuleResponse::from_db(module))))
}

async fn create_lesson(
    Path(module_id): Path<String>,
    CurrentInstructor(instructor): CurrentInstructor,
    State(state): State<AppState>,
    Json(payload): Json<LessonCreate>,
) -> Result<(StatusCode, Json<LessonResponse>), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Lesson title must not be empty".to_string()));
    }

    let module = repositories::modules::find_by_id(state.db(), &module_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch module"))?;

    let Some(module) = module else {
        return Err(ApiError::NotFound("Module not found".to_string()));
    };

    require_course_owner(&state, &instructor, &module.course_id).await?;

    let now = primitive_now_utc();
    let lesson = repositories::lessons::create(
        state.db(),
        repositories::lessons::CreateLesson {
            id: &Uuid::new_v4().to_string(),
            module_id: &module.id,
            title: payload.title.trim(),
            order_index: payload.order_index,
            estimated_time_minutes: payload.estimated_time_minutes,
            is_published: payload.is_published,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create lesson"))?;

    Ok((StatusCode::CREATED, Json(LessonResponse::from_db(lesson))))
}

async fn enroll_course(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<EnrollmentResponse>, ApiError> {
    let enrollment = enrollment::enroll(state.db(), &user.id, &course_id).await?;

    Ok(Json(EnrollmentResponse::from_db(enrollment)))
}

async fn list_my_enrollments(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<EnrollmentResponse>>, ApiError> {
    let enrollments = repositories::enrollments::list_by_student(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list enrollments"))?;

    Ok(Json(enrollments.into_iter().map(EnrollmentResponse::from_db).collect()))
}

async fn create_review(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ReviewCreate>,
) -> Result<(StatusCode, Json<ReviewResponse>), ApiError> {
    let review =
        reviews::create(state.db(), &user.id, &course_id, payload.rating, &payload.comment)
            .await?;

    Ok((StatusCode::CREATED, Json(ReviewResponse::from_db(review))))
}

async fn list_reviews(
    Path(course_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ReviewResponse>>, ApiError> {
    let course = repositories::courses::find_by_id(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?;

    if course.is_none() {
        return Err(ApiError::NotFound("Course not found".to_string()));
    }

    let rows = repositories::reviews::list_by_course(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list reviews"))?;

    Ok(Json(rows.into_iter().map(ReviewResponse::from_db).collect()))
}

#[cfg(test)]
mod tests;
