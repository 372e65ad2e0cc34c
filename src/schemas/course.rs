use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::{Course, Lesson, Module};
use crate::db::types::CourseStatus;

#[derive(Debug, Deserialize)]
pub(crate) struct CourseCreate {
    pub(crate) slug: String,
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) enrollment_limit: Option<i32>,
    #[serde(default)]
    pub(crate) publish: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseResponse {
    pub(crate) id: String,
    pub(crate) slug: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) instructor_id: String,
    pub(crate) status: CourseStatus,
    pub(crate) enrollment_limit: Option<i32>,
    pub(crate) created_at: String,
    pub(crate) published_at: Option<String>,
}

impl CourseResponse {
    pub(crate) fn from_db(course: Course) -> Self {
        Self {
            id: course.id,
            slug: course.slug,
            title: course.title,
            description: course.description,
            instructor_id: course.instructor_id,
            status: course.status,
            enrollment_limit: course.enrollment_limit,
            created_at: format_primitive(course.created_at),
            published_at: course.published_at.map(format_primitive),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModuleCreate {
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) order_index: i32,
    #[serde(default = "default_true")]
    pub(crate) is_published: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LessonCreate {
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) order_index: i32,
    #[serde(default = "default_estimated_time")]
    pub(crate) estimated_time_minutes: i32,
    #[serde(default = "default_true")]
    pub(crate) is_published: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ModuleResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) order_index: i32,
    pub(crate) is_published: bool,
}

impl ModuleResponse {
    pub(crate) fn from_db(module: Module) -> Self {
        Self {
            id: module.id,
            course_id: module.course_id,
            title: module.title,
            description: module.description,
            order_index: module.order_index,
            is_published: module.is_published,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LessonResponse {
    pub(crate) id: String,
    pub(crate) module_id: String,
    pub(crate) title: String,
    pub(crate) order_index: i32,
    pub(crate) estimated_time_minutes: i32,
    pub(crate) is_published: bool,
}

impl LessonResponse {
    pub(crate) fn from_db(lesson: Lesson) -> Self {
        Self {
            id: lesson.id,
            module_id: lesson.module_id,
            title: lesson.title,
            order_index: lesson.order_index,
            estimated_time_minutes: lesson.estimated_time_minutes,
            is_published: lesson.is_published,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ModuleWithLessons {
    #[serde(flatten)]
    pub(crate) module: ModuleResponse,
    pub(crate) lessons: Vec<LessonResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseDetailResponse {
    #[serde(flatten)]
    pub(crate) course: CourseResponse,
    pub(crate) modules: Vec<ModuleWithLessons>,
}

fn default_true() -> bool {
    true
}

fn default_estimated_time() -> i32 {
    10
}
