use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::CourseReview;

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewCreate {
    pub(crate) rating: i32,
    pub(crate) comment: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReviewResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) student_id: String,
    pub(crate) rating: i32,
    pub(crate) comment: String,
    pub(crate) created_at: String,
}

impl ReviewResponse {
    pub(crate) fn from_db(review: CourseReview) -> Self {
        Self {
            id: review.id,
            course_id: review.course_id,
            student_id: review.student_id,
            rating: review.rating,
            comment: review.comment,
            created_at: format_primitive(review.created_at),
        }
    }
}
