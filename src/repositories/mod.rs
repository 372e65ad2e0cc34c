pub(crate) mod courses;
pub(crate) mod enrollments;
pub(crate) mod lesson_progress;
pub(crate) mod lessons;
pub(crate) mod modules;
pub(crate) mod quiz_attempts;
pub(crate) mod quizzes;
pub(crate) mod reviews;
pub(crate) mod users;
