pub(crate) mod enrollment;
pub(crate) mod error;
pub(crate) mod grading;
pub(crate) mod lesson_progress;
pub(crate) mod progress;
pub(crate) mod quiz_submission;
pub(crate) mod reviews;
