use thiserror::Error;

/// Domain failures of the enrollment / progress / quiz flows. Handlers map
/// these onto HTTP statuses; persistence errors pass through untouched and
/// abort the surrounding transaction.
#[derive(Debug, Error)]
pub(crate) enum FlowError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("No active enrollment in this course")]
    NotEnrolled,
    #[error("{0}")]
    LimitExceeded(&'static str),
    #[error("{0}")]
    AlreadyExists(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
