use thiserror::Error;

/// Domain failures shared by every service operation.
#[derive(Debug, Error)]
pub(crate) enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("Candidate has already applied to this opportunity")]
    DuplicateApplication,
    #[error("Candidate already has an attempt for this quiz")]
    DuplicateAttempt,
    #[error("Cannot move from '{from}' to '{to}'")]
    InvalidTransition { from: &'static str, to: &'static str },
    #[error("Not enough permissions")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Opportunity is not accepting applications")]
    OpportunityClosed,
    #[error("Quiz is not active")]
    QuizInactive,
    #[error("Attempt has already been submitted")]
    AttemptAlreadySubmitted,
    #[error("Attempt time limit has passed")]
    AttemptExpired,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Stable machine-readable code, part of the public error contract.
    pub(crate) fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::DuplicateApplication => "duplicate_application",
            Self::DuplicateAttempt => "duplicate_attempt",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Forbidden => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::OpportunityClosed => "opportunity_closed",
            Self::QuizInactive => "quiz_inactive",
            Self::AttemptAlreadySubmitted => "attempt_already_submitted",
            Self::AttemptExpired => "attempt_expired",
            Self::Database(_) => "internal_error",
        }
    }
}
