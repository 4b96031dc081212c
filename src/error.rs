use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotInitialized,
    UnknownActor,
    NotFound,
    AmbiguousRef,
    BudgetExceeded,
    PermissionDenied,
    ValidationError,
    LimitExceeded,
    Conflict,
    ConfigError,
    DatabaseError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::UnknownActor => "UNKNOWN_ACTOR",
            Self::NotFound => "NOT_FOUND",
            Self::AmbiguousRef => "AMBIGUOUS_REF",
            Self::BudgetExceeded => "BUDGET_EXCEEDED",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::LimitExceeded => "LIMIT_EXCEEDED",
            Self::Conflict => "CONFLICT",
            Self::ConfigError => "CONFIG_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
        }
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct SprintdeskError {
    pub code: ErrorCode,
    pub message: String,
}

impl SprintdeskError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_initialized() -> Self {
        Self::new(
            ErrorCode::NotInitialized,
            "sprintdesk is not initialized. Run `sprintdesk init --owner <username>` first.",
        )
    }

    pub fn no_actor() -> Self {
        Self::new(
            ErrorCode::UnknownActor,
            "No acting user. Pass `--as <username>` or set SPRINTDESK_USER.",
        )
    }

    pub fn unknown_actor(username: &str) -> Self {
        Self::new(ErrorCode::UnknownActor, format!("Unknown user: {username}"))
    }

    pub fn not_found(kind: &str, reference: &str) -> Self {
        Self::new(ErrorCode::NotFound, format!("{kind} not found: {reference}"))
    }

    pub fn ambiguous_ref(reference: &str, candidates: &[String]) -> Self {
        Self::new(
            ErrorCode::AmbiguousRef,
            format!(
                "Ambiguous reference '{}'. Candidates: {}",
                reference,
                candidates.join(", ")
            ),
        )
    }

    pub fn budget_exceeded(proposed: &str, remaining: &str) -> Self {
        Self::new(
            ErrorCode::BudgetExceeded,
            format!("Subtask budget ({proposed}) exceeds the task's remaining budget ({remaining})"),
        )
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    pub fn limit_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::LimitExceeded, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }
}

impl From<rusqlite::Error> for SprintdeskError {
    fn from(e: rusqlite::Error) -> Self {
        Self::database(e.to_string())
    }
}

impl From<serde_json::Error> for SprintdeskError {
    fn from(e: serde_json::Error) -> Self {
        Self::config(e.to_string())
    }
}
