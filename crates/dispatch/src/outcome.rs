/// Transport code recorded when the backend could not be reached at all.
pub const CODE_UNREACHABLE: i32 = -1;

/// Transport code recorded when a worker panicked instead of returning.
pub const CODE_WORKER_PANICKED: i32 = -2;

/// Terminal result of one task attempt.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Outcome<T> {
    Success(T),
    /// Backend unreachable, non-2xx status, or a malformed response.
    TransportError {
        code: i32,
        message: String,
        detail: String,
    },
    /// The call went through but its output failed a semantic check.
    ValidationError { reason: String },
}

/// The failing half of an [`Outcome`], as carried on the error queue.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TaskError {
    Transport {
        code: i32,
        message: String,
        detail: String,
    },
    Validation {
        reason: String,
    },
}

impl<T> Outcome<T> {
    pub fn transport(code: i32, message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::TransportError {
            code,
            message: message.into(),
            detail: detail.into(),
        }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::ValidationError {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Transport status code, if this attempt failed at the transport level.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::TransportError { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Copy of the failure, or `None` for a success.
    pub fn error(&self) -> Option<TaskError> {
        match self {
            Self::Success(_) => None,
            Self::TransportError {
                code,
                message,
                detail,
            } => Some(TaskError::Transport {
                code: *code,
                message: message.clone(),
                detail: detail.clone(),
            }),
            Self::ValidationError { reason } => Some(TaskError::Validation {
                reason: reason.clone(),
            }),
        }
    }
}

impl<T> From<TaskError> for Outcome<T> {
    fn from(error: TaskError) -> Self {
        match error {
            TaskError::Transport {
                code,
                message,
                detail,
            } => Self::TransportError {
                code,
                message,
                detail,
            },
            TaskError::Validation { reason } => Self::ValidationError { reason },
        }
    }
}

impl TaskError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Transport { code, .. } => Some(*code),
            Self::Validation { .. } => None,
        }
    }
}

impl std::fmt::Display for TaskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport {
                code,
                message,
                detail,
            } if detail.is_empty() => write!(f, "transport error {code}: {message}"),
            Self::Transport {
                code,
                message,
                detail,
            } => write!(f, "transport error {code}: {message} ({detail})"),
            Self::Validation { reason } => write!(f, "validation error: {reason}"),
        }
    }
}
