use crate::error::DispatchError;

/// Per-task state machine for one dispatch run.
///
/// `Failed` is terminal unless a retry coordinator revives the task through
/// `Retrying`. `GaveUp` keeps the last recorded outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Retrying,
    GaveUp,
}

impl TaskState {
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            // Normal flow
            (Self::Pending, Self::Running)
                | (Self::Running, Self::Succeeded)
                | (Self::Running, Self::Failed)
                // Retry loop
                | (Self::Failed, Self::Retrying)
                | (Self::Retrying, Self::Running)
                // Policy still wants a retry but the limit is spent
                | (Self::Failed, Self::GaveUp)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::GaveUp)
    }

    pub fn transition_to(self, next: Self) -> Result<Self, DispatchError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DispatchError::InvalidTransition {
                from: format!("{self:?}"),
                to: format!("{next:?}"),
            })
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Retrying => "retrying",
            Self::GaveUp => "gave_up",
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
