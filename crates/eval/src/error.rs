/// Errors for evaluation inputs and model output parsing.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("query failed: {0}")]
    Query(String),

    #[error("input {0} has no easy question")]
    NoEasyQuestion(u64),

    #[error("model output is not a valid table description: {0}")]
    InvalidModelOutput(#[from] serde_json::Error),
}
