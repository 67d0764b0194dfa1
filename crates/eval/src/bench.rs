use sqlbench_dispatch::Outcome;

use crate::classifier::Unavailable;
use crate::error::EvalError;
use crate::report::error_tag;

/// Which question list an input belongs to.
///
/// List 1 inputs carry an easier paraphrase of the question; list 2 inputs
/// only have the regular one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListId {
    List1,
    List2,
}

impl ListId {
    pub fn as_u8(self) -> u8 {
        match self {
            Self::List1 => 1,
            Self::List2 => 2,
        }
    }
}

/// One natural-language question with its ground-truth SQL.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BenchInput {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easy_question: Option<String>,
    pub question: String,
    pub sql: String,
}

impl BenchInput {
    pub fn list_id(&self) -> ListId {
        if self.easy_question.is_some() {
            ListId::List1
        } else {
            ListId::List2
        }
    }

    /// The prompt sent to the agent.
    pub fn prompt(&self, easy_mode: bool) -> Result<&str, EvalError> {
        if !easy_mode {
            return Ok(&self.question);
        }
        self.easy_question
            .as_deref()
            .ok_or(EvalError::NoEasyQuestion(self.id))
    }
}

/// Dataset file: `{"input": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BenchDataset {
    pub input: Vec<BenchInput>,
}

/// Where a recorded bench error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorOrigin {
    Transport,
    Validation,
}

/// One agent answer, as written to the bench report.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BenchOutput {
    pub list_id: u8,
    pub input_id: u64,
    #[serde(default)]
    pub question: String,
    pub correct_sql: String,
    pub generated_sql: Option<String>,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_origin: Option<ErrorOrigin>,
}

impl BenchOutput {
    pub fn from_outcome(input: &BenchInput, outcome: Option<&Outcome<String>>, easy_mode: bool) -> Self {
        let question = if easy_mode {
            input.easy_question.clone().unwrap_or_default()
        } else {
            input.question.clone()
        };
        let (generated_sql, error, error_origin) = match outcome {
            Some(Outcome::Success(sql)) => (Some(sql.clone()), None, None),
            Some(Outcome::TransportError { message, .. }) => {
                (None, Some(message.clone()), Some(ErrorOrigin::Transport))
            }
            Some(Outcome::ValidationError { reason }) => {
                (None, Some(reason.clone()), Some(ErrorOrigin::Validation))
            }
            None => (
                None,
                Some("task never ran".to_string()),
                Some(ErrorOrigin::Validation),
            ),
        };
        Self {
            list_id: input.list_id().as_u8(),
            input_id: input.id,
            question,
            correct_sql: input.sql.clone(),
            generated_sql,
            error,
            error_origin,
        }
    }

    /// Why no generated result exists, if there is none.
    ///
    /// Reports written before `error_origin` existed are classified from
    /// the error tag: `ERR3` and `HTTP` are transport failures.
    pub fn unavailable(&self) -> Option<Unavailable> {
        let error = self.error.as_deref()?;
        let transport = match self.error_origin {
            Some(origin) => origin == ErrorOrigin::Transport,
            None => matches!(error_tag(error).as_str(), "ERR3" | "HTTP"),
        };
        Some(if transport {
            Unavailable::Transport
        } else {
            Unavailable::Other
        })
    }
}

/// Report file: `{"output": [...]}`, ordered by input id.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BenchReport {
    pub output: Vec<BenchOutput>,
}

impl BenchReport {
    pub fn new(mut output: Vec<BenchOutput>) -> Self {
        output.sort_by_key(|o| o.input_id);
        Self { output }
    }
}
