mod analysis;
mod bench;
mod category;
mod classifier;
mod equivalence;
mod error;
mod report;
mod sql;
mod value;

pub mod profiling;

pub use analysis::{QueryRunner, SQL_ERROR_TAG, analyze};
pub use bench::{BenchDataset, BenchInput, BenchOutput, BenchReport, ErrorOrigin, ListId};
pub use category::OutcomeCategory;
pub use classifier::{Classification, Unavailable, category_for, classify};
pub use equivalence::{ComparisonResult, canonical_row, canonical_table, compare, equivalent, field_count};
pub use error::EvalError;
pub use report::{DiagnosticRecord, StatsReport, error_tag};
pub use sql::strip_limit_clause;
pub use value::{Row, Value};
