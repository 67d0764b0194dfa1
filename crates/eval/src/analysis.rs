use crate::bench::BenchOutput;
use crate::classifier::{Unavailable, classify};
use crate::error::EvalError;
use crate::report::{DiagnosticRecord, StatsReport};
use crate::sql::strip_limit_clause;
use crate::value::Row;

/// Error tag recorded when a query fails to run.
pub const SQL_ERROR_TAG: &str = "SQL";

/// Runs SQL against the evaluation database.
pub trait QueryRunner {
    fn run(&self, sql: &str) -> Result<Vec<Row>, EvalError>;
}

/// Run both queries of every bench output and bucket the results.
pub fn analyze<R: QueryRunner + ?Sized>(
    outputs: &[BenchOutput],
    runner: &R,
    max_details: usize,
) -> StatsReport {
    let mut report = StatsReport::new(max_details);
    for output in outputs {
        evaluate(output, runner, &mut report);
    }
    tracing::info!(
        run_id = %report.run_id,
        total = report.total,
        dropped = report.details_dropped,
        "analysis complete"
    );
    report
}

fn evaluate<R: QueryRunner + ?Sized>(output: &BenchOutput, runner: &R, report: &mut StatsReport) {
    let mut detail = DiagnosticRecord {
        task_id: output.input_id.to_string(),
        category: crate::OutcomeCategory::OtherError,
        question: (!output.question.is_empty()).then(|| output.question.clone()),
        expected: output.correct_sql.clone(),
        produced: output.generated_sql.clone(),
        result_stats: None,
        reason: None,
    };

    // One tag per task; an upstream error tag wins over a query failure.
    let mut tag: Option<&str> = None;

    let expected = runner.run(&output.correct_sql);
    if let Err(e) = &expected {
        tracing::warn!(input = output.input_id, error = %e, "reference query failed");
        detail.reason = Some(format!("reference query failed: {e}"));
        tag = Some(SQL_ERROR_TAG);
    }

    let actual: Result<Vec<Row>, Unavailable> = match (output.unavailable(), &output.generated_sql) {
        (Some(origin), _) => {
            if let Some(error) = &output.error {
                tag = Some(error.as_str());
                detail.reason.get_or_insert_with(|| error.clone());
            }
            Err(origin)
        }
        (None, None) => {
            detail.reason.get_or_insert_with(|| "no generated sql".to_string());
            Err(Unavailable::Other)
        }
        (None, Some(sql)) => runner.run(&strip_limit_clause(sql)).map_err(|e| {
            tracing::debug!(input = output.input_id, error = %e, "generated query failed");
            tag.get_or_insert(SQL_ERROR_TAG);
            detail
                .reason
                .get_or_insert_with(|| format!("generated query failed: {e}"));
            Unavailable::Other
        }),
    };

    if let Some(tag) = tag {
        report.record_error_tag(tag);
    }

    let classification = classify(
        expected.as_deref().map_err(|_| Unavailable::Other),
        actual.as_deref().map_err(|origin| *origin),
    );
    detail.category = classification.category;
    detail.result_stats = classification.comparison.map(|c| c.summary());
    report.record(classification.category, Some(detail));
}
