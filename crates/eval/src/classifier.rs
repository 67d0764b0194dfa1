use crate::category::OutcomeCategory;
use crate::equivalence::{ComparisonResult, compare};
use crate::value::Row;

/// Why one side of a comparison has no result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {
    /// The upstream call itself failed (unreachable, non-2xx).
    Transport,
    /// Anything else: a query that failed to run, output that failed validation.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: OutcomeCategory,
    /// Present whenever both sides produced rows.
    pub comparison: Option<ComparisonResult>,
}

/// Bucket a comparison whose both sides ran.
pub fn category_for(result: &ComparisonResult) -> OutcomeCategory {
    if result.matched {
        return OutcomeCategory::ExactMatch;
    }
    match (result.rows_equal(), result.fields_equal()) {
        (true, true) => OutcomeCategory::NoMatchOther,
        (true, false) => OutcomeCategory::NoMatchRowCountEqual,
        (false, true) => OutcomeCategory::NoMatchFieldCountEqual,
        (false, false) => OutcomeCategory::NoMatchOther,
    }
}

/// Map an expected/actual pair to exactly one category.
///
/// A transport failure on either side wins over any other unavailability.
pub fn classify(
    expected: Result<&[Row], Unavailable>,
    actual: Result<&[Row], Unavailable>,
) -> Classification {
    match (expected, actual) {
        (Ok(expected), Ok(actual)) => {
            let comparison = compare(expected, actual);
            Classification {
                category: category_for(&comparison),
                comparison: Some(comparison),
            }
        }
        (Err(Unavailable::Transport), _) | (_, Err(Unavailable::Transport)) => Classification {
            category: OutcomeCategory::TransportError,
            comparison: None,
        },
        _ => Classification {
            category: OutcomeCategory::OtherError,
            comparison: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn table(rows: usize, fields: usize, seed: i64) -> Vec<Row> {
        (0..rows)
            .map(|r| {
                (0..fields)
                    .map(|f| Value::Integer(seed + (r * fields + f) as i64))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn identical_tables_match() {
        let t = table(3, 2, 0);
        let c = classify(Ok(t.as_slice()), Ok(t.as_slice()));
        assert_eq!(c.category, OutcomeCategory::ExactMatch);
        assert!(c.comparison.unwrap().matched);
    }

    #[test]
    fn same_shape_different_values_is_other() {
        let a = table(3, 2, 0);
        let b = table(3, 2, 100);
        assert_eq!(classify(Ok(a.as_slice()), Ok(b.as_slice())).category, OutcomeCategory::NoMatchOther);
    }

    #[test]
    fn same_width_different_height() {
        let a = table(3, 2, 0);
        let b = table(5, 2, 0);
        assert_eq!(
            classify(Ok(a.as_slice()), Ok(b.as_slice())).category,
            OutcomeCategory::NoMatchFieldCountEqual
        );
    }

    #[test]
    fn same_height_different_width() {
        let a = table(3, 2, 0);
        let b = table(3, 4, 0);
        assert_eq!(
            classify(Ok(a.as_slice()), Ok(b.as_slice())).category,
            OutcomeCategory::NoMatchRowCountEqual
        );
    }

    #[test]
    fn different_everything_is_other() {
        let a = table(3, 2, 0);
        let b = table(1, 5, 0);
        assert_eq!(classify(Ok(a.as_slice()), Ok(b.as_slice())).category, OutcomeCategory::NoMatchOther);
    }

    #[test]
    fn swapped_columns_still_match() {
        let a = vec![vec![Value::Integer(1), Value::from("a")]];
        let b = vec![vec![Value::from("a"), Value::Integer(1)]];
        assert_eq!(classify(Ok(a.as_slice()), Ok(b.as_slice())).category, OutcomeCategory::ExactMatch);
    }

    #[test]
    fn transport_wins_over_other() {
        let t = table(1, 1, 0);
        let cases = [
            (Err(Unavailable::Transport), Ok(t.as_slice())),
            (Ok(t.as_slice()), Err(Unavailable::Transport)),
            (Err(Unavailable::Other), Err(Unavailable::Transport)),
            (Err(Unavailable::Transport), Err(Unavailable::Other)),
        ];
        for (expected, actual) in cases {
            let c = classify(expected, actual);
            assert_eq!(c.category, OutcomeCategory::TransportError);
            assert!(c.comparison.is_none());
        }
    }

    #[test]
    fn non_transport_unavailability_is_other_error() {
        let t = table(1, 1, 0);
        assert_eq!(
            classify(Err(Unavailable::Other), Ok(t.as_slice())).category,
            OutcomeCategory::OtherError
        );
        assert_eq!(
            classify(Ok(t.as_slice()), Err(Unavailable::Other)).category,
            OutcomeCategory::OtherError
        );
    }

    #[test]
    fn empty_results_match_each_other() {
        let c = classify(Ok(&[][..]), Ok(&[][..]));
        assert_eq!(c.category, OutcomeCategory::ExactMatch);
    }
}
