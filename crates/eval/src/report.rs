use std::collections::BTreeMap;

use crate::category::OutcomeCategory;

/// Why one task did not land in `exact_match`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DiagnosticRecord {
    pub task_id: String,
    pub category: OutcomeCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    pub expected: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produced: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_stats: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Aggregate of one evaluation run.
///
/// `counts` always carries every category, zeros included, and sums to
/// `total`. At most `max_details` diagnostic records are kept; the rest are
/// only counted in `details_dropped`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StatsReport {
    pub run_id: String,
    pub total: usize,
    pub counts: BTreeMap<OutcomeCategory, usize>,
    pub details: Vec<DiagnosticRecord>,
    pub details_dropped: usize,
    pub error_tags: BTreeMap<String, usize>,
    #[serde(skip)]
    max_details: usize,
}

impl StatsReport {
    pub fn new(max_details: usize) -> Self {
        Self {
            run_id: ulid::Ulid::new().to_string(),
            total: 0,
            counts: OutcomeCategory::ALL.iter().map(|c| (*c, 0)).collect(),
            details: Vec::new(),
            details_dropped: 0,
            error_tags: BTreeMap::new(),
            max_details,
        }
    }

    /// Count one task. Details for `exact_match` are discarded.
    pub fn record(&mut self, category: OutcomeCategory, detail: Option<DiagnosticRecord>) {
        self.total += 1;
        *self.counts.entry(category).or_insert(0) += 1;

        if category == OutcomeCategory::ExactMatch {
            return;
        }
        if let Some(detail) = detail {
            if self.details.len() < self.max_details {
                self.details.push(detail);
            } else {
                self.details_dropped += 1;
            }
        }
    }

    pub fn record_error_tag(&mut self, message: &str) {
        *self.error_tags.entry(error_tag(message)).or_insert(0) += 1;
    }

    pub fn count(&self, category: OutcomeCategory) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    /// Share of tasks in `category`, 0.0 for an empty run.
    pub fn ratio(&self, category: OutcomeCategory) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(category) as f64 / self.total as f64
    }
}

/// First word of an upstream error message, brackets stripped.
///
/// `"[ERR3] HTTP 500 Error"` → `"ERR3"`.
pub fn error_tag(message: &str) -> String {
    message
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_matches(|c| c == '[' || c == ']')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(id: &str, category: OutcomeCategory) -> DiagnosticRecord {
        DiagnosticRecord {
            task_id: id.to_string(),
            category,
            question: None,
            expected: "SELECT 1".to_string(),
            produced: Some("SELECT 2".to_string()),
            result_stats: None,
            reason: None,
        }
    }

    #[test]
    fn new_report_has_every_category_at_zero() {
        let report = StatsReport::new(10);
        assert_eq!(report.counts.len(), OutcomeCategory::ALL.len());
        assert!(report.counts.values().all(|n| *n == 0));
        assert_eq!(report.run_id.len(), 26);
    }

    #[test]
    fn counts_sum_to_total() {
        let mut report = StatsReport::new(10);
        report.record(OutcomeCategory::ExactMatch, None);
        report.record(OutcomeCategory::NoMatchOther, Some(detail("2", OutcomeCategory::NoMatchOther)));
        report.record(OutcomeCategory::TransportError, None);
        assert_eq!(report.total, 3);
        assert_eq!(report.counts.values().sum::<usize>(), 3);
        assert_eq!(report.count(OutcomeCategory::OtherError), 0);
    }

    #[test]
    fn exact_matches_never_get_details() {
        let mut report = StatsReport::new(10);
        report.record(OutcomeCategory::ExactMatch, Some(detail("1", OutcomeCategory::ExactMatch)));
        assert!(report.details.is_empty());
        assert_eq!(report.details_dropped, 0);
    }

    #[test]
    fn details_are_bounded() {
        let mut report = StatsReport::new(2);
        for i in 0..5 {
            report.record(
                OutcomeCategory::NoMatchOther,
                Some(detail(&i.to_string(), OutcomeCategory::NoMatchOther)),
            );
        }
        assert_eq!(report.details.len(), 2);
        assert_eq!(report.details_dropped, 3);
        assert_eq!(report.details[0].task_id, "0");
    }

    #[test]
    fn ratio_of_empty_run_is_zero() {
        let report = StatsReport::new(0);
        assert_eq!(report.ratio(OutcomeCategory::ExactMatch), 0.0);
    }

    #[test]
    fn error_tags() {
        assert_eq!(error_tag("[ERR3] HTTP 500 Error"), "ERR3");
        assert_eq!(error_tag("[ERR1] The response is not marked"), "ERR1");
        assert_eq!(error_tag("HTTP error"), "HTTP");
        assert_eq!(error_tag(""), "");

        let mut report = StatsReport::new(0);
        report.record_error_tag("[ERR1] a");
        report.record_error_tag("[ERR1] b");
        report.record_error_tag("[ERR2] c");
        assert_eq!(report.error_tags["ERR1"], 2);
        assert_eq!(report.error_tags["ERR2"], 1);
    }

    #[test]
    fn json_lists_zero_categories() {
        let report = StatsReport::new(5);
        let json = serde_json::to_value(&report).unwrap();
        let counts = json["counts"].as_object().unwrap();
        for category in OutcomeCategory::ALL {
            assert_eq!(counts[category.as_str()], 0);
        }
        assert!(json.get("max_details").is_none());
    }
}
