/// Fixed taxonomy every evaluated task lands in exactly once.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeCategory {
    ExactMatch,
    NoMatchRowCountEqual,
    NoMatchFieldCountEqual,
    NoMatchOther,
    TransportError,
    OtherError,
}

impl OutcomeCategory {
    pub const ALL: [Self; 6] = [
        Self::ExactMatch,
        Self::NoMatchRowCountEqual,
        Self::NoMatchFieldCountEqual,
        Self::NoMatchOther,
        Self::TransportError,
        Self::OtherError,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExactMatch => "exact_match",
            Self::NoMatchRowCountEqual => "no_match_row_count_equal",
            Self::NoMatchFieldCountEqual => "no_match_field_count_equal",
            Self::NoMatchOther => "no_match_other",
            Self::TransportError => "transport_error",
            Self::OtherError => "other_error",
        }
    }

    /// Both queries ran but their results differ.
    pub fn is_mismatch(self) -> bool {
        matches!(
            self,
            Self::NoMatchRowCountEqual | Self::NoMatchFieldCountEqual | Self::NoMatchOther
        )
    }

    /// At least one side never produced a result.
    pub fn is_error(self) -> bool {
        matches!(self, Self::TransportError | Self::OtherError)
    }
}

impl std::fmt::Display for OutcomeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_matches_serde() {
        for category in OutcomeCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }

    #[test]
    fn every_category_is_exactly_one_kind() {
        for category in OutcomeCategory::ALL {
            let kinds = [
                category == OutcomeCategory::ExactMatch,
                category.is_mismatch(),
                category.is_error(),
            ];
            assert_eq!(kinds.iter().filter(|k| **k).count(), 1, "{category}");
        }
    }
}
