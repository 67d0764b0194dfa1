use std::sync::LazyLock;

use regex::Regex;

static TRAILING_LIMIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+LIMIT\s+\d+\s*;?\s*$").expect("trailing LIMIT pattern is valid")
});

/// Drop a trailing `LIMIT n` (and its semicolon) from generated SQL.
///
/// Agents tend to cap result sets the reference query does not; only a
/// literal limit at the very end is removed.
pub fn strip_limit_clause(sql: &str) -> String {
    TRAILING_LIMIT.replace(sql, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_limit() {
        assert_eq!(
            strip_limit_clause("SELECT * FROM Album LIMIT 10;"),
            "SELECT * FROM Album"
        );
        assert_eq!(
            strip_limit_clause("select name from Artist\nlimit 5  \n"),
            "select name from Artist"
        );
    }

    #[test]
    fn leaves_inner_limits_alone() {
        let sql = "SELECT * FROM (SELECT * FROM Track LIMIT 3) t ORDER BY Name";
        assert_eq!(strip_limit_clause(sql), sql);
    }

    #[test]
    fn non_literal_limit_kept() {
        let sql = "SELECT * FROM Track LIMIT ?";
        assert_eq!(strip_limit_clause(sql), sql);
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(strip_limit_clause("  SELECT 1  "), "SELECT 1");
    }
}
