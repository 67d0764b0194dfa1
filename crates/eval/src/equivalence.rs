use crate::value::{Row, Value};

/// Shape and verdict of comparing an expected result set with an actual one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ComparisonResult {
    pub matched: bool,
    pub expected_rows: usize,
    pub expected_fields: usize,
    pub actual_rows: usize,
    pub actual_fields: usize,
}

impl ComparisonResult {
    pub fn rows_equal(&self) -> bool {
        self.expected_rows == self.actual_rows
    }

    pub fn fields_equal(&self) -> bool {
        self.expected_fields == self.actual_fields
    }

    /// Human-readable shape summary kept in diagnostic records.
    pub fn summary(&self) -> String {
        format!(
            "(expected, generated): # of row=({}, {}), # of fields=({}, {})",
            self.expected_rows, self.actual_rows, self.expected_fields, self.actual_fields
        )
    }
}

/// Field count of a result set: the width of its first row, 0 when empty.
pub fn field_count(rows: &[Row]) -> usize {
    rows.first().map_or(0, Vec::len)
}

/// Fields of one row, sorted by canonical key.
pub fn canonical_row(row: &[Value]) -> Vec<String> {
    let mut keys: Vec<String> = row.iter().map(Value::canonical_key).collect();
    keys.sort();
    keys
}

/// Every row canonicalized, then the rows themselves sorted.
pub fn canonical_table(rows: &[Row]) -> Vec<Vec<String>> {
    let mut table: Vec<Vec<String>> = rows.iter().map(|row| canonical_row(row)).collect();
    table.sort();
    table
}

/// Multiset equality of two result sets, ignoring row order and column order.
///
/// Field identity is by value, not by position: `[(1, "a")]` and
/// `[("a", 1)]` are equivalent. Values of different types never match.
pub fn equivalent(rows_a: &[Row], rows_b: &[Row]) -> bool {
    if rows_a.len() != rows_b.len() {
        return false;
    }
    canonical_table(rows_a) == canonical_table(rows_b)
}

pub fn compare(expected: &[Row], actual: &[Row]) -> ComparisonResult {
    ComparisonResult {
        matched: equivalent(expected, actual),
        expected_rows: expected.len(),
        expected_fields: field_count(expected),
        actual_rows: actual.len(),
        actual_fields: field_count(actual),
    }
}
