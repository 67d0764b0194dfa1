//! Table metadata, LLM-generated descriptions and the validator that keeps
//! hallucinated descriptions out of the output.

use std::collections::{BTreeMap, BTreeSet};

use sqlbench_dispatch::Outcome;

use crate::error::EvalError;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DatabaseMetadata {
    pub name: String,
    pub tables: Vec<TableMetadata>,
}

impl DatabaseMetadata {
    pub fn find_table(&self, name: &str) -> Option<&TableMetadata> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// Profile of one table, as produced by the profiling step.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TableMetadata {
    pub name: String,
    pub columns: Vec<ColumnMetadata>,
    pub row_count: u64,
}

impl TableMetadata {
    pub fn find_column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    pub declared_type: String,
    pub allows_null: bool,
    pub is_pk: bool,
    pub null_count: u64,
    pub non_null_count: u64,
    pub distinct_count: u64,
    pub min_value: Option<i64>,
    pub max_value: Option<i64>,
    pub length: LengthMetadata,
    #[serde(default)]
    pub samples: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LengthMetadata {
    pub min: Option<u64>,
    pub average: Option<f64>,
    pub max: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldDescription {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TableDescription {
    pub columns: Vec<FieldDescription>,
    pub table: String,
}

impl TableDescription {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every column of `table` with an empty description.
    pub fn placeholder(table: &TableMetadata) -> Self {
        Self {
            columns: table
                .column_names()
                .map(|name| FieldDescription {
                    name: name.to_string(),
                    description: String::new(),
                })
                .collect(),
            table: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ModelOutput<T> {
    pub success: bool,
    pub error: Option<String>,
    pub data: T,
}

pub type TableDescriptionOutput = ModelOutput<TableDescription>;

impl TableDescriptionOutput {
    pub fn succeeded(data: TableDescription) -> Self {
        Self {
            success: true,
            error: None,
            data,
        }
    }

    pub fn failed(table: &TableMetadata, reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(reason.into()),
            data: TableDescription::placeholder(table),
        }
    }
}

/// Parse the model's JSON answer into a description.
pub fn parse_description(raw: &str) -> Result<TableDescription, EvalError> {
    Ok(serde_json::from_str(strip_code_fence(raw))?)
}

// Models sometimes wrap JSON in a ```json fence despite being told not to.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map_or(trimmed, str::trim)
}

/// Reject a description that does not name exactly the table's columns.
pub fn check_description(table: &TableMetadata, description: &TableDescription) -> Result<(), String> {
    if description.columns.is_empty() {
        return Err("model described no columns".to_string());
    }
    if description.columns.len() != table.columns.len() {
        return Err(format!(
            "expected {} columns, model described {}",
            table.columns.len(),
            description.columns.len()
        ));
    }

    let expected: BTreeSet<&str> = table.column_names().collect();
    let described: BTreeSet<&str> = description.columns.iter().map(|c| c.name.as_str()).collect();

    let unknown: Vec<&str> = described.difference(&expected).copied().collect();
    if !unknown.is_empty() {
        return Err(format!("unknown columns: {}", unknown.join(", ")));
    }
    let missing: Vec<&str> = expected.difference(&described).copied().collect();
    if !missing.is_empty() {
        return Err(format!("missing columns: {}", missing.join(", ")));
    }
    Ok(())
}

/// Turn the final outcome of a generation task into its recorded output.
///
/// Anything short of a description that names exactly the table's columns
/// yields a failed output with placeholder data.
pub fn validate_description(
    table: &TableMetadata,
    outcome: Option<&Outcome<TableDescription>>,
) -> TableDescriptionOutput {
    match outcome {
        Some(Outcome::Success(description)) => match check_description(table, description) {
            Ok(()) => TableDescriptionOutput::succeeded(description.clone()),
            Err(reason) => TableDescriptionOutput::failed(table, reason),
        },
        Some(Outcome::TransportError { code, message, .. }) => {
            TableDescriptionOutput::failed(table, format!("Api error ({code}): {message}"))
        }
        Some(Outcome::ValidationError { reason }) => TableDescriptionOutput::failed(table, reason.clone()),
        None => TableDescriptionOutput::failed(table, "no generation result"),
    }
}

/// Add a failed placeholder for every table that has no result yet.
pub fn fill_missing_tables(results: &mut BTreeMap<String, TableDescriptionOutput>, tables: &[TableMetadata]) {
    for table in tables {
        results
            .entry(table.name.clone())
            .or_insert_with(|| TableDescriptionOutput::failed(table, "no generation result"));
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ProfileSummary {
    pub succeeded: usize,
    pub failed: usize,
}

pub fn summarize(results: &BTreeMap<String, TableDescriptionOutput>) -> ProfileSummary {
    results.values().fold(ProfileSummary::default(), |mut acc, r| {
        if r.success {
            acc.succeeded += 1;
        } else {
            acc.failed += 1;
        }
        acc
    })
}

/// Prompt asking for one description per column plus a table summary.
pub fn description_prompt(table: &TableMetadata) -> Result<String, EvalError> {
    let metadata = serde_json::to_string(table)?;
    Ok(format!(
        r#"Given the following sql table meta data, give a short description of each column of the table and then a short description of the table.
Answer with ONLY valid json in the output format below. Describe every column listed in the metadata and no other.

**Table meta data**
{metadata}

**Output format**
{{
    "columns": [
        {{ "name": "<column_name>", "description": "<description>" }},
        ...
    ],
    "table": "<description>"
}}"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str) -> ColumnMetadata {
        ColumnMetadata {
            name: name.to_string(),
            declared_type: "INTEGER".to_string(),
            allows_null: false,
            is_pk: name == "AlbumId",
            null_count: 0,
            non_null_count: 347,
            distinct_count: 347,
            min_value: Some(1),
            max_value: Some(347),
            length: LengthMetadata::default(),
            samples: vec![serde_json::json!(1)],
        }
    }

    fn album() -> TableMetadata {
        TableMetadata {
            name: "Album".to_string(),
            columns: vec![column("AlbumId"), column("Title"), column("ArtistId")],
            row_count: 347,
        }
    }

    fn described(names: &[&str]) -> TableDescription {
        TableDescription {
            columns: names
                .iter()
                .map(|n| FieldDescription {
                    name: n.to_string(),
                    description: format!("the {n}"),
                })
                .collect(),
            table: "albums".to_string(),
        }
    }

    #[test]
    fn exact_columns_pass() {
        let out = validate_description(
            &album(),
            Some(&Outcome::Success(described(&["Title", "AlbumId", "ArtistId"]))),
        );
        assert!(out.success);
        assert_eq!(out.data.table, "albums");
    }

    #[test]
    fn hallucinated_column_fails_with_placeholder() {
        let out = validate_description(
            &album(),
            Some(&Outcome::Success(described(&["AlbumId", "Title", "Genre"]))),
        );
        assert!(!out.success);
        assert!(out.error.unwrap().contains("Genre"));
        assert_eq!(out.data, TableDescription::placeholder(&album()));
    }

    #[test]
    fn count_mismatch_fails() {
        let reason = check_description(&album(), &described(&["AlbumId", "Title"])).unwrap_err();
        assert_eq!(reason, "expected 3 columns, model described 2");
    }

    #[test]
    fn duplicate_column_fails() {
        let reason = check_description(&album(), &described(&["AlbumId", "AlbumId", "Title"])).unwrap_err();
        assert!(reason.contains("ArtistId"));
    }

    #[test]
    fn zero_columns_is_a_failure() {
        let out = validate_description(&album(), Some(&Outcome::Success(TableDescription::empty())));
        assert!(!out.success);
        assert_eq!(out.data.columns.len(), 3);
        assert!(out.data.columns.iter().all(|c| c.description.is_empty()));
    }

    #[test]
    fn upstream_failures_become_placeholders() {
        let transport = validate_description(&album(), Some(&Outcome::transport(503, "unavailable", "")));
        assert!(!transport.success);
        assert_eq!(transport.error.as_deref(), Some("Api error (503): unavailable"));

        let invalid = validate_description(&album(), Some(&Outcome::validation("not json")));
        assert_eq!(invalid.error.as_deref(), Some("not json"));

        assert!(!validate_description(&album(), None).success);
    }

    #[test]
    fn fill_missing_keeps_existing_results() {
        let other = TableMetadata {
            name: "Artist".to_string(),
            columns: vec![column("ArtistId")],
            row_count: 275,
        };
        let mut results = BTreeMap::new();
        results.insert(
            "Album".to_string(),
            TableDescriptionOutput::succeeded(described(&["AlbumId", "Title", "ArtistId"])),
        );
        fill_missing_tables(&mut results, &[album(), other]);

        assert!(results["Album"].success);
        assert!(!results["Artist"].success);
        assert_eq!(results["Artist"].data.columns[0].name, "ArtistId");
        assert_eq!(summarize(&results), ProfileSummary { succeeded: 1, failed: 1 });
    }

    #[test]
    fn parses_fenced_json() {
        let raw = "```json\n{\"columns\":[{\"name\":\"AlbumId\",\"description\":\"id\"}],\"table\":\"t\"}\n```";
        let description = parse_description(raw).unwrap();
        assert_eq!(description.columns[0].name, "AlbumId");
        assert!(parse_description("Sure! Here is the json").is_err());
    }

    #[test]
    fn metadata_file_shape() {
        let json = r#"{
            "name": "Genre", "row_count": 25,
            "columns": [{
                "name": "Name", "declared_type": "NVARCHAR(120)", "allows_null": true,
                "is_pk": false, "null_count": 0, "non_null_count": 25, "distinct_count": 25,
                "min_value": null, "max_value": null,
                "length": {"min": 3, "average": 7.4, "max": 18},
                "samples": ["Rock", "Jazz"]
            }]
        }"#;
        let table: TableMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(table.find_column("Name").unwrap().length.max, Some(18));
        assert!(description_prompt(&table).unwrap().contains("NVARCHAR(120)"));
    }
}
