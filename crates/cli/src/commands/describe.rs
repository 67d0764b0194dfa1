use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use sqlbench_dispatch::{Dispatcher, ErrorQueue, RetryCoordinator, RetryPolicy, Task, Throttle, Worker};
use sqlbench_eval::profiling::{
    DatabaseMetadata, ProfileSummary, TableDescription, TableDescriptionOutput, TableMetadata,
    fill_missing_tables, summarize, validate_description,
};

use crate::config::{AppSettings, DescribeSettings};
use crate::gemini::{self, GeminiClient};
use crate::io;

/// Written to `<metadata_folder>/<report_filename>.llm.json`.
#[derive(Debug, Serialize)]
pub struct DescriptionReport {
    pub run_id: String,
    pub database: String,
    pub model: String,
    pub summary: ProfileSummary,
    pub tables: BTreeMap<String, TableDescriptionOutput>,
}

/// Execute the `describe` command: generate and validate a description for
/// every table metadata file in the folder.
pub async fn execute(settings: &AppSettings, dry_run: bool) -> Result<()> {
    let describe = &settings.describe;
    describe.validate().context("Invalid describe settings")?;

    let metadata = load_metadata(&describe.metadata_folder)?;
    let report_path = describe.report_path();
    if dry_run {
        tracing::info!(
            tables = metadata.tables.len(),
            model = %describe.model,
            output = %report_path.display(),
            "dry run, model not called"
        );
        return Ok(());
    }

    let client = GeminiClient::from_env(&describe.api_base_url, &describe.model)?;
    let worker: Arc<dyn Worker<TableMetadata, TableDescription>> = Arc::new(client);
    let report = run(&metadata, &worker, describe, &gemini::retry_policy()).await?;
    io::write_json(&report_path, &report)?;

    println!(
        "Described {} tables: {} succeeded, {} failed",
        report.tables.len(),
        report.summary.succeeded,
        report.summary.failed
    );
    Ok(())
}

/// Read every table metadata file in `folder`.
///
/// # Errors
/// Fails on the first file that does not parse, and on a folder without
/// any metadata file.
pub fn load_metadata(folder: &Path) -> Result<DatabaseMetadata> {
    let mut tables = Vec::new();
    for path in io::metadata_files(folder)? {
        let table: TableMetadata = io::read_json(&path)
            .with_context(|| format!("Invalid table metadata: {}", path.display()))?;
        tables.push(table);
    }
    if tables.is_empty() {
        anyhow::bail!("No table metadata found in {}", folder.display());
    }
    let name = folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(DatabaseMetadata { name, tables })
}

pub async fn run(
    metadata: &DatabaseMetadata,
    worker: &Arc<dyn Worker<TableMetadata, TableDescription>>,
    settings: &DescribeSettings,
    policy: &RetryPolicy,
) -> Result<DescriptionReport> {
    let dispatcher = Dispatcher::new(Throttle::new(settings.max_rpm)?);
    let coordinator = RetryCoordinator::new(dispatcher, settings.retry_limit)?;

    let mut tasks: Vec<Task<TableMetadata, TableDescription>> = metadata
        .tables
        .iter()
        .map(|table| Task::new(table.name.as_str(), table.clone()))
        .collect();
    let errors = ErrorQueue::new();
    let retry = coordinator.run(&mut tasks, worker, &errors, policy).await?;

    let mut tables: BTreeMap<String, TableDescriptionOutput> = tasks
        .iter()
        .map(|task| {
            (
                task.id().to_string(),
                validate_description(task.input(), task.outcome()),
            )
        })
        .collect();
    fill_missing_tables(&mut tables, &metadata.tables);

    let summary = summarize(&tables);
    tracing::info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        retries = retry.retries,
        gave_up = retry.gave_up,
        "descriptions complete"
    );

    Ok(DescriptionReport {
        run_id: ulid::Ulid::new().to_string(),
        database: metadata.name.clone(),
        model: settings.model.clone(),
        summary,
        tables,
    })
}
