use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlbench_dispatch::{
    Dispatcher, ErrorQueue, RetryCoordinator, RetryPolicy, Task, Throttle, Worker,
};
use sqlbench_eval::{BenchDataset, BenchInput, BenchOutput, BenchReport};

use crate::agent::{self, AgentClient};
use crate::config::{AppSettings, BenchSettings};
use crate::io;

/// Execute the `bench` command: ask the agent every dataset question and
/// write the report.
pub async fn execute(settings: &AppSettings, dry_run: bool) -> Result<()> {
    let bench = &settings.bench;
    bench.validate().context("Invalid bench settings")?;

    let dataset: BenchDataset = io::read_json(&bench.dataset_path)?;
    let run_id = ulid::Ulid::new().to_string();
    let report_path = bench.report_path(&run_id);

    let client = AgentClient::new(
        bench.base_url(),
        bench.use_easy_question,
        Duration::from_secs(bench.request_timeout_secs),
    )?;

    if dry_run {
        tracing::info!(
            inputs = dataset.input.len(),
            url = %client.ask_url(),
            max_rpm = bench.api_max_rpm,
            output = %report_path.display(),
            "dry run, agent not called"
        );
        return Ok(());
    }

    if settings.common.run_test {
        client.probe().await?;
    }

    let worker: Arc<dyn Worker<BenchInput, String>> = Arc::new(client);
    let report = run(&dataset.input, &worker, bench, &agent::retry_policy()).await?;
    io::write_json(&report_path, &report)?;

    let failed = report.output.iter().filter(|o| o.error.is_some()).count();
    println!(
        "Asked {} questions: {} answered, {} failed",
        report.output.len(),
        report.output.len() - failed,
        failed
    );
    println!("Report: {}", report_path.display());
    Ok(())
}

/// Dispatch one task per input and collect the answers, ordered by input id.
pub async fn run(
    inputs: &[BenchInput],
    worker: &Arc<dyn Worker<BenchInput, String>>,
    settings: &BenchSettings,
    policy: &RetryPolicy,
) -> Result<BenchReport> {
    let dispatcher = Dispatcher::new(Throttle::new(settings.api_max_rpm)?);
    let coordinator = RetryCoordinator::new(dispatcher, settings.retry_limit)?;

    let mut tasks: Vec<Task<BenchInput, String>> = inputs
        .iter()
        .map(|input| Task::new(input.id, input.clone()))
        .collect();
    let errors = ErrorQueue::new();
    let summary = coordinator.run(&mut tasks, worker, &errors, policy).await?;

    tracing::info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        gave_up = summary.gave_up,
        retries = summary.retries,
        "bench complete"
    );

    let outputs = tasks
        .iter()
        .map(|task| BenchOutput::from_outcome(task.input(), task.outcome(), settings.use_easy_question))
        .collect();
    Ok(BenchReport::new(outputs))
}
