use std::path::Path;

use anyhow::{Context, Result};
use sqlbench_eval::{BenchReport, OutcomeCategory, QueryRunner, StatsReport, analyze};

use crate::config::{AnalysisSettings, AppSettings};
use crate::io;
use crate::sqlite::SqliteRunner;

/// Execute the `analyze` command: replay a bench report against SQLite and
/// bucket every answer.
pub fn execute(settings: &AppSettings, report_override: Option<&Path>, dry_run: bool) -> Result<()> {
    let mut analysis = settings.analysis.clone();
    if let Some(path) = report_override {
        analysis.bench_report_path = path.to_path_buf();
    }
    analysis.validate().context("Invalid analysis settings")?;

    let report: BenchReport = io::read_json(&analysis.bench_report_path)?;
    if dry_run {
        tracing::info!(
            outputs = report.output.len(),
            database = %analysis.sqlite_db_path.display(),
            "dry run, queries not executed"
        );
        return Ok(());
    }

    let runner = SqliteRunner::open(&analysis.sqlite_db_path)?;
    let stats = run(&report, &runner, &analysis)?;
    print_stats(&stats);
    Ok(())
}

/// Classify `report` and, if configured, write `<report>.stats.json`.
pub fn run<R: QueryRunner>(report: &BenchReport, runner: &R, settings: &AnalysisSettings) -> Result<StatsReport> {
    let stats = analyze(&report.output, runner, settings.max_details);
    if settings.save_stats_file {
        io::write_json(&io::stats_path(&settings.bench_report_path), &stats)?;
    }
    Ok(stats)
}

fn print_stats(stats: &StatsReport) {
    println!("Run {}: {} answers", stats.run_id, stats.total);
    for category in OutcomeCategory::ALL {
        println!(
            "{:28} {:>5} ({:.1}%)",
            format!("{category}:"),
            stats.count(category),
            stats.ratio(category) * 100.0
        );
    }
    if !stats.error_tags.is_empty() {
        println!("\nError tags:");
        for (tag, count) in &stats.error_tags {
            println!("{:28} {:>5}", format!("{tag}:"), count);
        }
    }
    if stats.details_dropped > 0 {
        println!("\n{} details not kept", stats.details_dropped);
    }
}
