use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sqlbench::config::AppSettings;
use sqlbench::{commands, logging};

#[derive(Parser)]
#[command(
    name = "sqlbench",
    version,
    about = "Benchmark an SQL-generating agent and describe database tables with an LLM"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Only log errors
    #[arg(long, global = true)]
    silent: bool,

    /// Path to the settings file
    #[arg(long, default_value = "appsettings.json", global = true)]
    appsettings: PathBuf,

    /// Load inputs and log what would run without calling out
    #[arg(long, global = true)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the agent every dataset question and write a bench report
    Bench,
    /// Run a bench report's queries on SQLite and classify the answers
    Analyze {
        /// Bench report to analyze (overrides analysis.bench_report_path)
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Generate table descriptions from metadata files
    Describe,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level, cli.silent);

    let settings = AppSettings::load(&cli.appsettings)?;

    match cli.command {
        Commands::Bench => commands::bench::execute(&settings, cli.dry_run).await,
        Commands::Analyze { report } => {
            commands::analyze::execute(&settings, report.as_deref(), cli.dry_run)
        }
        Commands::Describe => commands::describe::execute(&settings, cli.dry_run).await,
    }
}
