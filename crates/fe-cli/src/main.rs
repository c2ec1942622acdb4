//! forecast-eval CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use fe_core::ModelType;
use std::path::PathBuf;

mod run;

#[derive(Parser)]
#[command(name = "forecast-eval")]
#[command(about = "forecast-eval - Day-wise accuracy evaluation of forecasting models")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every task of a batch configuration and write the cross-task report
    Run {
        /// Batch configuration (YAML, or JSON with a `.json` extension)
        #[arg(short, long)]
        config: PathBuf,

        /// Directory for cross-task artifacts. Overrides `report_dir` from the config.
        #[arg(long)]
        report_dir: Option<PathBuf>,
    },

    /// Evaluate a single model-result file
    Eval {
        /// Model architecture (FCNN, LSTM, GNN)
        #[arg(short, long)]
        model: ModelType,

        /// Model-result source (JSON or Parquet)
        #[arg(short, long)]
        file: PathBuf,

        /// Output directory for the hand-off and report artifacts
        #[arg(short, long)]
        output: PathBuf,

        /// Day to highlight in the visualization hand-off (0-based)
        #[arg(long, default_value = "0")]
        pos: usize,

        /// Grid points per day (defaults to the full 354 x 360 domain)
        #[arg(long)]
        grid_points: Option<usize>,

        /// Maximum forecast horizon in days
        #[arg(long)]
        horizon_days: Option<usize>,
    },

    /// Parse and validate a batch configuration without running it
    Validate {
        /// Batch configuration (YAML, or JSON with a `.json` extension)
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Print version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run { config, report_dir } => run::cmd_run(&config, report_dir.as_deref()),
        Commands::Eval { model, file, output, pos, grid_points, horizon_days } => {
            run::cmd_eval(model, &file, &output, pos, grid_points, horizon_days)
        }
        Commands::Validate { config } => run::cmd_validate(&config),
        Commands::Version => {
            println!("{} {}", fe_core::TOOL_NAME, fe_core::VERSION);
            Ok(())
        }
    }
}
