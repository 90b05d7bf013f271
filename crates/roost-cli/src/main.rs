mod cmd;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "roost",
    about = "Rate-limited reply scheduling — admit, pace, and record actions against daily and hourly quotas",
    version,
    propagate_version = true
)]
struct Cli {
    /// State directory holding config, quota snapshot, and the attempt ledger
    #[arg(long, global = true, env = "ROOST_DATA_DIR", default_value = ".roost")]
    data_dir: PathBuf,

    /// Config file (default: <data-dir>/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit one reply attempt through admission, pacing, and the actuator
    Post {
        /// Platform identifier of the post to reply to
        target_id: String,

        /// Reply text
        text: String,

        /// Override the configured retry budget for actuator failures
        #[arg(long)]
        retries: Option<u32>,

        /// Use an in-process simulated actuator instead of the sidecar
        #[arg(long)]
        dry_run: bool,
    },

    /// Show quota usage, ledger aggregates, and egress endpoint scores
    Stats,

    /// List the most recent attempt records
    Recent {
        /// Maximum number of records to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Zero the daily and hourly counters (the ledger is untouched)
    ResetQuota,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Post { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Post {
            target_id,
            text,
            retries,
            dry_run,
        } => cmd::post::run(
            &cli.data_dir,
            cli.config.as_deref(),
            &target_id,
            &text,
            retries,
            dry_run,
            cli.json,
        ),
        Commands::Stats => cmd::stats::run(&cli.data_dir, cli.config.as_deref(), cli.json),
        Commands::Recent { limit } => cmd::recent::run(&cli.data_dir, limit, cli.json),
        Commands::ResetQuota => {
            cmd::reset_quota::run(&cli.data_dir, cli.config.as_deref(), cli.json)
        }
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
