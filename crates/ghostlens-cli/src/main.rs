mod analyze;
mod policy;
mod simulate;
mod stats;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use ghostlens_core::AppConfig;
use ghostlens_ingest::DataDir;
use tracing_subscriber::EnvFilter;

use crate::analyze::AnalyzeArgs;

#[derive(Debug, Parser)]
#[command(name = "ghostlens")]
#[command(about = "Ghost follower analysis command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Score and classify a target account's followers
    Analyze(AnalyzeArgs),
    /// Write simulated engagement files for a target's followers
    Simulate {
        /// Account whose followers receive simulated engagement
        #[arg(long)]
        target: String,
        /// Random seed; the same seed and followers give the same files
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Collector data directory (defaults to `GHOSTLENS_DATA_DIR`)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Print follower profile statistics as JSON
    Stats {
        /// Account whose followers to summarize
        #[arg(long)]
        target: String,
        /// Collector data directory (defaults to `GHOSTLENS_DATA_DIR`)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Print the effective scoring policy as YAML
    Policy {
        /// YAML policy file (defaults to `GHOSTLENS_POLICY_PATH`)
        #[arg(long)]
        policy: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ghostlens_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    if config.worker_threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .build_global()?;
    }
    tracing::debug!(env = %config.env, workers = config.worker_threads, "configuration loaded");

    match cli.command {
        Commands::Analyze(args) => analyze::run_analyze(&config, &args)?,
        Commands::Simulate {
            target,
            seed,
            data_dir,
        } => simulate::run_simulate(&config, &target, seed, data_dir.as_deref())?,
        Commands::Stats { target, data_dir } => {
            stats::run_stats(&config, &target, data_dir.as_deref())?;
        }
        Commands::Policy { policy } => policy::run_policy(&config, policy.as_deref())?,
    }

    Ok(())
}

/// The `--data-dir` flag if given, otherwise the configured data directory.
pub(crate) fn data_dir(config: &AppConfig, flag: Option<&Path>) -> DataDir {
    DataDir::new(flag.unwrap_or(&config.data_dir))
}
