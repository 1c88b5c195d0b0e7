//! `analyze` command: load a target's data, run the engine, write reports.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::Args;
use ghostlens_core::{parse_timestamp, AppConfig, DiagnosticKind};
use ghostlens_engine::{run, FollowerRecord, GhostTier, RunOutput, Whitelist};
use ghostlens_ingest::{load_whitelist, StagedJson};

use crate::policy::effective_policy;

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Account whose followers to analyze
    #[arg(long)]
    pub target: String,
    /// Collector data directory (defaults to `GHOSTLENS_DATA_DIR`)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// YAML scoring policy (defaults to `GHOSTLENS_POLICY_PATH`, then built-in values)
    #[arg(long)]
    pub policy: Option<PathBuf>,
    /// Whitelist file, one username per line (defaults to `GHOSTLENS_WHITELIST_PATH`)
    #[arg(long)]
    pub whitelist: Option<PathBuf>,
    /// Observation time (ISO-8601); defaults to the latest time in the data
    #[arg(long, value_parser = parse_as_of)]
    pub as_of: Option<DateTime<Utc>>,
    /// Directory for report files (defaults to the data directory)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

fn parse_as_of(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(raw).ok_or_else(|| format!("expected an ISO-8601 timestamp, got \"{raw}\""))
}

/// Paths of the two report files for `target` under `dir`.
pub(crate) fn report_paths(dir: &Path, target: &str) -> (PathBuf, PathBuf) {
    (
        dir.join(format!("{target}_ghost_report.json")),
        dir.join(format!("{target}_categories.json")),
    )
}

/// Run a full analysis for one target and write its reports.
///
/// Both reports are fully written and synced to temp files before either is
/// renamed into place, so a failed write leaves the previous pair untouched.
///
/// # Errors
///
/// Returns an error if the policy or whitelist cannot be loaded, a data file
/// exists but is malformed, the policy is invalid, or a report cannot be
/// written.
pub(crate) fn run_analyze(config: &AppConfig, args: &AnalyzeArgs) -> anyhow::Result<()> {
    let policy = effective_policy(config, args.policy.as_deref())?;
    let whitelist = match args.whitelist.as_deref().or(config.whitelist_path.as_deref()) {
        Some(path) => load_whitelist(path)?,
        None => Whitelist::new(),
    };

    let data = crate::data_dir(config, args.data_dir.as_deref());
    let mut snapshot = data.load_snapshot(&args.target, whitelist)?;
    if let Some(at) = args.as_of {
        snapshot = snapshot.observed_at(at);
    }

    let output = run(&snapshot, &policy)?;
    for diagnostic in output
        .diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::Validation)
    {
        tracing::warn!(subject = %diagnostic.subject, "{}", diagnostic.message);
    }

    let out_dir = args.output_dir.as_deref().unwrap_or(data.root());
    let (report_path, categories_path) = report_paths(out_dir, &args.target);
    let report = StagedJson::write(&report_path, &output)?;
    let categories = StagedJson::write(&categories_path, &output.categories)?;
    report.commit()?;
    categories.commit()?;
    tracing::info!(
        report = %report_path.display(),
        categories = %categories_path.display(),
        "reports written"
    );

    print_summary(&args.target, &output);
    println!("report:     {}", report_path.display());
    println!("categories: {}", categories_path.display());
    Ok(())
}

/// Number of followers in each tier, in tier order.
pub(crate) fn tier_counts(followers: &[FollowerRecord]) -> Vec<(GhostTier, usize)> {
    GhostTier::ALL
        .iter()
        .map(|tier| (*tier, followers.iter().filter(|f| f.tier == *tier).count()))
        .collect()
}

fn print_summary(target: &str, output: &RunOutput) {
    println!(
        "{target}: {} followers, window {} to {}",
        output.followers.len(),
        output.window.start.format("%Y-%m-%d"),
        output.window.end.format("%Y-%m-%d"),
    );
    for (tier, count) in tier_counts(&output.followers) {
        println!("  {:<16}{count:>6}", tier.as_str());
    }
    let bots = output
        .categories
        .bucket("potential_bots")
        .map_or(0, |bucket| bucket.count);
    println!("  {:<16}{bots:>6}", "potential_bots");
    if !output.diagnostics.is_empty() {
        println!("  {:<16}{:>6}", "diagnostics", output.diagnostics.len());
    }
}
