//! `stats` command: profile statistics without engagement data.

use std::path::Path;

use ghostlens_core::{AppConfig, Diagnostics};
use ghostlens_engine::{normalize_profiles, summarize};

use crate::policy::effective_policy;

/// Print follower statistics for `target` as pretty JSON.
///
/// # Errors
///
/// Returns an error if the policy is invalid or the follower file is missing
/// or malformed.
pub(crate) fn run_stats(
    config: &AppConfig,
    target: &str,
    data_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let policy = effective_policy(config, None)?;
    let data = crate::data_dir(config, data_dir);
    let followers = data.load_followers(target)?;

    let mut diagnostics = Diagnostics::new();
    let profiles = normalize_profiles(followers.followers(), &mut diagnostics);
    if !diagnostics.is_empty() {
        tracing::info!(
            target_account = target,
            diagnostics = diagnostics.len(),
            "follower data has gaps; defaults applied"
        );
    }

    let statistics = summarize(&profiles, &policy);
    println!("{}", serde_json::to_string_pretty(&statistics)?);
    Ok(())
}
