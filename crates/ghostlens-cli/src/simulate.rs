//! `simulate` command: synthetic engagement for a target's real follower list.

use std::collections::HashSet;
use std::path::Path;

use chrono::Utc;
use ghostlens_core::{AppConfig, FollowerProfile};
use ghostlens_ingest::simulate_engagement;

/// Trimmed, non-blank, distinct usernames in file order.
pub(crate) fn follower_usernames(profiles: &[FollowerProfile]) -> Vec<String> {
    let mut seen = HashSet::new();
    profiles
        .iter()
        .map(|p| p.username.trim())
        .filter(|u| !u.is_empty() && seen.insert(*u))
        .map(str::to_string)
        .collect()
}

/// Generate and write engagement files for `target`'s followers.
///
/// Existing engagement files for the target are replaced.
///
/// # Errors
///
/// Returns an error if the follower file is missing, malformed, or names no
/// usable follower, or if an engagement file cannot be written.
pub(crate) fn run_simulate(
    config: &AppConfig,
    target: &str,
    seed: u64,
    data_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let data = crate::data_dir(config, data_dir);
    let followers = data.load_followers(target)?;
    let usernames = follower_usernames(followers.followers());
    if usernames.is_empty() {
        anyhow::bail!(
            "follower data for {target} in {} has no usernames",
            data.root().display()
        );
    }

    let files = simulate_engagement(&usernames, seed, Utc::now());
    let written = data.write_engagement(target, &files)?;

    println!(
        "simulated engagement for {} followers of {target} (seed {seed})",
        usernames.len()
    );
    for path in written {
        println!("  {}", path.display());
    }
    Ok(())
}
