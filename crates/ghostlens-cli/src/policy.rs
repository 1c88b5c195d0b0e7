//! Scoring policy resolution shared by the command handlers.

use std::path::Path;

use ghostlens_core::{load_policy, AppConfig, ScoringPolicy};

/// Resolve the policy for a command: the `--policy` file, then
/// `GHOSTLENS_POLICY_PATH`, then built-in defaults. `GHOSTLENS_WINDOW_DAYS`
/// overrides the window of whichever policy was chosen.
///
/// # Errors
///
/// Returns an error if the policy file cannot be read or parsed, or if the
/// final policy fails validation.
pub(crate) fn effective_policy(
    config: &AppConfig,
    flag: Option<&Path>,
) -> anyhow::Result<ScoringPolicy> {
    let mut policy = match flag.or(config.policy_path.as_deref()) {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading scoring policy");
            load_policy(path)?
        }
        None => ScoringPolicy::default(),
    };

    if let Some(days) = config.window_days {
        tracing::debug!(window_days = days, "window overridden from environment");
        policy.window_days = days;
    }
    policy.validate()?;

    Ok(policy)
}

/// Print the effective policy as YAML.
///
/// # Errors
///
/// Returns an error if the policy cannot be resolved or serialized.
pub(crate) fn run_policy(config: &AppConfig, flag: Option<&Path>) -> anyhow::Result<()> {
    let policy = effective_policy(config, flag)?;
    print!("{}", serde_yaml::to_string(&policy)?);
    Ok(())
}
