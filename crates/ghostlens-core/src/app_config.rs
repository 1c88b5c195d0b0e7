use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Root of the collector's data directory.
    pub data_dir: PathBuf,
    /// YAML scoring policy. Built-in defaults are used when unset.
    pub policy_path: Option<PathBuf>,
    /// Plain-text whitelist, one username per line.
    pub whitelist_path: Option<PathBuf>,
    /// Worker threads for per-follower scoring. `0` lets rayon decide.
    pub worker_threads: usize,
    /// Overrides the policy's `window_days` when set.
    pub window_days: Option<u32>,
}
