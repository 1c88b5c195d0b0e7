use ghostlens_core::ConfigError;
use thiserror::Error;

/// Errors that abort a whole run. Per-record problems never surface here;
/// they are returned as diagnostics.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to fingerprint run inputs: {0}")]
    Fingerprint(#[from] serde_json::Error),
}
