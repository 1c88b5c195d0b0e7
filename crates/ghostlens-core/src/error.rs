use thiserror::Error;

use crate::engagement::{Channel, EventType};

/// Fatal configuration problems. Any of these aborts a run before output is
/// produced.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read policy file {path}: {source}")]
    PolicyFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse policy file: {0}")]
    PolicyFileParse(#[from] serde_yaml::Error),

    #[error("invalid scoring policy: {0}")]
    InvalidPolicy(String),
}

/// A single malformed record. Rejects that record only; the run continues.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("unrecognized {field} \"{value}\"")]
    Unrecognized { field: &'static str, value: String },

    #[error("event type {event_type} is not valid on channel {channel}")]
    ChannelMismatch {
        channel: Channel,
        event_type: EventType,
    },

    #[error("invalid weight {0}: must be finite and non-negative")]
    InvalidWeight(f64),

    #[error("duplicate username \"{0}\" in profile snapshot")]
    DuplicateUsername(String),

    #[error("channel {0} has no content to engage with")]
    NotContentChannel(Channel),
}
