//! Shared domain types for ghostlens.
//!
//! Holds the collector-facing records ([`FollowerProfile`],
//! [`EngagementEvent`]), the scoring policy, application config, and the
//! diagnostics list every run returns alongside its result.

pub mod app_config;
pub mod config;
pub mod diagnostics;
pub mod engagement;
pub mod error;
pub mod follower;
pub mod policy;
pub mod timestamp;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use engagement::{Channel, EngagementEvent, EventType, RawEngagementEvent};
pub use error::{ConfigError, ValidationError};
pub use follower::{AccountType, FollowerProfile};
pub use policy::{
    load_policy, EventTypeWeights, ReasonThresholds, ScoreWeights, ScoringPolicy, TierThresholds,
    MAX_WINDOW_DAYS,
};
pub use timestamp::parse_timestamp;
