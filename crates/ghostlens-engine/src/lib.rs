//! Engagement aggregation and ghost classification engine.
//!
//! Turns a [`Snapshot`] of follower profiles and engagement events into
//! per-follower metrics, a tiered ghost score with reason codes, and named
//! category buckets. Every run is a pure function of the snapshot and the
//! [`ScoringPolicy`](ghostlens_core::ScoringPolicy); identical inputs give
//! byte-identical output.

pub mod aggregate;
pub mod classify;
pub mod error;
pub mod normalize;
pub mod report;
pub mod rules;
pub mod run;
pub mod snapshot;
pub mod stats;
pub mod store;

pub use aggregate::{aggregate, AggregatedMetrics, ChannelCounts, ObservationWindow};
pub use classify::{classify, ghost_score, tier_for, GhostClassification, GhostTier, ReasonCode};
pub use error::EngineError;
pub use normalize::{normalize_profile, normalize_profiles, NormalizedProfile};
pub use report::{categorize, CategoryBucket, CategoryReport, ClassifiedFollower};
pub use run::{run, FollowerRecord, RunOutput};
pub use snapshot::{Snapshot, Whitelist};
pub use stats::{summarize, FollowerStatistics};
pub use store::{EventStore, EventsFor, Opportunity, RecordOutcome};
