//! Collector file ingestion for ghostlens.
//!
//! Reads the follower snapshots and per-channel engagement files the
//! collector writes, turns them into an engine [`Snapshot`](ghostlens_engine::Snapshot),
//! and can generate seeded synthetic engagement in the same shapes.

pub mod convert;
pub mod error;
pub mod loader;
pub mod simulate;
pub mod types;

pub use convert::{record_engagement, ConversionSummary};
pub use error::IngestError;
pub use loader::{load_whitelist, write_json_atomic, DataDir, StagedJson};
pub use simulate::simulate_engagement;
pub use types::{
    Comment, CommentSummary, ContentEngagement, EngagementFiles, FollowerEnvelope, FollowerFile,
    LikeSummary, OnlineActivity, StoryEngagement,
};
