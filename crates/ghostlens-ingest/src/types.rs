//! Collector file shapes under the data directory.
//!
//! ### Follower snapshots
//! `{target}_followers.json` is either a bare list of follower records or an
//! envelope with `target_username`, `collection_timestamp`,
//! `total_followers_collected` and `followers`. Dated snapshots live under
//! `followers/{target}_followers_{stamp}.json`.
//!
//! ### Engagement files
//! One list per channel. Posts and reels carry likes and comments; stories
//! carry viewers; online activity is a list of presence checks. Timestamps are
//! written as naive ISO-8601 by the collector and kept as strings here so a
//! file can be rewritten unchanged. They are parsed during conversion.

use ghostlens_core::FollowerProfile;
use serde::{Deserialize, Serialize};

/// Envelope written by the follower collector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FollowerEnvelope {
    #[serde(default)]
    pub target_username: Option<String>,
    #[serde(default)]
    pub collection_timestamp: Option<String>,
    #[serde(default)]
    pub total_followers_collected: Option<u64>,
    #[serde(default)]
    pub followers: Vec<FollowerProfile>,
}

/// Either follower file layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FollowerFile {
    List(Vec<FollowerProfile>),
    Envelope(FollowerEnvelope),
}

impl FollowerFile {
    #[must_use]
    pub fn followers(&self) -> &[FollowerProfile] {
        match self {
            FollowerFile::Envelope(envelope) => &envelope.followers,
            FollowerFile::List(list) => list,
        }
    }

    #[must_use]
    pub fn into_followers(self) -> Vec<FollowerProfile> {
        match self {
            FollowerFile::Envelope(envelope) => envelope.followers,
            FollowerFile::List(list) => list,
        }
    }

    #[must_use]
    pub fn collection_timestamp(&self) -> Option<&str> {
        match self {
            FollowerFile::Envelope(envelope) => envelope.collection_timestamp.as_deref(),
            FollowerFile::List(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LikeSummary {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub usernames: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentSummary {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// One post or reel with its likers and commenters. Posts use `post_id`,
/// reels use `reel_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentEngagement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reel_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub likes: LikeSummary,
    #[serde(default)]
    pub comments: CommentSummary,
    #[serde(default)]
    pub view_count: Option<u64>,
}

impl ContentEngagement {
    /// The post or reel id, whichever the file used.
    #[must_use]
    pub fn content_id(&self) -> Option<&str> {
        self.post_id
            .as_deref()
            .or(self.reel_id.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryEngagement {
    #[serde(default)]
    pub story_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub viewer_count: u64,
    #[serde(default)]
    pub viewers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnlineActivity {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

/// Every engagement file for one target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngagementFiles {
    pub posts: Vec<ContentEngagement>,
    pub stories: Vec<StoryEngagement>,
    pub reels: Vec<ContentEngagement>,
    pub online_activity: Vec<OnlineActivity>,
}
