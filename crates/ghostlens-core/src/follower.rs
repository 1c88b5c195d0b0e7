use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account classification as shown on a follower's profile page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Personal,
    Business,
    Creator,
    Unknown,
}

impl AccountType {
    pub const ALL: [AccountType; 4] = [
        AccountType::Personal,
        AccountType::Business,
        AccountType::Creator,
        AccountType::Unknown,
    ];

    /// Resolve a raw collector value. Missing, blank, or unrecognized input
    /// resolves to [`AccountType::Unknown`].
    #[must_use]
    pub fn resolve(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("personal") => AccountType::Personal,
            Some("business") => AccountType::Business,
            Some("creator") => AccountType::Creator,
            _ => AccountType::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AccountType::Personal => "personal",
            AccountType::Business => "business",
            AccountType::Creator => "creator",
            AccountType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One follower profile snapshot as written by the collector.
///
/// Every field except `username` is optional because the collector only
/// visits a subset of profiles in detail. `account_type` stays a raw string
/// here; resolution happens at the normalizer boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FollowerProfile {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub fullname: Option<String>,
    #[serde(default)]
    pub bio_preview: Option<String>,
    #[serde(default)]
    pub posts_count: Option<u64>,
    #[serde(default)]
    pub followers_count: Option<u64>,
    #[serde(default)]
    pub following_count: Option<u64>,
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub is_private: Option<bool>,
    #[serde(
        default,
        alias = "profile_analyzed_at",
        deserialize_with = "crate::timestamp::deserialize_lenient"
    )]
    pub collected_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub detailed_profile_analyzed: bool,
}

impl FollowerProfile {
    /// Minimal profile carrying only a username, as produced for followers
    /// that appear in engagement data but not in the profile snapshot.
    #[must_use]
    pub fn username_only(username: &str) -> Self {
        Self {
            username: username.to_string(),
            ..Self::default()
        }
    }
}
