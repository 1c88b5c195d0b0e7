//! Category buckets over classified followers.
//!
//! Each bucket is an independent named predicate. A follower can land in any
//! number of buckets, at most once in each.

use std::collections::{BTreeMap, BTreeSet};

use ghostlens_core::{AccountType, ScoringPolicy};
use serde::Serialize;

use crate::aggregate::AggregatedMetrics;
use crate::classify::{GhostClassification, GhostTier};
use crate::normalize::NormalizedProfile;

/// Everything the engine knows about one follower after a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedFollower {
    pub profile: NormalizedProfile,
    pub metrics: AggregatedMetrics,
    pub classification: GhostClassification,
}

#[derive(Debug, Clone, Copy)]
pub struct BucketRule {
    pub name: &'static str,
    pub matches: fn(&ClassifiedFollower, &ScoringPolicy) -> bool,
}

pub const BUCKET_RULES: &[BucketRule] = &[
    BucketRule {
        name: "potential_bots",
        matches: |f, p| f.profile.bot_signal >= p.bot_signal_threshold,
    },
    BucketRule {
        name: "business_accounts",
        matches: |f, _| f.profile.account_type == AccountType::Business,
    },
    BucketRule {
        name: "creator_accounts",
        matches: |f, _| f.profile.account_type == AccountType::Creator,
    },
    BucketRule {
        name: "private_accounts",
        matches: |f, _| f.profile.is_private,
    },
    BucketRule {
        name: "public_personal_accounts",
        matches: |f, _| f.profile.account_type == AccountType::Personal && !f.profile.is_private,
    },
    BucketRule {
        name: "high_follower_accounts",
        matches: |f, p| f.profile.followers_count >= p.high_follower_threshold,
    },
    BucketRule {
        name: "low_engagement_potential",
        matches: |f, _| {
            matches!(
                f.classification.tier,
                GhostTier::ProbableGhost | GhostTier::DefiniteGhost
            )
        },
    },
    BucketRule {
        name: "mass_following_accounts",
        matches: |f, _| f.profile.is_mass_following(),
    },
    BucketRule {
        name: "possible_ghost",
        matches: |f, _| f.classification.tier == GhostTier::PossibleGhost,
    },
    BucketRule {
        name: "probable_ghost",
        matches: |f, _| f.classification.tier == GhostTier::ProbableGhost,
    },
    BucketRule {
        name: "definite_ghost",
        matches: |f, _| f.classification.tier == GhostTier::DefiniteGhost,
    },
    BucketRule {
        name: "whitelisted",
        matches: |f, _| f.classification.whitelisted,
    },
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryBucket {
    pub count: usize,
    /// Ordered by username.
    pub members: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryReport {
    pub total_followers: usize,
    pub buckets: BTreeMap<&'static str, CategoryBucket>,
}

impl CategoryReport {
    #[must_use]
    pub fn bucket(&self, name: &str) -> Option<&CategoryBucket> {
        self.buckets.get(name)
    }

    /// Whether `username` is a member of bucket `name`.
    #[must_use]
    pub fn has(&self, name: &str, username: &str) -> bool {
        self.bucket(name)
            .is_some_and(|b| b.members.contains(username))
    }
}

/// Sort followers into every bucket in [`BUCKET_RULES`]. Empty input still
/// lists every bucket.
#[must_use]
pub fn categorize(followers: &[ClassifiedFollower], policy: &ScoringPolicy) -> CategoryReport {
    let mut buckets: BTreeMap<&'static str, CategoryBucket> = BUCKET_RULES
        .iter()
        .map(|rule| (rule.name, CategoryBucket::default()))
        .collect();

    for follower in followers {
        for rule in BUCKET_RULES {
            if (rule.matches)(follower, policy) {
                if let Some(bucket) = buckets.get_mut(rule.name) {
                    bucket.members.insert(follower.profile.username.clone());
                }
            }
        }
    }
    for bucket in buckets.values_mut() {
        bucket.count = bucket.members.len();
    }

    tracing::debug!(
        total_followers = followers.len(),
        buckets = buckets.len(),
        "categorized followers"
    );

    CategoryReport {
        total_followers: followers.len(),
        buckets,
    }
}
