//! Descriptive statistics over a follower snapshot.

use std::collections::BTreeMap;

use ghostlens_core::{AccountType, ScoringPolicy};
use serde::Serialize;

use crate::normalize::NormalizedProfile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PrivacyCounts {
    pub private: usize,
    pub public: usize,
}

/// Account-type and privacy counts and the averages cover only profiles with
/// detailed analysis. Bot, high-follower and mass-following counts cover
/// everyone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowerStatistics {
    pub total_followers: usize,
    pub analyzed_profiles: usize,
    pub account_types: BTreeMap<AccountType, usize>,
    pub privacy_status: PrivacyCounts,
    pub potential_bots: usize,
    pub high_follower_accounts: usize,
    pub mass_following_accounts: usize,
    pub avg_followers: f64,
    pub avg_following: f64,
    pub avg_posts: f64,
}

#[must_use]
pub fn summarize(profiles: &[NormalizedProfile], policy: &ScoringPolicy) -> FollowerStatistics {
    let mut account_types: BTreeMap<AccountType, usize> =
        AccountType::ALL.iter().map(|t| (*t, 0)).collect();
    let mut privacy_status = PrivacyCounts::default();
    let mut analyzed_profiles = 0_usize;
    let (mut followers, mut following, mut posts) = (0_u64, 0_u64, 0_u64);

    for profile in profiles.iter().filter(|p| p.detailed_profile_analyzed) {
        analyzed_profiles += 1;
        *account_types.entry(profile.account_type).or_default() += 1;
        if profile.is_private {
            privacy_status.private += 1;
        } else {
            privacy_status.public += 1;
        }
        followers = followers.saturating_add(profile.followers_count);
        following = following.saturating_add(profile.following_count);
        posts = posts.saturating_add(profile.posts_count);
    }

    let average = |sum: u64| -> f64 {
        if analyzed_profiles == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let avg = sum as f64 / analyzed_profiles as f64;
        avg
    };

    FollowerStatistics {
        total_followers: profiles.len(),
        analyzed_profiles,
        account_types,
        privacy_status,
        potential_bots: profiles
            .iter()
            .filter(|p| p.bot_signal >= policy.bot_signal_threshold)
            .count(),
        high_follower_accounts: profiles
            .iter()
            .filter(|p| p.followers_count >= policy.high_follower_threshold)
            .count(),
        mass_following_accounts: profiles.iter().filter(|p| p.is_mass_following()).count(),
        avg_followers: average(followers),
        avg_following: average(following),
        avg_posts: average(posts),
    }
}
