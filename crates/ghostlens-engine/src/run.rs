//! End-to-end run: snapshot in, ranked classifications and reports out.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use ghostlens_core::{
    AccountType, ConfigError, Diagnostics, EngagementEvent, FollowerProfile, ScoringPolicy,
};
use rayon::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::aggregate::{aggregate_all, AggregatedMetrics, ObservationWindow};
use crate::classify::{classify, GhostTier, ReasonCode};
use crate::error::EngineError;
use crate::normalize::{normalize_profiles, normalize_unprofiled, NormalizedProfile};
use crate::report::{categorize, CategoryReport, ClassifiedFollower};
use crate::snapshot::{Snapshot, Whitelist};
use crate::stats::{summarize, FollowerStatistics};
use crate::store::Opportunity;

/// One output row per follower, merging profile, metrics and classification
/// under flat field names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowerRecord {
    /// 1-based position, most ghost-like first.
    pub rank: usize,
    pub username: String,
    pub fullname: Option<String>,
    pub account_type: AccountType,
    pub is_private: bool,
    pub privacy_unknown: bool,
    pub posts_count: u64,
    pub followers_count: u64,
    pub following_count: u64,
    pub profile_known: bool,
    pub detailed_profile_analyzed: bool,
    pub bot_signal: f64,
    pub bot_rules: Vec<&'static str>,
    pub post_events: u64,
    pub story_events: u64,
    pub reel_events: u64,
    pub online_activity_events: u64,
    pub weighted_events: f64,
    pub opportunities: usize,
    pub engagement_rate: f64,
    pub recency_score: f64,
    pub consistency_score: f64,
    pub last_engaged_at: Option<DateTime<Utc>>,
    pub tier: GhostTier,
    pub ghost_score: f64,
    pub reason_codes: Vec<ReasonCode>,
    pub whitelisted: bool,
}

impl FollowerRecord {
    fn new(rank: usize, follower: ClassifiedFollower) -> Self {
        let ClassifiedFollower {
            profile,
            metrics,
            classification,
        } = follower;
        Self {
            rank,
            username: profile.username,
            fullname: profile.fullname,
            account_type: profile.account_type,
            is_private: profile.is_private,
            privacy_unknown: profile.privacy_unknown,
            posts_count: profile.posts_count,
            followers_count: profile.followers_count,
            following_count: profile.following_count,
            profile_known: profile.profile_known,
            detailed_profile_analyzed: profile.detailed_profile_analyzed,
            bot_signal: profile.bot_signal,
            bot_rules: profile.bot_rules,
            post_events: metrics.counts.post,
            story_events: metrics.counts.story,
            reel_events: metrics.counts.reel,
            online_activity_events: metrics.counts.online_activity,
            weighted_events: metrics.weighted_events,
            opportunities: metrics.opportunities,
            engagement_rate: metrics.engagement_rate,
            recency_score: metrics.recency_score,
            consistency_score: metrics.consistency_score,
            last_engaged_at: metrics.last_engaged_at,
            tier: classification.tier,
            ghost_score: classification.ghost_score,
            reason_codes: classification.reason_codes,
            whitelisted: classification.whitelisted,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub window: ObservationWindow,
    /// SHA-256 of the canonical JSON form of every input to the run.
    pub input_digest: String,
    pub followers: Vec<FollowerRecord>,
    pub categories: CategoryReport,
    pub statistics: FollowerStatistics,
    pub diagnostics: Diagnostics,
}

impl RunOutput {
    #[must_use]
    pub fn follower(&self, username: &str) -> Option<&FollowerRecord> {
        self.followers.iter().find(|f| f.username == username)
    }
}

#[derive(Serialize)]
struct DigestInput<'a> {
    profiles: &'a [FollowerProfile],
    events: &'a [EngagementEvent],
    opportunities: Vec<Opportunity>,
    whitelist: &'a Whitelist,
    window_end: DateTime<Utc>,
    policy: &'a ScoringPolicy,
}

/// Score every follower in `snapshot`.
///
/// Per-record problems never fail the run; they are collected in
/// [`RunOutput::diagnostics`].
///
/// # Errors
///
/// Returns [`EngineError::Config`] if `policy` is invalid and
/// [`EngineError::Fingerprint`] if the inputs cannot be serialized for the
/// digest.
pub fn run(snapshot: &Snapshot, policy: &ScoringPolicy) -> Result<RunOutput, EngineError> {
    policy.validate()?;

    let mut diagnostics = snapshot.diagnostics.clone();
    let profiles = normalize_all(snapshot, &mut diagnostics);

    let window_end = if let Some(end) = snapshot.window_end() {
        end
    } else {
        diagnostics.incomplete(
            "snapshot",
            "no timestamps in inputs; observation window anchored at the Unix epoch",
        );
        DateTime::<Utc>::UNIX_EPOCH
    };
    let window = ObservationWindow::ending_at(window_end, policy.window_days).ok_or_else(|| {
        ConfigError::InvalidPolicy(format!(
            "window of {} days before {window_end} is out of range",
            policy.window_days
        ))
    })?;

    let late = snapshot
        .events
        .events()
        .iter()
        .filter(|e| e.occurred_at.is_some_and(|at| at > window.end))
        .count();
    if late > 0 {
        diagnostics.incomplete(
            "snapshot",
            format!("{late} events after the observation end {window_end} ignored"),
        );
    }

    tracing::info!(
        followers = profiles.len(),
        events = snapshot.events.len(),
        window_start = %window.start,
        window_end = %window.end,
        "starting ghost classification run"
    );

    let usernames: Vec<&str> = profiles.iter().map(|p| p.username.as_str()).collect();
    let metrics = aggregate_all(&snapshot.events, &usernames, &window, policy);
    let statistics = summarize(&profiles, policy);

    for entry in snapshot.whitelist.iter() {
        if !profiles.iter().any(|p| p.username.to_lowercase() == entry) {
            diagnostics.incomplete(entry, "whitelisted username not found among followers");
        }
    }

    let mut classified = classify_all(profiles, &metrics, &snapshot.whitelist, policy);
    classified.sort_by(|a, b| {
        b.classification
            .ghost_score
            .total_cmp(&a.classification.ghost_score)
            .then_with(|| a.profile.username.cmp(&b.profile.username))
    });

    let categories = categorize(&classified, policy);
    let input_digest = digest(snapshot, window_end, policy)?;

    let followers: Vec<FollowerRecord> = classified
        .into_iter()
        .enumerate()
        .map(|(i, follower)| FollowerRecord::new(i + 1, follower))
        .collect();

    tracing::info!(
        followers = followers.len(),
        ghosts = followers.iter().filter(|f| f.tier.is_ghost()).count(),
        diagnostics = diagnostics.len(),
        "ghost classification run complete"
    );

    Ok(RunOutput {
        window,
        input_digest,
        followers,
        categories,
        statistics,
        diagnostics,
    })
}

/// Normalize every profile, then add event-only followers.
fn normalize_all(snapshot: &Snapshot, diagnostics: &mut Diagnostics) -> Vec<NormalizedProfile> {
    let mut profiles = normalize_profiles(&snapshot.profiles, diagnostics);
    let mut seen: HashSet<String> = profiles.iter().map(|p| p.username.clone()).collect();

    for username in snapshot.events.followers() {
        if seen.insert(username.to_string()) {
            diagnostics.incomplete(username, "no profile; seen only in engagement data");
            profiles.push(normalize_unprofiled(username));
        }
    }

    profiles
}

fn classify_all(
    profiles: Vec<NormalizedProfile>,
    metrics: &BTreeMap<String, AggregatedMetrics>,
    whitelist: &Whitelist,
    policy: &ScoringPolicy,
) -> Vec<ClassifiedFollower> {
    profiles
        .into_par_iter()
        .map(|profile| {
            let metrics = metrics
                .get(&profile.username)
                .cloned()
                .unwrap_or_else(|| AggregatedMetrics::empty(0));
            let classification = classify(&metrics, &profile, whitelist, policy);
            ClassifiedFollower {
                profile,
                metrics,
                classification,
            }
        })
        .collect()
}

fn digest(
    snapshot: &Snapshot,
    window_end: DateTime<Utc>,
    policy: &ScoringPolicy,
) -> Result<String, EngineError> {
    let input = DigestInput {
        profiles: &snapshot.profiles,
        events: snapshot.events.events(),
        opportunities: snapshot.events.opportunities().collect(),
        whitelist: &snapshot.whitelist,
        window_end,
        policy,
    };
    let bytes = serde_json::to_vec(&input)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}
