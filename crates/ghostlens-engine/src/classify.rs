//! Ghost score, tiering and reason codes.

use ghostlens_core::{ScoreWeights, ScoringPolicy, TierThresholds};
use serde::Serialize;

use crate::aggregate::AggregatedMetrics;
use crate::normalize::NormalizedProfile;
use crate::snapshot::Whitelist;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostTier {
    Active,
    PossibleGhost,
    ProbableGhost,
    DefiniteGhost,
}

impl GhostTier {
    pub const ALL: [GhostTier; 4] = [
        GhostTier::Active,
        GhostTier::PossibleGhost,
        GhostTier::ProbableGhost,
        GhostTier::DefiniteGhost,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GhostTier::Active => "active",
            GhostTier::PossibleGhost => "possible_ghost",
            GhostTier::ProbableGhost => "probable_ghost",
            GhostTier::DefiniteGhost => "definite_ghost",
        }
    }

    #[must_use]
    pub fn is_ghost(self) -> bool {
        self != GhostTier::Active
    }
}

impl std::fmt::Display for GhostTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a follower scored the way it did. Variants are declared in the order
/// they appear in a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    Whitelisted,
    ZeroEngagement,
    LowEngagement,
    StaleRecency,
    LowConsistency,
    HighBotSignal,
}

impl ReasonCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReasonCode::Whitelisted => "whitelisted",
            ReasonCode::ZeroEngagement => "zero_engagement",
            ReasonCode::LowEngagement => "low_engagement",
            ReasonCode::StaleRecency => "stale_recency",
            ReasonCode::LowConsistency => "low_consistency",
            ReasonCode::HighBotSignal => "high_bot_signal",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GhostClassification {
    pub tier: GhostTier,
    pub ghost_score: f64,
    pub reason_codes: Vec<ReasonCode>,
    pub whitelisted: bool,
}

/// Weighted shortfall of each metric from 1.0, clamped to `[0, 1]`.
#[must_use]
pub fn ghost_score(metrics: &AggregatedMetrics, weights: &ScoreWeights) -> f64 {
    let score = weights.engagement * (1.0 - metrics.engagement_rate)
        + weights.recency * (1.0 - metrics.recency_score)
        + weights.consistency * (1.0 - metrics.consistency_score);
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        1.0
    }
}

#[must_use]
pub fn tier_for(score: f64, tiers: &TierThresholds) -> GhostTier {
    if score >= tiers.definite {
        GhostTier::DefiniteGhost
    } else if score >= tiers.probable {
        GhostTier::ProbableGhost
    } else if score >= tiers.possible {
        GhostTier::PossibleGhost
    } else {
        GhostTier::Active
    }
}

/// Classify one follower. A whitelisted follower keeps its score and other
/// reasons but is always [`GhostTier::Active`].
#[must_use]
pub fn classify(
    metrics: &AggregatedMetrics,
    profile: &NormalizedProfile,
    whitelist: &Whitelist,
    policy: &ScoringPolicy,
) -> GhostClassification {
    let ghost_score = ghost_score(metrics, &policy.weights);
    let whitelisted = whitelist.contains(&profile.username);
    let reasons = &policy.reasons;

    let mut reason_codes = Vec::new();
    if whitelisted {
        reason_codes.push(ReasonCode::Whitelisted);
    }
    if metrics.engagement_rate <= 0.0 {
        reason_codes.push(ReasonCode::ZeroEngagement);
    } else if metrics.engagement_rate < reasons.low_engagement_below {
        reason_codes.push(ReasonCode::LowEngagement);
    }
    if metrics.recency_score < reasons.stale_recency_below {
        reason_codes.push(ReasonCode::StaleRecency);
    }
    if metrics.consistency_score < reasons.low_consistency_below {
        reason_codes.push(ReasonCode::LowConsistency);
    }
    if profile.bot_signal >= policy.bot_signal_threshold {
        reason_codes.push(ReasonCode::HighBotSignal);
    }

    let tier = if whitelisted {
        GhostTier::Active
    } else {
        tier_for(ghost_score, &policy.tiers)
    };

    GhostClassification {
        tier,
        ghost_score,
        reason_codes,
        whitelisted,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::aggregate::ChannelCounts;
    use crate::normalize::normalize_unprofiled;

    fn metrics(engagement: f64, recency: f64, consistency: f64) -> AggregatedMetrics {
        AggregatedMetrics {
            counts: ChannelCounts {
                post: 3,
                ..ChannelCounts::default()
            },
            weighted_events: 3.0,
            opportunities: 3,
            engagement_rate: engagement,
            recency_score: recency,
            consistency_score: consistency,
            last_engaged_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()),
        }
    }

    #[test]
    fn zero_metrics_score_maximum() {
        let w = ScoreWeights::default();
        assert!((ghost_score(&AggregatedMetrics::empty(0), &w) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn perfect_metrics_score_zero() {
        let w = ScoreWeights::default();
        assert!(ghost_score(&metrics(1.0, 1.0, 1.0), &w).abs() < 1e-12);
    }

    #[test]
    fn ghost_score_weights_each_shortfall() {
        let w = ScoreWeights::default();
        // 0.5 * 0.5 + 0.3 * 1.0 + 0.2 * 0.0
        let score = ghost_score(&metrics(0.5, 0.0, 1.0), &w);
        assert!((score - 0.55).abs() < 1e-12);
    }

    #[test]
    fn tier_boundaries_are_inclusive() {
        let t = TierThresholds::default();
        assert_eq!(tier_for(0.85, &t), GhostTier::DefiniteGhost);
        assert_eq!(tier_for(0.849, &t), GhostTier::ProbableGhost);
        assert_eq!(tier_for(0.65, &t), GhostTier::ProbableGhost);
        assert_eq!(tier_for(0.45, &t), GhostTier::PossibleGhost);
        assert_eq!(tier_for(0.449, &t), GhostTier::Active);
        assert_eq!(tier_for(0.0, &t), GhostTier::Active);
    }

    #[test]
    fn silent_follower_is_definite_ghost_with_ordered_reasons() {
        let profile = normalize_unprofiled("alice");
        let c = classify(
            &AggregatedMetrics::empty(2),
            &profile,
            &Whitelist::new(),
            &ScoringPolicy::default(),
        );
        assert_eq!(c.tier, GhostTier::DefiniteGhost);
        assert_eq!(
            c.reason_codes,
            vec![
                ReasonCode::ZeroEngagement,
                ReasonCode::StaleRecency,
                ReasonCode::LowConsistency
            ]
        );
        assert!(!c.whitelisted);
    }

    #[test]
    fn low_but_nonzero_engagement_is_low_engagement() {
        let profile = normalize_unprofiled("bob");
        let c = classify(
            &metrics(0.05, 1.0, 1.0),
            &profile,
            &Whitelist::new(),
            &ScoringPolicy::default(),
        );
        assert_eq!(c.reason_codes, vec![ReasonCode::LowEngagement]);
    }

    #[test]
    fn whitelist_forces_active_and_leads_reasons() {
        let profile = normalize_unprofiled("alice");
        let whitelist: Whitelist = ["alice"].into_iter().collect();
        let c = classify(
            &AggregatedMetrics::empty(0),
            &profile,
            &whitelist,
            &ScoringPolicy::default(),
        );
        assert_eq!(c.tier, GhostTier::Active);
        assert!(c.whitelisted);
        assert_eq!(c.reason_codes[0], ReasonCode::Whitelisted);
        assert!((c.ghost_score - 1.0).abs() < 1e-12, "score is kept");
    }

    #[test]
    fn bot_signal_adds_reason_last() {
        let profile = normalize_unprofiled("user1234567");
        let c = classify(
            &metrics(1.0, 1.0, 1.0),
            &profile,
            &Whitelist::new(),
            &ScoringPolicy::default(),
        );
        assert_eq!(c.tier, GhostTier::Active);
        assert_eq!(c.reason_codes, vec![ReasonCode::HighBotSignal]);
    }

    #[test]
    fn tier_names_serialize_in_snake_case() {
        assert_eq!(
            serde_json::to_string(&GhostTier::ProbableGhost).unwrap(),
            "\"probable_ghost\""
        );
        assert_eq!(
            serde_json::to_string(&ReasonCode::ZeroEngagement).unwrap(),
            "\"zero_engagement\""
        );
    }
}
