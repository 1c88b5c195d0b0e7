//! Scoring policy: every numeric constant the engine uses.
//!
//! Defaults are documented on each field. A policy file may override any
//! subset of them; omitted fields keep their defaults.
//!
//! ```yaml
//! half_life_days: 14
//! window_days: 90
//! weights: { engagement: 0.5, recency: 0.3, consistency: 0.2 }
//! tiers: { definite: 0.85, probable: 0.65, possible: 0.45 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engagement::EventType;
use crate::ConfigError;

/// Allowed drift when checking that score weights sum to one.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Longest accepted observation window, about one hundred years.
pub const MAX_WINDOW_DAYS: u32 = 36_500;

/// Weights of the three ghost-score terms. Must sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoreWeights {
    /// Weight of `1 - engagement_rate`. Default `0.5`.
    pub engagement: f64,
    /// Weight of `1 - recency_score`. Default `0.3`.
    pub recency: f64,
    /// Weight of `1 - consistency_score`. Default `0.2`.
    pub consistency: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            engagement: 0.5,
            recency: 0.3,
            consistency: 0.2,
        }
    }
}

/// Minimum ghost score for each non-active tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TierThresholds {
    /// Default `0.85`.
    pub definite: f64,
    /// Default `0.65`.
    pub probable: f64,
    /// Default `0.45`.
    pub possible: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            definite: 0.85,
            probable: 0.65,
            possible: 0.45,
        }
    }
}

/// Sub-thresholds deciding which reason codes explain a classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReasonThresholds {
    /// Non-zero engagement rates below this get `low_engagement`. Default `0.1`.
    pub low_engagement_below: f64,
    /// Recency scores below this get `stale_recency`. Default `0.25`
    /// (about four weeks at the default half-life).
    pub stale_recency_below: f64,
    /// Consistency scores below this get `low_consistency`. Default `0.3`.
    pub low_consistency_below: f64,
}

impl Default for ReasonThresholds {
    fn default() -> Self {
        Self {
            low_engagement_below: 0.1,
            stale_recency_below: 0.25,
            low_consistency_below: 0.3,
        }
    }
}

/// Multiplier applied to an event's own weight by event type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventTypeWeights {
    /// Default `1.0`.
    pub like: f64,
    /// Default `1.0`.
    pub comment: f64,
    /// Story views are passive. Default `0.5`.
    pub view: f64,
    /// Being online says little about engaging with the account. Default `0.25`.
    pub active_now: f64,
}

impl Default for EventTypeWeights {
    fn default() -> Self {
        Self {
            like: 1.0,
            comment: 1.0,
            view: 0.5,
            active_now: 0.25,
        }
    }
}

impl EventTypeWeights {
    #[must_use]
    pub fn for_type(&self, event_type: EventType) -> f64 {
        match event_type {
            EventType::Like => self.like,
            EventType::Comment => self.comment,
            EventType::View => self.view,
            EventType::ActiveNow => self.active_now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringPolicy {
    /// Recency half-life in days. A follower last seen this many days before
    /// the window end scores `0.5` recency. Default `14`.
    pub half_life_days: f64,
    /// Observation window length in days, ending at the snapshot time.
    /// Events and content older than this are ignored. Default `90`.
    pub window_days: u32,
    pub weights: ScoreWeights,
    pub tiers: TierThresholds,
    pub reasons: ReasonThresholds,
    pub event_type_weights: EventTypeWeights,
    /// Bot signal at or above which a follower is a potential bot and gets
    /// `high_bot_signal`. Default `0.5`.
    pub bot_signal_threshold: f64,
    /// Follower count at or above which an account is high-follower.
    /// Default `10000`.
    pub high_follower_threshold: u64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            half_life_days: 14.0,
            window_days: 90,
            weights: ScoreWeights::default(),
            tiers: TierThresholds::default(),
            reasons: ReasonThresholds::default(),
            event_type_weights: EventTypeWeights::default(),
            bot_signal_threshold: 0.5,
            high_follower_threshold: 10_000,
        }
    }
}

impl ScoringPolicy {
    /// Decay constant `λ = ln 2 / half_life_days`.
    #[must_use]
    pub fn decay_lambda(&self) -> f64 {
        std::f64::consts::LN_2 / self.half_life_days
    }

    /// Check every constant before it can touch a classification.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPolicy`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.half_life_days.is_finite() || self.half_life_days <= 0.0 {
            return Err(invalid(format!(
                "half_life_days must be a positive number, got {}",
                self.half_life_days
            )));
        }
        if self.window_days == 0 || self.window_days > MAX_WINDOW_DAYS {
            return Err(invalid(format!(
                "window_days must be between 1 and {MAX_WINDOW_DAYS}, got {}",
                self.window_days
            )));
        }

        let w = &self.weights;
        for (name, value) in [
            ("weights.engagement", w.engagement),
            ("weights.recency", w.recency),
            ("weights.consistency", w.consistency),
        ] {
            check_unit(name, value)?;
        }
        let sum = w.engagement + w.recency + w.consistency;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(invalid(format!("score weights must sum to 1.0, got {sum}")));
        }

        let t = &self.tiers;
        for (name, value) in [
            ("tiers.definite", t.definite),
            ("tiers.probable", t.probable),
            ("tiers.possible", t.possible),
        ] {
            check_unit(name, value)?;
        }
        if t.definite < t.probable || t.probable < t.possible {
            return Err(invalid(format!(
                "tier thresholds must satisfy definite >= probable >= possible, got {} / {} / {}",
                t.definite, t.probable, t.possible
            )));
        }

        let r = &self.reasons;
        for (name, value) in [
            ("reasons.low_engagement_below", r.low_engagement_below),
            ("reasons.stale_recency_below", r.stale_recency_below),
            ("reasons.low_consistency_below", r.low_consistency_below),
            ("bot_signal_threshold", self.bot_signal_threshold),
        ] {
            check_unit(name, value)?;
        }

        let e = &self.event_type_weights;
        for (name, value) in [
            ("event_type_weights.like", e.like),
            ("event_type_weights.comment", e.comment),
            ("event_type_weights.view", e.view),
            ("event_type_weights.active_now", e.active_now),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        Ok(())
    }
}

fn invalid(reason: String) -> ConfigError {
    ConfigError::InvalidPolicy(reason)
}

fn check_unit(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be within [0, 1], got {value}")))
    }
}

/// Load and validate a scoring policy from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_policy(path: &Path) -> Result<ScoringPolicy, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PolicyFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let policy: ScoringPolicy = serde_yaml::from_str(&content)?;
    policy.validate()?;

    Ok(policy)
}

#[cfg(test)]
#[path = "policy_test.rs"]
mod tests;
