//! Per-follower engagement metrics over an observation window.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use ghostlens_core::{Channel, ScoringPolicy};
use rayon::prelude::*;
use serde::Serialize;

use crate::store::EventStore;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// The time range a run looks at. Timestamped events outside
/// `start..=end` are ignored; undated events always count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ObservationWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ObservationWindow {
    /// Window of `days` days ending at `end`. `None` if the start would fall
    /// outside the representable date range.
    #[must_use]
    pub fn ending_at(end: DateTime<Utc>, days: u32) -> Option<Self> {
        let span = Duration::try_days(i64::from(days))?;
        Some(Self {
            start: end.checked_sub_signed(span)?,
            end,
        })
    }

    #[must_use]
    pub fn admits(&self, occurred_at: Option<DateTime<Utc>>) -> bool {
        occurred_at.is_none_or(|at| at >= self.start && at <= self.end)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChannelCounts {
    pub post: u64,
    pub story: u64,
    pub reel: u64,
    pub online_activity: u64,
}

impl ChannelCounts {
    fn bump(&mut self, channel: Channel) {
        match channel {
            Channel::Post => self.post += 1,
            Channel::Story => self.story += 1,
            Channel::Reel => self.reel += 1,
            Channel::OnlineActivity => self.online_activity += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.post + self.story + self.reel + self.online_activity
    }
}

/// Derived engagement metrics for one follower. All scores are in
/// `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedMetrics {
    pub counts: ChannelCounts,
    /// Sum of event weights times their per-type multipliers.
    pub weighted_events: f64,
    /// Distinct content items known within the window.
    pub opportunities: usize,
    pub engagement_rate: f64,
    pub recency_score: f64,
    pub consistency_score: f64,
    pub last_engaged_at: Option<DateTime<Utc>>,
}

impl AggregatedMetrics {
    /// Metrics for a follower with no events in the window.
    #[must_use]
    pub fn empty(opportunities: usize) -> Self {
        Self {
            counts: ChannelCounts::default(),
            weighted_events: 0.0,
            opportunities,
            engagement_rate: 0.0,
            recency_score: 0.0,
            consistency_score: 0.0,
            last_engaged_at: None,
        }
    }
}

/// Aggregate one follower's events.
#[must_use]
pub fn aggregate(
    store: &EventStore,
    username: &str,
    window: &ObservationWindow,
    policy: &ScoringPolicy,
) -> AggregatedMetrics {
    let opportunities = store.opportunities_between(window.start, window.end);
    aggregate_with(store, username, window, policy, opportunities)
}

/// Aggregate many followers in parallel. The result is keyed by username so
/// its order does not depend on scheduling.
#[must_use]
pub fn aggregate_all<S>(
    store: &EventStore,
    usernames: &[S],
    window: &ObservationWindow,
    policy: &ScoringPolicy,
) -> BTreeMap<String, AggregatedMetrics>
where
    S: AsRef<str> + Sync,
{
    let opportunities = store.opportunities_between(window.start, window.end);
    usernames
        .par_iter()
        .map(|name| {
            let name = name.as_ref();
            (
                name.to_string(),
                aggregate_with(store, name, window, policy, opportunities),
            )
        })
        .collect()
}

fn aggregate_with(
    store: &EventStore,
    username: &str,
    window: &ObservationWindow,
    policy: &ScoringPolicy,
    opportunities: usize,
) -> AggregatedMetrics {
    let mut counts = ChannelCounts::default();
    let mut weighted_events = 0.0_f64;
    let mut stamped = Vec::new();

    for event in store.events_for(username, None) {
        if !window.admits(event.occurred_at) {
            continue;
        }
        counts.bump(event.channel);
        weighted_events +=
            event.weight_or_default() * policy.event_type_weights.for_type(event.event_type);
        if let Some(at) = event.occurred_at {
            stamped.push(at);
        }
    }

    if counts.total() == 0 {
        return AggregatedMetrics::empty(opportunities);
    }

    stamped.sort();
    let last_engaged_at = stamped.last().copied();

    AggregatedMetrics {
        counts,
        weighted_events,
        opportunities,
        engagement_rate: engagement_rate(weighted_events, opportunities),
        recency_score: last_engaged_at.map_or(0.0, |last| {
            recency_score(last, window.end, policy.decay_lambda())
        }),
        consistency_score: consistency_score(&stamped),
        last_engaged_at,
    }
}

/// `weighted / opportunities` clamped to `[0, 1]`; zero with no
/// opportunities.
#[must_use]
pub fn engagement_rate(weighted_events: f64, opportunities: usize) -> f64 {
    if opportunities == 0 || !weighted_events.is_finite() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let rate = weighted_events / opportunities as f64;
    rate.clamp(0.0, 1.0)
}

/// Exponential decay of the age of `last` relative to `end`. Ages in the
/// future clamp to zero.
#[must_use]
pub fn recency_score(last: DateTime<Utc>, end: DateTime<Utc>, lambda: f64) -> f64 {
    let age_days = days_between(last, end).max(0.0);
    let score = (-lambda * age_days).exp();
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// `1 / (1 + σ)` where σ is the population standard deviation of the day
/// gaps between consecutive timestamps. `sorted` must be ascending.
#[must_use]
pub fn consistency_score(sorted: &[DateTime<Utc>]) -> f64 {
    if sorted.len() < 2 {
        return 0.0;
    }
    let gaps: Vec<f64> = sorted
        .windows(2)
        .map(|pair| days_between(pair[0], pair[1]))
        .collect();
    #[allow(clippy::cast_precision_loss)]
    let n = gaps.len() as f64;
    let mean = gaps.iter().sum::<f64>() / n;
    let variance = gaps.iter().map(|g| (g - mean).powi(2)).sum::<f64>() / n;
    (1.0 / (1.0 + variance.sqrt())).clamp(0.0, 1.0)
}

fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let millis = (to - from).num_milliseconds() as f64;
    millis / MILLIS_PER_DAY
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
