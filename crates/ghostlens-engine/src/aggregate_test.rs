use chrono::TimeZone;
use ghostlens_core::{EngagementEvent, EventType};

use super::*;

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap()
}

fn event(
    user: &str,
    channel: Channel,
    event_type: EventType,
    target: Option<&str>,
    at: Option<DateTime<Utc>>,
) -> EngagementEvent {
    EngagementEvent {
        follower_username: user.to_string(),
        channel,
        event_type,
        target_id: target.map(str::to_string),
        occurred_at: at,
        weight: None,
    }
}

fn window() -> ObservationWindow {
    ObservationWindow::ending_at(day(30), 90).unwrap()
}

#[test]
fn window_spans_requested_days() {
    let w = ObservationWindow::ending_at(day(30), 10).unwrap();
    assert_eq!(w.start, day(20));
    assert!(w.admits(None));
    assert!(w.admits(Some(day(20))));
    assert!(w.admits(Some(day(30))));
    assert!(!w.admits(Some(day(19))));
    assert!(!w.admits(Some(day(31))));
}

#[test]
fn window_start_out_of_range_is_none() {
    let earliest = DateTime::<Utc>::MIN_UTC;
    assert!(ObservationWindow::ending_at(earliest, 1).is_none());
    assert!(ObservationWindow::ending_at(day(30), u32::MAX).is_none());
}

#[test]
fn events_after_window_end_are_excluded() {
    let mut store = EventStore::new();
    store
        .register_opportunity(Channel::Post, "p1", Some(day(10)))
        .unwrap();
    store
        .record_event(event("bob", Channel::Post, EventType::Like, Some("p1"), Some(day(10))))
        .unwrap();
    store
        .record_event(event("bob", Channel::Post, EventType::Like, Some("p2"), Some(day(25))))
        .unwrap();
    let as_of = ObservationWindow::ending_at(day(20), 90).unwrap();
    let m = aggregate(&store, "bob", &as_of, &ScoringPolicy::default());

    assert_eq!(m.counts.post, 1);
    assert_eq!(m.opportunities, 1);
    assert!((m.engagement_rate - 1.0).abs() < f64::EPSILON);
    assert_eq!(m.last_engaged_at, Some(day(10)));
    assert!(m.recency_score < 1.0);
}

#[test]
fn follower_without_events_gets_zero_metrics() {
    let mut store = EventStore::new();
    store
        .register_opportunity(Channel::Post, "p1", Some(day(1)))
        .unwrap();
    let m = aggregate(&store, "alice", &window(), &ScoringPolicy::default());
    assert_eq!(m, AggregatedMetrics::empty(1));
}

#[test]
fn engagement_rate_uses_distinct_opportunities() {
    let mut store = EventStore::new();
    store
        .record_event(event("bob", Channel::Post, EventType::Like, Some("p1"), Some(day(28))))
        .unwrap();
    store
        .register_opportunity(Channel::Post, "p2", Some(day(27)))
        .unwrap();
    store
        .register_opportunity(Channel::Reel, "r1", Some(day(26)))
        .unwrap();
    store
        .register_opportunity(Channel::Story, "s1", Some(day(25)))
        .unwrap();
    let m = aggregate(&store, "bob", &window(), &ScoringPolicy::default());
    assert_eq!(m.opportunities, 4);
    assert!((m.engagement_rate - 0.25).abs() < 1e-9);
    assert_eq!(m.counts.post, 1);
}

#[test]
fn engagement_rate_is_clamped_to_one() {
    let mut store = EventStore::new();
    for d in 20..30 {
        store
            .record_event(event("bob", Channel::Post, EventType::Like, Some("p1"), Some(day(d))))
            .unwrap();
    }
    let m = aggregate(&store, "bob", &window(), &ScoringPolicy::default());
    assert!((m.engagement_rate - 1.0).abs() < f64::EPSILON);
}

#[test]
fn event_type_multiplier_scales_weight() {
    let mut store = EventStore::new();
    store
        .record_event(event("bob", Channel::Story, EventType::View, Some("s1"), Some(day(29))))
        .unwrap();
    store
        .register_opportunity(Channel::Post, "p1", Some(day(29)))
        .unwrap();
    let m = aggregate(&store, "bob", &window(), &ScoringPolicy::default());
    // One view at 0.5 over two opportunities.
    assert!((m.weighted_events - 0.5).abs() < 1e-9);
    assert!((m.engagement_rate - 0.25).abs() < 1e-9);
}

#[test]
fn recency_halves_every_half_life() {
    let lambda = ScoringPolicy::default().decay_lambda();
    assert!((recency_score(day(30), day(30), lambda) - 1.0).abs() < 1e-12);
    assert!((recency_score(day(16), day(30), lambda) - 0.5).abs() < 1e-9);
    assert!((recency_score(day(2), day(30), lambda) - 0.25).abs() < 1e-9);
}

#[test]
fn recency_in_the_future_clamps_to_one() {
    let lambda = ScoringPolicy::default().decay_lambda();
    assert!((recency_score(day(30), day(10), lambda) - 1.0).abs() < 1e-12);
}

#[test]
fn untimestamped_events_count_toward_engagement_only() {
    let mut store = EventStore::new();
    store
        .record_event(event("bob", Channel::Post, EventType::Comment, Some("p1"), None))
        .unwrap();
    let m = aggregate(&store, "bob", &window(), &ScoringPolicy::default());
    assert!(m.engagement_rate > 0.0);
    assert!(m.recency_score.abs() < f64::EPSILON);
    assert!(m.consistency_score.abs() < f64::EPSILON);
    assert!(m.last_engaged_at.is_none());
}

#[test]
fn events_before_window_are_excluded() {
    let mut store = EventStore::new();
    store
        .record_event(event("bob", Channel::Post, EventType::Like, Some("p1"), Some(day(1))))
        .unwrap();
    let narrow = ObservationWindow::ending_at(day(30), 7).unwrap();
    let m = aggregate(&store, "bob", &narrow, &ScoringPolicy::default());
    assert_eq!(m.counts.total(), 0);
    assert_eq!(m.opportunities, 0);
    assert!(m.engagement_rate.abs() < f64::EPSILON);
}

#[test]
fn consistency_needs_two_events() {
    assert!(consistency_score(&[]).abs() < f64::EPSILON);
    assert!(consistency_score(&[day(1)]).abs() < f64::EPSILON);
}

#[test]
fn evenly_spaced_events_are_perfectly_consistent() {
    let score = consistency_score(&[day(1), day(3), day(5), day(7)]);
    assert!((score - 1.0).abs() < 1e-12);
}

#[test]
fn irregular_gaps_lower_consistency() {
    // Gaps of 1 and 9 days: mean 5, population stddev 4.
    let score = consistency_score(&[day(1), day(2), day(11)]);
    assert!((score - 0.2).abs() < 1e-9);
}

#[test]
fn aggregate_all_is_keyed_by_username() {
    let mut store = EventStore::new();
    store
        .record_event(event("bob", Channel::Post, EventType::Like, Some("p1"), Some(day(29))))
        .unwrap();
    let names = vec!["zed".to_string(), "bob".to_string()];
    let all = aggregate_all(&store, &names, &window(), &ScoringPolicy::default());
    assert_eq!(all.keys().collect::<Vec<_>>(), vec!["bob", "zed"]);
    assert_eq!(all["bob"].counts.post, 1);
    assert_eq!(all["zed"].counts.total(), 0);
}
