use chrono::TimeZone;

use super::*;

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
}

fn like(user: &str, post: &str, day: u32) -> EngagementEvent {
    EngagementEvent {
        follower_username: user.to_string(),
        channel: Channel::Post,
        event_type: EventType::Like,
        target_id: Some(post.to_string()),
        occurred_at: Some(at(day)),
        weight: None,
    }
}

fn raw(user: &str, channel: &str, event_type: &str) -> RawEngagementEvent {
    RawEngagementEvent {
        follower_username: user.to_string(),
        channel: channel.to_string(),
        event_type: event_type.to_string(),
        target_id: None,
        occurred_at: Some("2024-03-01T10:00:00".to_string()),
        weight: None,
    }
}

#[test]
fn records_and_indexes_by_follower() {
    let mut store = EventStore::new();
    store.record_event(like("bob", "p1", 1)).unwrap();
    store.record_event(like("alice", "p1", 2)).unwrap();
    store.record_event(like("bob", "p2", 3)).unwrap();

    let bob: Vec<_> = store
        .events_for("bob", None)
        .map(|e| e.target_id.clone().unwrap())
        .collect();
    assert_eq!(bob, vec!["p1", "p2"]);
    assert_eq!(store.followers().collect::<Vec<_>>(), vec!["bob", "alice"]);
    assert_eq!(store.len(), 3);
}

#[test]
fn duplicate_event_is_idempotent() {
    let mut store = EventStore::new();
    assert_eq!(
        store.record_event(like("bob", "p1", 1)).unwrap(),
        RecordOutcome::Recorded
    );
    assert_eq!(
        store.record_event(like("bob", "p1", 1)).unwrap(),
        RecordOutcome::Duplicate
    );
    assert_eq!(store.len(), 1);
}

#[test]
fn same_target_at_different_times_is_not_duplicate() {
    let mut store = EventStore::new();
    store.record_event(like("bob", "p1", 1)).unwrap();
    assert_eq!(
        store.record_event(like("bob", "p1", 2)).unwrap(),
        RecordOutcome::Recorded
    );
}

#[test]
fn username_is_trimmed_before_dedup() {
    let mut store = EventStore::new();
    store.record_event(like("bob", "p1", 1)).unwrap();
    assert_eq!(
        store.record_event(like("  bob ", "p1", 1)).unwrap(),
        RecordOutcome::Duplicate
    );
}

#[test]
fn target_id_is_trimmed_before_dedup_and_registration() {
    let mut store = EventStore::new();
    store
        .register_opportunity(Channel::Post, "p1", Some(at(1)))
        .unwrap();
    store.record_event(like("bob", "p1", 1)).unwrap();
    assert_eq!(
        store.record_event(like("bob", " p1 ", 1)).unwrap(),
        RecordOutcome::Duplicate
    );
    store.record_event(like("alice", "p1\t", 2)).unwrap();

    assert_eq!(store.opportunities().count(), 1);
    let targets: Vec<_> = store
        .events()
        .iter()
        .map(|e| e.target_id.as_deref().unwrap())
        .collect();
    assert_eq!(targets, ["p1", "p1"]);
}

#[test]
fn record_all_reports_unparsable_timestamps() {
    let mut store = EventStore::new();
    let mut diags = Diagnostics::new();
    let mut garbled = raw("bob", "online_activity", "active_now");
    garbled.occurred_at = Some("yesterday-ish".to_string());
    let mut blank = raw("carol", "online_activity", "active_now");
    blank.occurred_at = Some("  ".to_string());

    let stored = store.record_all(
        vec![garbled, blank, raw("dave", "online_activity", "active_now")],
        &mut diags,
    );

    assert_eq!(stored, 3);
    assert_eq!(diags.count(ghostlens_core::DiagnosticKind::IncompleteData), 1);
    let diag = diags.iter().next().unwrap();
    assert_eq!(diag.subject, "bob");
    assert!(diag.message.contains("yesterday-ish"));
    assert_eq!(store.events()[0].occurred_at, None);
}

#[test]
fn events_for_filters_by_channel_and_restarts_on_clone() {
    let mut store = EventStore::new();
    store.record_event(like("bob", "p1", 1)).unwrap();
    store
        .record(RawEngagementEvent {
            target_id: Some("s1".to_string()),
            ..raw("bob", "story", "view")
        })
        .unwrap();

    let iter = store.events_for("bob", Some(Channel::Story));
    let first_pass = iter.clone().count();
    let second_pass = iter.count();
    assert_eq!(first_pass, 1);
    assert_eq!(second_pass, 1);
    assert_eq!(store.events_for("nobody", None).count(), 0);
}

#[test]
fn events_in_returns_one_channel() {
    let mut store = EventStore::new();
    store.record_event(like("bob", "p1", 1)).unwrap();
    store.record(raw("bob", "online_activity", "active_now")).unwrap();
    assert_eq!(store.events_in(Channel::Post).count(), 1);
    assert_eq!(store.events_in(Channel::OnlineActivity).count(), 1);
    assert_eq!(store.events_in(Channel::Reel).count(), 0);
}

#[test]
fn rejects_invalid_raw_events() {
    let mut store = EventStore::new();
    assert!(store.record(raw("", "post", "like")).is_err());
    assert!(store.record(raw("bob", "post", "active_now")).is_err());
    assert!(store.record(raw("bob", "telegram", "like")).is_err());
    assert!(store.is_empty());
}

#[test]
fn record_all_reports_rejections_and_duplicates() {
    let mut store = EventStore::new();
    let mut diags = Diagnostics::new();
    let stored = store.record_all(
        vec![
            raw("bob", "online_activity", "active_now"),
            raw("bob", "online_activity", "active_now"),
            raw("bob", "post", "active_now"),
        ],
        &mut diags,
    );
    assert_eq!(stored, 1);
    assert_eq!(diags.count(ghostlens_core::DiagnosticKind::DuplicateEvent), 1);
    assert_eq!(diags.count(ghostlens_core::DiagnosticKind::Validation), 1);
}

#[test]
fn events_register_their_targets() {
    let mut store = EventStore::new();
    store.record_event(like("bob", "p1", 5)).unwrap();
    store.record_event(like("alice", "p1", 3)).unwrap();
    let opportunities: Vec<_> = store.opportunities().collect();
    assert_eq!(opportunities.len(), 1);
    assert_eq!(opportunities[0].published_at, Some(at(3)));
}

#[test]
fn register_opportunity_keeps_earliest_time() {
    let mut store = EventStore::new();
    store
        .register_opportunity(Channel::Reel, "r1", Some(at(10)))
        .unwrap();
    store.register_opportunity(Channel::Reel, "r1", None).unwrap();
    store
        .register_opportunity(Channel::Reel, "r1", Some(at(4)))
        .unwrap();
    let only = store.opportunities().next().unwrap();
    assert_eq!(only.published_at, Some(at(4)));
}

#[test]
fn register_opportunity_rejects_online_activity_and_blank_ids() {
    let mut store = EventStore::new();
    assert_eq!(
        store.register_opportunity(Channel::OnlineActivity, "x", None),
        Err(ValidationError::NotContentChannel(Channel::OnlineActivity))
    );
    assert_eq!(
        store.register_opportunity(Channel::Post, "  ", None),
        Err(ValidationError::MissingField { field: "target_id" })
    );
}

#[test]
fn opportunities_between_respects_window() {
    let mut store = EventStore::new();
    store
        .register_opportunity(Channel::Post, "old", Some(at(1)))
        .unwrap();
    store
        .register_opportunity(Channel::Post, "new", Some(at(20)))
        .unwrap();
    store
        .register_opportunity(Channel::Story, "undated", None)
        .unwrap();
    assert_eq!(store.opportunities_between(at(10), at(25)), 2);
    assert_eq!(store.opportunities_between(at(1), at(25)), 3);
}

#[test]
fn latest_timestamp_spans_events_and_content() {
    let mut store = EventStore::new();
    assert!(store.latest_timestamp().is_none());
    store.record_event(like("bob", "p1", 5)).unwrap();
    store
        .register_opportunity(Channel::Post, "p2", Some(at(9)))
        .unwrap();
    assert_eq!(store.latest_timestamp(), Some(at(9)));
}
