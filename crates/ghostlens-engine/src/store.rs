//! Append-only engagement event store.
//!
//! Events are kept in insertion order, which is the tie-break for everything
//! downstream. Nothing is ever removed. Per-follower and per-channel indexes
//! hold positions into the event log so lookups never copy events.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use ghostlens_core::{
    parse_timestamp, Channel, Diagnostics, EngagementEvent, EventType, RawEngagementEvent,
    ValidationError,
};
use serde::Serialize;

/// Result of recording a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    /// An identical event was already stored; the store is unchanged.
    Duplicate,
}

/// A piece of content a follower could have engaged with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Opportunity {
    pub channel: Channel,
    pub target_id: String,
    /// Earliest known time the content existed, if any.
    pub published_at: Option<DateTime<Utc>>,
}

type EventKey = (
    String,
    Channel,
    Option<String>,
    EventType,
    Option<DateTime<Utc>>,
);

fn event_key(event: &EngagementEvent) -> EventKey {
    (
        event.follower_username.clone(),
        event.channel,
        event.target_id.clone(),
        event.event_type,
        event.occurred_at,
    )
}

#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Vec<EngagementEvent>,
    seen: HashSet<EventKey>,
    by_follower: HashMap<String, Vec<usize>>,
    by_channel: BTreeMap<Channel, Vec<usize>>,
    /// Followers in the order their first event arrived.
    follower_order: Vec<String>,
    opportunities: BTreeMap<(Channel, String), Option<DateTime<Utc>>>,
}

impl EventStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a raw collector event and append it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for a blank username, an unrecognized
    /// channel or event type, an event type not allowed on its channel, or a
    /// negative or non-finite weight.
    pub fn record(&mut self, raw: RawEngagementEvent) -> Result<RecordOutcome, ValidationError> {
        let event = EngagementEvent::try_from(raw)?;
        self.record_event(event)
    }

    /// Append an already typed event.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the event fails
    /// [`EngagementEvent::validate`].
    pub fn record_event(
        &mut self,
        mut event: EngagementEvent,
    ) -> Result<RecordOutcome, ValidationError> {
        let trimmed = event.follower_username.trim();
        if trimmed.len() != event.follower_username.len() {
            event.follower_username = trimmed.to_string();
        }
        event.target_id = event
            .target_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        event.validate()?;

        if !self.seen.insert(event_key(&event)) {
            return Ok(RecordOutcome::Duplicate);
        }

        if event.channel.is_content() {
            if let Some(target) = event.target_id.as_deref() {
                self.merge_opportunity(event.channel, target, event.occurred_at);
            }
        }

        let index = self.events.len();
        match self.by_follower.get_mut(&event.follower_username) {
            Some(positions) => positions.push(index),
            None => {
                self.follower_order.push(event.follower_username.clone());
                self.by_follower
                    .insert(event.follower_username.clone(), vec![index]);
            }
        }
        self.by_channel.entry(event.channel).or_default().push(index);
        self.events.push(event);
        Ok(RecordOutcome::Recorded)
    }

    /// Record a batch of raw events, turning rejections and duplicates into
    /// diagnostics. Returns the number of events actually stored.
    pub fn record_all<I>(&mut self, raws: I, diagnostics: &mut Diagnostics) -> usize
    where
        I: IntoIterator<Item = RawEngagementEvent>,
    {
        let mut stored = 0;
        for (i, raw) in raws.into_iter().enumerate() {
            let subject = if raw.follower_username.trim().is_empty() {
                format!("event[{i}]")
            } else {
                raw.follower_username.trim().to_string()
            };
            let summary = format!(
                "{}/{} {}",
                raw.channel,
                raw.target_id.as_deref().unwrap_or("-"),
                raw.event_type
            );
            let bad_timestamp = raw
                .occurred_at
                .as_deref()
                .filter(|ts| !ts.trim().is_empty() && parse_timestamp(ts).is_none())
                .map(str::to_string);
            match self.record(raw) {
                Ok(RecordOutcome::Recorded) => {
                    stored += 1;
                    if let Some(ts) = bad_timestamp {
                        let message =
                            format!("{summary}: unparsable timestamp \"{ts}\"; treated as missing");
                        diagnostics.incomplete(subject, message);
                    }
                }
                Ok(RecordOutcome::Duplicate) => diagnostics.duplicate(subject, summary),
                Err(err) => diagnostics.validation(subject, &err),
            }
        }
        stored
    }

    /// Record a piece of content known to exist on a content channel. The
    /// earliest known publication time is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotContentChannel`] for `online_activity`
    /// and [`ValidationError::MissingField`] for a blank `target_id`.
    pub fn register_opportunity(
        &mut self,
        channel: Channel,
        target_id: &str,
        published_at: Option<DateTime<Utc>>,
    ) -> Result<(), ValidationError> {
        if !channel.is_content() {
            return Err(ValidationError::NotContentChannel(channel));
        }
        let target_id = target_id.trim();
        if target_id.is_empty() {
            return Err(ValidationError::MissingField { field: "target_id" });
        }
        self.merge_opportunity(channel, target_id, published_at);
        Ok(())
    }

    fn merge_opportunity(
        &mut self,
        channel: Channel,
        target_id: &str,
        published_at: Option<DateTime<Utc>>,
    ) {
        let slot = self
            .opportunities
            .entry((channel, target_id.to_string()))
            .or_insert(published_at);
        *slot = match (*slot, published_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }

    /// A follower's events in insertion order, optionally limited to one
    /// channel. The iterator is lazy and can be cloned to restart it.
    #[must_use]
    pub fn events_for<'a>(&'a self, username: &str, channel: Option<Channel>) -> EventsFor<'a> {
        let indices = self
            .by_follower
            .get(username)
            .map_or(&[][..], Vec::as_slice);
        EventsFor {
            events: &self.events,
            indices: indices.iter(),
            channel,
        }
    }

    /// Every event on one channel, in insertion order.
    pub fn events_in(
        &self,
        channel: Channel,
    ) -> impl Iterator<Item = &EngagementEvent> + Clone + '_ {
        self.by_channel
            .get(&channel)
            .into_iter()
            .flatten()
            .map(move |&i| &self.events[i])
    }

    /// The full event log in insertion order.
    #[must_use]
    pub fn events(&self) -> &[EngagementEvent] {
        &self.events
    }

    /// Usernames with at least one event, in first-seen order.
    pub fn followers(&self) -> impl Iterator<Item = &str> + '_ {
        self.follower_order.iter().map(String::as_str)
    }

    /// Every known opportunity, ordered by channel then target id.
    pub fn opportunities(&self) -> impl Iterator<Item = Opportunity> + '_ {
        self.opportunities
            .iter()
            .map(|((channel, target_id), published_at)| Opportunity {
                channel: *channel,
                target_id: target_id.clone(),
                published_at: *published_at,
            })
    }

    /// Number of distinct content items that existed within `[start, end]`.
    /// Content with no known publication time always counts.
    #[must_use]
    pub fn opportunities_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> usize {
        self.opportunities
            .values()
            .filter(|published| published.is_none_or(|at| at >= start && at <= end))
            .count()
    }

    /// Latest timestamp anywhere in the store.
    #[must_use]
    pub fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        let events = self.events.iter().filter_map(|e| e.occurred_at);
        let content = self.opportunities.values().filter_map(|at| *at);
        events.chain(content).max()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Lazy iterator over one follower's events. See [`EventStore::events_for`].
#[derive(Debug, Clone)]
pub struct EventsFor<'a> {
    events: &'a [EngagementEvent],
    indices: std::slice::Iter<'a, usize>,
    channel: Option<Channel>,
}

impl<'a> Iterator for EventsFor<'a> {
    type Item = &'a EngagementEvent;

    fn next(&mut self) -> Option<Self::Item> {
        for &i in self.indices.by_ref() {
            let event = &self.events[i];
            if self.channel.is_none_or(|c| c == event.channel) {
                return Some(event);
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
