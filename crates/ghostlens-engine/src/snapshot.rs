//! The immutable input to a run.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use ghostlens_core::{Diagnostics, FollowerProfile};
use serde::Serialize;

use crate::store::EventStore;

/// Usernames exempt from ghost tiers. Matching ignores case and a leading
/// `@`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Whitelist(BTreeSet<String>);

impl Whitelist {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the plain-text format: one username per line, `#` starts a
    /// comment, blank lines are ignored.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        text.lines()
            .map(|line| line.split_once('#').map_or(line, |(before, _)| before))
            .collect()
    }

    /// Returns `false` if the name was blank or already present.
    pub fn insert(&mut self, username: &str) -> bool {
        match canonical(username) {
            Some(name) => self.0.insert(name),
            None => false,
        }
    }

    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        canonical(username).is_some_and(|name| self.0.contains(&name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Whitelist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut whitelist = Whitelist::new();
        for name in iter {
            whitelist.insert(name.as_ref());
        }
        whitelist
    }
}

fn canonical(username: &str) -> Option<String> {
    let name = username.trim();
    let name = name.strip_prefix('@').unwrap_or(name).trim();
    (!name.is_empty()).then(|| name.to_lowercase())
}

/// Profiles, events, whitelist and observation time for one run, plus any
/// diagnostics raised while it was assembled.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub profiles: Vec<FollowerProfile>,
    pub events: EventStore,
    pub whitelist: Whitelist,
    /// End of the observation window. Derived from the inputs when absent.
    pub observed_at: Option<DateTime<Utc>>,
    pub diagnostics: Diagnostics,
}

impl Snapshot {
    #[must_use]
    pub fn new(profiles: Vec<FollowerProfile>, events: EventStore) -> Self {
        Self {
            profiles,
            events,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_whitelist(mut self, whitelist: Whitelist) -> Self {
        self.whitelist = whitelist;
        self
    }

    #[must_use]
    pub fn observed_at(mut self, at: DateTime<Utc>) -> Self {
        self.observed_at = Some(at);
        self
    }

    /// `observed_at`, or the latest timestamp in the events, content or
    /// profile collection times.
    #[must_use]
    pub fn window_end(&self) -> Option<DateTime<Utc>> {
        self.observed_at.or_else(|| {
            let collected = self.profiles.iter().filter_map(|p| p.collected_at).max();
            self.events.latest_timestamp().max(collected)
        })
    }
}
