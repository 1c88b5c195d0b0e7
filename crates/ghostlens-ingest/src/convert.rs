//! Conversion from collector engagement files to store events.
//!
//! Every liker, commenter, viewer and active presence check becomes one raw
//! event stamped with its content's timestamp. Each post, story and reel is
//! registered as an opportunity even when nobody engaged with it.

use ghostlens_core::{parse_timestamp, Channel, Diagnostics, RawEngagementEvent};
use ghostlens_engine::EventStore;

use crate::types::{ContentEngagement, EngagementFiles, StoryEngagement};

/// Counts from one conversion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub opportunities: usize,
    pub events_recorded: usize,
    /// Presence checks that found the follower offline. Counted, not stored.
    pub inactive_checks: usize,
}

/// Record every engagement in `files` into `store`.
pub fn record_engagement(
    files: &EngagementFiles,
    store: &mut EventStore,
    diagnostics: &mut Diagnostics,
) -> ConversionSummary {
    let mut summary = ConversionSummary::default();

    for (i, post) in files.posts.iter().enumerate() {
        record_content(Channel::Post, i, post, store, diagnostics, &mut summary);
    }
    for (i, reel) in files.reels.iter().enumerate() {
        record_content(Channel::Reel, i, reel, store, diagnostics, &mut summary);
    }
    for (i, story) in files.stories.iter().enumerate() {
        record_story(i, story, store, diagnostics, &mut summary);
    }

    let mut active = Vec::new();
    for check in &files.online_activity {
        if check.is_active {
            active.push(RawEngagementEvent {
                follower_username: check.username.clone(),
                channel: Channel::OnlineActivity.to_string(),
                event_type: "active_now".to_string(),
                target_id: None,
                occurred_at: check.timestamp.clone(),
                weight: None,
            });
        } else {
            summary.inactive_checks += 1;
        }
    }
    summary.events_recorded += store.record_all(active, diagnostics);

    tracing::info!(
        opportunities = summary.opportunities,
        events = summary.events_recorded,
        inactive_checks = summary.inactive_checks,
        "engagement files converted"
    );
    summary
}

fn record_content(
    channel: Channel,
    index: usize,
    content: &ContentEngagement,
    store: &mut EventStore,
    diagnostics: &mut Diagnostics,
    summary: &mut ConversionSummary,
) {
    let id = content_id(channel, index, content.content_id(), diagnostics);
    let timestamp = register(
        channel,
        &id,
        content.timestamp.as_deref(),
        store,
        diagnostics,
        summary,
    );

    let likes = content
        .likes
        .usernames
        .iter()
        .map(|user| raw_event(user, channel, "like", &id, timestamp));
    let comments = content
        .comments
        .comments
        .iter()
        .map(|c| raw_event(&c.username, channel, "comment", &id, timestamp));
    summary.events_recorded += store.record_all(likes.chain(comments), diagnostics);
}

fn record_story(
    index: usize,
    story: &StoryEngagement,
    store: &mut EventStore,
    diagnostics: &mut Diagnostics,
    summary: &mut ConversionSummary,
) {
    // The collector never assigned story ids; position in the file stands in.
    let id = story
        .story_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map_or_else(|| format!("story_{index}"), str::to_string);
    let timestamp = register(
        Channel::Story,
        &id,
        story.timestamp.as_deref(),
        store,
        diagnostics,
        summary,
    );

    let views = story
        .viewers
        .iter()
        .map(|user| raw_event(user, Channel::Story, "view", &id, timestamp));
    summary.events_recorded += store.record_all(views, diagnostics);
}

fn content_id(
    channel: Channel,
    index: usize,
    id: Option<&str>,
    diagnostics: &mut Diagnostics,
) -> String {
    match id {
        Some(id) => id.to_string(),
        None => {
            let fallback = format!("{channel}_{index}");
            diagnostics.incomplete(fallback.clone(), format!("{channel} has no id"));
            fallback
        }
    }
}

/// Register the content and report a missing or unparsable timestamp. Returns
/// the raw timestamp only when it parses, so events never repeat the
/// diagnostic.
fn register<'a>(
    channel: Channel,
    id: &str,
    timestamp: Option<&'a str>,
    store: &mut EventStore,
    diagnostics: &mut Diagnostics,
    summary: &mut ConversionSummary,
) -> Option<&'a str> {
    let published_at = timestamp.and_then(parse_timestamp);
    match timestamp {
        None => diagnostics.incomplete(id, format!("{channel} has no timestamp")),
        Some(raw) if published_at.is_none() => diagnostics.incomplete(
            id,
            format!("unparsable {channel} timestamp \"{raw}\"; treated as missing"),
        ),
        Some(_) => {}
    }
    match store.register_opportunity(channel, id, published_at) {
        Ok(()) => summary.opportunities += 1,
        Err(err) => diagnostics.validation(id, &err),
    }
    timestamp.filter(|_| published_at.is_some())
}

fn raw_event(
    username: &str,
    channel: Channel,
    event_type: &str,
    target_id: &str,
    occurred_at: Option<&str>,
) -> RawEngagementEvent {
    RawEngagementEvent {
        follower_username: username.to_string(),
        channel: channel.to_string(),
        event_type: event_type.to_string(),
        target_id: Some(target_id.to_string()),
        occurred_at: occurred_at.map(str::to_string),
        weight: None,
    }
}

#[cfg(test)]
#[path = "convert_test.rs"]
mod tests;
