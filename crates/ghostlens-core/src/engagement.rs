use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::timestamp::parse_timestamp;

/// Engagement surface an event was observed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Post,
    Story,
    Reel,
    OnlineActivity,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Post,
        Channel::Story,
        Channel::Reel,
        Channel::OnlineActivity,
    ];

    /// Channels whose targets are content a follower could engage with.
    #[must_use]
    pub fn is_content(self) -> bool {
        !matches!(self, Channel::OnlineActivity)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Post => "post",
            Channel::Story => "story",
            Channel::Reel => "reel",
            Channel::OnlineActivity => "online_activity",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "post" => Ok(Channel::Post),
            "story" => Ok(Channel::Story),
            "reel" => Ok(Channel::Reel),
            "online_activity" => Ok(Channel::OnlineActivity),
            _ => Err(ValidationError::Unrecognized {
                field: "channel",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Like,
    Comment,
    View,
    ActiveNow,
}

impl EventType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Like => "like",
            EventType::Comment => "comment",
            EventType::View => "view",
            EventType::ActiveNow => "active_now",
        }
    }

    /// `active_now` is the only signal online-activity checks produce, and it
    /// never appears on content channels.
    #[must_use]
    pub fn allowed_on(self, channel: Channel) -> bool {
        matches!(self, EventType::ActiveNow) == matches!(channel, Channel::OnlineActivity)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "like" => Ok(EventType::Like),
            "comment" => Ok(EventType::Comment),
            "view" => Ok(EventType::View),
            "active_now" => Ok(EventType::ActiveNow),
            _ => Err(ValidationError::Unrecognized {
                field: "event_type",
                value: s.to_string(),
            }),
        }
    }
}

/// A single observed engagement. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementEvent {
    pub follower_username: String,
    pub channel: Channel,
    pub event_type: EventType,
    /// Post, story, or reel identifier. `None` for online-activity checks.
    pub target_id: Option<String>,
    /// Approximate for some channels; absent when the collector could not
    /// determine it.
    pub occurred_at: Option<DateTime<Utc>>,
    pub weight: Option<f64>,
}

impl EngagementEvent {
    pub const DEFAULT_WEIGHT: f64 = 1.0;

    /// The event's strength, defaulting to `1.0` when unset.
    #[must_use]
    pub fn weight_or_default(&self) -> f64 {
        self.weight.unwrap_or(Self::DEFAULT_WEIGHT)
    }

    /// Check the invariants every stored event must satisfy.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for a blank username, an event type that
    /// does not belong on the channel, or a negative or non-finite weight.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.follower_username.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "follower_username",
            });
        }
        if !self.event_type.allowed_on(self.channel) {
            return Err(ValidationError::ChannelMismatch {
                channel: self.channel,
                event_type: self.event_type,
            });
        }
        if let Some(w) = self.weight {
            if !w.is_finite() || w < 0.0 {
                return Err(ValidationError::InvalidWeight(w));
            }
        }
        Ok(())
    }
}

/// Wire shape of an engagement event before validation. Channel and event
/// type are free-form strings so unrecognized values can be reported rather
/// than failing deserialization of the whole collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEngagementEvent {
    #[serde(default)]
    pub follower_username: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub target_id: Option<String>,
    #[serde(default)]
    pub occurred_at: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
}

impl TryFrom<RawEngagementEvent> for EngagementEvent {
    type Error = ValidationError;

    fn try_from(raw: RawEngagementEvent) -> Result<Self, Self::Error> {
        let follower_username = raw.follower_username.trim().to_string();
        if follower_username.is_empty() {
            return Err(ValidationError::MissingField {
                field: "follower_username",
            });
        }

        let event = EngagementEvent {
            follower_username,
            channel: raw.channel.parse()?,
            event_type: raw.event_type.parse()?,
            target_id: raw
                .target_id
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            occurred_at: raw.occurred_at.as_deref().and_then(parse_timestamp),
            weight: raw.weight,
        };
        event.validate()?;
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(channel: &str, event_type: &str) -> RawEngagementEvent {
        RawEngagementEvent {
            follower_username: "alice".to_string(),
            channel: channel.to_string(),
            event_type: event_type.to_string(),
            target_id: Some("p1".to_string()),
            occurred_at: Some("2024-03-01T12:00:00".to_string()),
            weight: None,
        }
    }

    #[test]
    fn target_id_is_trimmed_and_blank_dropped() {
        let mut padded = raw("post", "like");
        padded.target_id = Some("  p1 ".to_string());
        let event = EngagementEvent::try_from(padded).unwrap();
        assert_eq!(event.target_id.as_deref(), Some("p1"));

        let mut blank = raw("post", "like");
        blank.target_id = Some("   ".to_string());
        assert_eq!(EngagementEvent::try_from(blank).unwrap().target_id, None);
    }

    #[test]
    fn converts_valid_raw_event() {
        let event = EngagementEvent::try_from(raw("post", "like")).unwrap();
        assert_eq!(event.channel, Channel::Post);
        assert_eq!(event.event_type, EventType::Like);
        assert!(event.occurred_at.is_some());
        assert!((event.weight_or_default() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_unrecognized_channel() {
        let err = EngagementEvent::try_from(raw("carrier_pigeon", "like")).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Unrecognized { field: "channel", .. }
        ));
    }

    #[test]
    fn rejects_unrecognized_event_type() {
        let err = EngagementEvent::try_from(raw("post", "share")).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Unrecognized {
                field: "event_type",
                ..
            }
        ));
    }

    #[test]
    fn rejects_blank_username() {
        let mut r = raw("post", "like");
        r.follower_username = "  ".to_string();
        let err = EngagementEvent::try_from(r).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                field: "follower_username"
            }
        );
    }

    #[test]
    fn rejects_active_now_on_content_channel() {
        let err = EngagementEvent::try_from(raw("reel", "active_now")).unwrap_err();
        assert!(matches!(err, ValidationError::ChannelMismatch { .. }));
    }

    #[test]
    fn rejects_like_on_online_activity() {
        let err = EngagementEvent::try_from(raw("online_activity", "like")).unwrap_err();
        assert!(matches!(err, ValidationError::ChannelMismatch { .. }));
    }

    #[test]
    fn rejects_negative_and_nan_weights() {
        let mut r = raw("post", "like");
        r.weight = Some(-1.0);
        assert!(matches!(
            EngagementEvent::try_from(r.clone()).unwrap_err(),
            ValidationError::InvalidWeight(_)
        ));
        r.weight = Some(f64::NAN);
        assert!(matches!(
            EngagementEvent::try_from(r).unwrap_err(),
            ValidationError::InvalidWeight(_)
        ));
    }

    #[test]
    fn blank_target_id_becomes_none() {
        let mut r = raw("story", "view");
        r.target_id = Some(String::new());
        let event = EngagementEvent::try_from(r).unwrap();
        assert!(event.target_id.is_none());
    }

    #[test]
    fn channel_round_trips_through_display() {
        for channel in Channel::ALL {
            assert_eq!(channel.as_str().parse::<Channel>().unwrap(), channel);
        }
    }
}
