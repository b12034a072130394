//! Channel types: templates for a single capability of a thing.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::uid::ChannelTypeUID;

/// Whether a channel carries state or fires trigger events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    #[default]
    State,
    Trigger,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::State => f.write_str("state"),
            Self::Trigger => f.write_str("trigger"),
        }
    }
}

impl FromStr for ChannelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("state") {
            Ok(Self::State)
        } else if s.eq_ignore_ascii_case("trigger") {
            Ok(Self::Trigger)
        } else {
            Err(s.to_string())
        }
    }
}

/// A selectable state value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateOption {
    pub value: String,
    pub label: Option<String>,
}

/// Presentation and restriction hints for a state channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDescription {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub step: Option<f64>,
    pub pattern: Option<String>,
    pub read_only: bool,
    pub options: Vec<StateOption>,
}

/// A possible event of a trigger channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOption {
    pub value: String,
    pub label: Option<String>,
}

/// Events a trigger channel may fire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDescription {
    pub options: Vec<EventOption>,
}

/// Describes a capability: what it carries and how to present it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelType {
    pub uid: ChannelTypeUID,
    pub advanced: bool,
    /// Value type carried by state channels (`Number`, `Switch`, …).
    pub item_type: Option<String>,
    pub kind: ChannelKind,
    pub label: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: BTreeSet<String>,
    pub state: Option<StateDescription>,
    pub event: Option<EventDescription>,
    pub config_description_uri: Option<String>,
}

impl ChannelType {
    /// Builder for a state channel type carrying `item_type`.
    #[must_use]
    pub fn state(uid: ChannelTypeUID, item_type: impl Into<String>, label: impl Into<String>) -> ChannelTypeBuilder {
        ChannelTypeBuilder::new(uid, Some(item_type.into()), ChannelKind::State, label.into())
    }

    /// Builder for a trigger channel type.
    #[must_use]
    pub fn trigger(uid: ChannelTypeUID, label: impl Into<String>) -> ChannelTypeBuilder {
        ChannelTypeBuilder::new(uid, None, ChannelKind::Trigger, label.into())
    }
}

/// Step-by-step builder for [`ChannelType`].
#[derive(Debug)]
pub struct ChannelTypeBuilder {
    channel_type: ChannelType,
}

impl ChannelTypeBuilder {
    fn new(uid: ChannelTypeUID, item_type: Option<String>, kind: ChannelKind, label: String) -> Self {
        Self {
            channel_type: ChannelType {
                uid,
                advanced: false,
                item_type,
                kind,
                label,
                description: None,
                category: None,
                tags: BTreeSet::new(),
                state: None,
                event: None,
                config_description_uri: None,
            },
        }
    }

    #[must_use]
    pub fn advanced(mut self, advanced: bool) -> Self {
        self.channel_type.advanced = advanced;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.channel_type.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.channel_type.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.channel_type.tags.insert(tag.into());
        self
    }

    #[must_use]
    pub fn state_description(mut self, state: StateDescription) -> Self {
        self.channel_type.state = Some(state);
        self
    }

    #[must_use]
    pub fn event_description(mut self, event: EventDescription) -> Self {
        self.channel_type.event = Some(event);
        self
    }

    #[must_use]
    pub fn config_description_uri(mut self, uri: impl Into<String>) -> Self {
        self.channel_type.config_description_uri = Some(uri.into());
        self
    }

    #[must_use]
    pub fn build(self) -> ChannelType {
        self.channel_type
    }
}
