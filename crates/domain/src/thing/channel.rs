//! Channel instances owned by a thing.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::config::Configuration;
use crate::types::ChannelKind;
use crate::uid::{ChannelTypeUID, ChannelUID};

/// An addressable capability of a concrete thing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    uid: ChannelUID,
    item_type: Option<String>,
    kind: ChannelKind,
    channel_type_uid: Option<ChannelTypeUID>,
    configuration: Configuration,
    properties: BTreeMap<String, String>,
    label: Option<String>,
    description: Option<String>,
    default_tags: BTreeSet<String>,
}

impl Channel {
    #[must_use]
    pub fn builder(uid: ChannelUID, item_type: Option<String>) -> ChannelBuilder {
        ChannelBuilder {
            channel: Self {
                uid,
                item_type,
                kind: ChannelKind::State,
                channel_type_uid: None,
                configuration: Configuration::new(),
                properties: BTreeMap::new(),
                label: None,
                description: None,
                default_tags: BTreeSet::new(),
            },
        }
    }

    #[must_use]
    pub fn uid(&self) -> &ChannelUID {
        &self.uid
    }

    #[must_use]
    pub fn item_type(&self) -> Option<&str> {
        self.item_type.as_deref()
    }

    #[must_use]
    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    #[must_use]
    pub fn channel_type_uid(&self) -> Option<&ChannelTypeUID> {
        self.channel_type_uid.as_ref()
    }

    #[must_use]
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    #[must_use]
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn default_tags(&self) -> &BTreeSet<String> {
        &self.default_tags
    }
}

/// Step-by-step builder for [`Channel`].
#[derive(Debug)]
pub struct ChannelBuilder {
    channel: Channel,
}

impl ChannelBuilder {
    #[must_use]
    pub fn kind(mut self, kind: ChannelKind) -> Self {
        self.channel.kind = kind;
        self
    }

    #[must_use]
    pub fn channel_type_uid(mut self, uid: ChannelTypeUID) -> Self {
        self.channel.channel_type_uid = Some(uid);
        self
    }

    #[must_use]
    pub fn configuration(mut self, configuration: Configuration) -> Self {
        self.channel.configuration = configuration;
        self
    }

    #[must_use]
    pub fn properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.channel.properties = properties;
        self
    }

    #[must_use]
    pub fn label(mut self, label: Option<String>) -> Self {
        self.channel.label = label;
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.channel.description = description;
        self
    }

    #[must_use]
    pub fn default_tags(mut self, tags: BTreeSet<String>) -> Self {
        self.channel.default_tags = tags;
        self
    }

    #[must_use]
    pub fn build(self) -> Channel {
        self.channel
    }
}
