//! Things: concrete instances of devices or services.
//!
//! A [`Thing`] is an immutable snapshot. Every change (status, configuration,
//! properties, …) produces a new snapshot through a `with_*` method or
//! [`Thing::to_builder`]; holders swap the reference they keep. A bridge is a
//! thing whose [`is_bridge`](Thing::is_bridge) flag is set; which things hang
//! below it is tracked by the runtime, not by the snapshot.

mod channel;
mod status;

pub use channel::{Channel, ChannelBuilder};
pub use status::{ThingStatus, ThingStatusDetail, ThingStatusInfo};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::Configuration;
use crate::uid::{ChannelUID, ThingTypeUID, ThingUID};

/// A concrete instance of a manageable device or service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thing {
    uid: ThingUID,
    thing_type_uid: ThingTypeUID,
    bridge_uid: Option<ThingUID>,
    label: Option<String>,
    location: Option<String>,
    configuration: Configuration,
    channels: Vec<Channel>,
    properties: BTreeMap<String, String>,
    status_info: ThingStatusInfo,
    bridge: bool,
}

impl Thing {
    /// Create a builder for a thing of the given type and UID.
    #[must_use]
    pub fn builder(thing_type_uid: ThingTypeUID, uid: ThingUID) -> ThingBuilder {
        ThingBuilder {
            thing: Self {
                uid,
                thing_type_uid,
                bridge_uid: None,
                label: None,
                location: None,
                configuration: Configuration::new(),
                channels: Vec::new(),
                properties: BTreeMap::new(),
                status_info: ThingStatusInfo::default(),
                bridge: false,
            },
        }
    }

    /// Start a builder pre-filled with this snapshot.
    #[must_use]
    pub fn to_builder(&self) -> ThingBuilder {
        ThingBuilder {
            thing: self.clone(),
        }
    }

    #[must_use]
    pub fn uid(&self) -> &ThingUID {
        &self.uid
    }

    #[must_use]
    pub fn thing_type_uid(&self) -> &ThingTypeUID {
        &self.thing_type_uid
    }

    /// UID of the bridge this thing is attached to.
    #[must_use]
    pub fn bridge_uid(&self) -> Option<&ThingUID> {
        self.bridge_uid.as_ref()
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    #[must_use]
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    #[must_use]
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Look up a channel by its id (including any group prefix).
    #[must_use]
    pub fn channel(&self, id: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.uid().id() == id)
    }

    /// Look up a channel by its full UID.
    #[must_use]
    pub fn channel_by_uid(&self, uid: &ChannelUID) -> Option<&Channel> {
        self.channels.iter().find(|c| c.uid() == uid)
    }

    #[must_use]
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    #[must_use]
    pub fn status_info(&self) -> &ThingStatusInfo {
        &self.status_info
    }

    #[must_use]
    pub fn status(&self) -> ThingStatus {
        self.status_info.status
    }

    /// Whether this thing is a bridge able to host child things.
    #[must_use]
    pub fn is_bridge(&self) -> bool {
        self.bridge
    }

    /// New snapshot with the given status.
    #[must_use]
    pub fn with_status_info(&self, status_info: ThingStatusInfo) -> Self {
        Self {
            status_info,
            ..self.clone()
        }
    }

    /// New snapshot with the given configuration.
    #[must_use]
    pub fn with_configuration(&self, configuration: Configuration) -> Self {
        Self {
            configuration,
            ..self.clone()
        }
    }

    /// New snapshot with `properties` merged over the current ones.
    #[must_use]
    pub fn with_properties(&self, properties: &BTreeMap<String, String>) -> Self {
        let mut merged = self.properties.clone();
        merged.extend(properties.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self {
            properties: merged,
            ..self.clone()
        }
    }
}

/// Step-by-step builder for [`Thing`].
#[derive(Debug)]
pub struct ThingBuilder {
    thing: Thing,
}

impl ThingBuilder {
    /// Mark the thing as a bridge.
    #[must_use]
    pub fn bridge(mut self, bridge: bool) -> Self {
        self.thing.bridge = bridge;
        self
    }

    #[must_use]
    pub fn bridge_uid(mut self, bridge_uid: Option<ThingUID>) -> Self {
        self.thing.bridge_uid = bridge_uid;
        self
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.thing.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.thing.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn configuration(mut self, configuration: Configuration) -> Self {
        self.thing.configuration = configuration;
        self
    }

    #[must_use]
    pub fn channels(mut self, channels: Vec<Channel>) -> Self {
        self.thing.channels = channels;
        self
    }

    #[must_use]
    pub fn channel(mut self, channel: Channel) -> Self {
        self.thing.channels.push(channel);
        self
    }

    #[must_use]
    pub fn properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.thing.properties = properties;
        self
    }

    #[must_use]
    pub fn status_info(mut self, status_info: ThingStatusInfo) -> Self {
        self.thing.status_info = status_info;
        self
    }

    #[must_use]
    pub fn build(self) -> Thing {
        self.thing
    }
}
