//! Thing types and bridge types.
//!
//! A bridge type is a thing type whose `bridge` flag is set: both share this
//! struct, its builder, and every code path that consumes them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::uid::{ChannelGroupTypeUID, ChannelTypeUID, ThingTypeUID};

/// Binds a channel id to a channel type within a thing type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDefinition {
    pub id: String,
    pub channel_type_uid: ChannelTypeUID,
    pub properties: BTreeMap<String, String>,
    pub label: Option<String>,
    pub description: Option<String>,
}

impl ChannelDefinition {
    #[must_use]
    pub fn new(id: impl Into<String>, channel_type_uid: ChannelTypeUID) -> Self {
        Self {
            id: id.into(),
            channel_type_uid,
            properties: BTreeMap::new(),
            label: None,
            description: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

/// Binds a group id to a channel group type within a thing type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelGroupDefinition {
    pub id: String,
    pub group_type_uid: ChannelGroupTypeUID,
    pub label: Option<String>,
    pub description: Option<String>,
}

impl ChannelGroupDefinition {
    #[must_use]
    pub fn new(id: impl Into<String>, group_type_uid: ChannelGroupTypeUID) -> Self {
        Self {
            id: id.into(),
            group_type_uid,
            label: None,
            description: None,
        }
    }
}

/// Describes a class of device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThingType {
    pub uid: ThingTypeUID,
    pub label: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: BTreeSet<String>,
    /// Whether the type is offered for manual creation / discovery.
    pub listed: bool,
    /// Name of the property that uniquely identifies instances.
    pub representation_property: Option<String>,
    pub channel_definitions: Vec<ChannelDefinition>,
    pub channel_group_definitions: Vec<ChannelGroupDefinition>,
    pub properties: BTreeMap<String, String>,
    pub config_description_uri: Option<String>,
    /// `None`: may attach under any bridge. `Some(vec![])`: under none.
    pub supported_bridge_type_uids: Option<Vec<ThingTypeUID>>,
    /// Set for bridge types.
    pub bridge: bool,
}

impl ThingType {
    /// Create a builder for a (non-bridge) thing type.
    #[must_use]
    pub fn builder(uid: ThingTypeUID, label: impl Into<String>) -> ThingTypeBuilder {
        ThingTypeBuilder {
            thing_type: Self {
                uid,
                label: label.into(),
                description: None,
                category: None,
                tags: BTreeSet::new(),
                listed: true,
                representation_property: None,
                channel_definitions: Vec::new(),
                channel_group_definitions: Vec::new(),
                properties: BTreeMap::new(),
                config_description_uri: None,
                supported_bridge_type_uids: None,
                bridge: false,
            },
        }
    }

    /// Whether instances of this type are bridges.
    #[must_use]
    pub fn is_bridge(&self) -> bool {
        self.bridge
    }

    /// Whether a thing of this type may attach under a bridge of `bridge_type`.
    #[must_use]
    pub fn supports_bridge_type(&self, bridge_type: &ThingTypeUID) -> bool {
        self.supported_bridge_type_uids
            .as_ref()
            .is_none_or(|uids| uids.contains(bridge_type))
    }

    /// Look up a channel definition by id.
    #[must_use]
    pub fn channel_definition(&self, id: &str) -> Option<&ChannelDefinition> {
        self.channel_definitions.iter().find(|d| d.id == id)
    }
}

/// Step-by-step builder for [`ThingType`].
#[derive(Debug)]
pub struct ThingTypeBuilder {
    thing_type: ThingType,
}

impl ThingTypeBuilder {
    /// Mark the type as a bridge type.
    #[must_use]
    pub fn bridge(mut self) -> Self {
        self.thing_type.bridge = true;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.thing_type.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.thing_type.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.thing_type.tags.insert(tag.into());
        self
    }

    #[must_use]
    pub fn listed(mut self, listed: bool) -> Self {
        self.thing_type.listed = listed;
        self
    }

    #[must_use]
    pub fn representation_property(mut self, property: impl Into<String>) -> Self {
        self.thing_type.representation_property = Some(property.into());
        self
    }

    #[must_use]
    pub fn channel(mut self, definition: ChannelDefinition) -> Self {
        self.thing_type.channel_definitions.push(definition);
        self
    }

    #[must_use]
    pub fn channel_group(mut self, definition: ChannelGroupDefinition) -> Self {
        self.thing_type.channel_group_definitions.push(definition);
        self
    }

    #[must_use]
    pub fn property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.thing_type.properties.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn config_description_uri(mut self, uri: impl Into<String>) -> Self {
        self.thing_type.config_description_uri = Some(uri.into());
        self
    }

    #[must_use]
    pub fn supported_bridge_type_uids(mut self, uids: Option<Vec<ThingTypeUID>>) -> Self {
        self.thing_type.supported_bridge_type_uids = uids;
        self
    }

    #[must_use]
    pub fn build(self) -> ThingType {
        self.thing_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(s: &str) -> ThingTypeUID {
        s.parse().unwrap()
    }

    #[test]
    fn should_default_to_listed_non_bridge() {
        let tt = ThingType::builder(uid("acme:sensor"), "Sensor").build();
        assert!(tt.listed);
        assert!(!tt.is_bridge());
        assert!(tt.supported_bridge_type_uids.is_none());
    }

    #[test]
    fn should_support_any_bridge_when_unrestricted() {
        let tt = ThingType::builder(uid("acme:sensor"), "Sensor").build();
        assert!(tt.supports_bridge_type(&uid("acme:hub")));
    }

    #[test]
    fn should_support_no_bridge_when_explicitly_empty() {
        let tt = ThingType::builder(uid("acme:sensor"), "Sensor")
            .supported_bridge_type_uids(Some(vec![]))
            .build();
        assert!(!tt.supports_bridge_type(&uid("acme:hub")));
    }

    #[test]
    fn should_find_channel_definition_by_id() {
        let tt = ThingType::builder(uid("acme:sensor"), "Sensor")
            .channel(ChannelDefinition::new(
                "temp",
                "system:temperature".parse().unwrap(),
            ))
            .build();
        assert!(tt.channel_definition("temp").is_some());
        assert!(tt.channel_definition("humidity").is_none());
    }
}
