//! Thing factory: instantiate things from their types.

use std::sync::Arc;

use smarthome_domain::config::Configuration;
use smarthome_domain::thing::{Channel, Thing};
use smarthome_domain::types::{ChannelDefinition, ThingType};
use smarthome_domain::uid::{ChannelUID, ThingUID};

use crate::registry::{ChannelGroupTypeRegistry, ChannelTypeRegistry, ConfigDescriptionRegistry};

/// Builds [`Thing`]s (with their channels and default configuration) from
/// a [`ThingType`].
pub struct ThingFactory {
    channel_types: Arc<ChannelTypeRegistry>,
    channel_group_types: Arc<ChannelGroupTypeRegistry>,
    config_descriptions: Arc<ConfigDescriptionRegistry>,
}

impl ThingFactory {
    #[must_use]
    pub fn new(
        channel_types: Arc<ChannelTypeRegistry>,
        channel_group_types: Arc<ChannelGroupTypeRegistry>,
        config_descriptions: Arc<ConfigDescriptionRegistry>,
    ) -> Self {
        Self {
            channel_types,
            channel_group_types,
            config_descriptions,
        }
    }

    /// Create a thing of `thing_type`.
    ///
    /// Without a `thing_uid` a random one is generated under the thing type
    /// (and under `bridge_uid`, when given). Defaults declared by the type's
    /// config description fill parameters absent from `configuration`.
    /// Channels whose type is unknown are skipped.
    #[tracing::instrument(skip_all, fields(thing_type = %thing_type.uid))]
    #[must_use]
    pub fn create_thing(
        &self,
        thing_type: &ThingType,
        configuration: Configuration,
        thing_uid: Option<ThingUID>,
        bridge_uid: Option<ThingUID>,
    ) -> Thing {
        let uid =
            thing_uid.unwrap_or_else(|| ThingUID::random(&thing_type.uid, bridge_uid.as_ref()));

        let mut channels = Vec::new();
        for definition in &thing_type.channel_definitions {
            match ChannelUID::new(&uid, &definition.id) {
                Ok(channel_uid) => channels.extend(self.create_channel(channel_uid, definition)),
                Err(err) => {
                    tracing::warn!(thing = %uid, channel = %definition.id, %err, "invalid channel id");
                }
            }
        }
        for group in &thing_type.channel_group_definitions {
            let Some(group_type) = self.channel_group_types.get(&group.group_type_uid, None) else {
                tracing::warn!(
                    thing = %uid,
                    group = %group.id,
                    group_type = %group.group_type_uid,
                    "unknown channel group type, group skipped"
                );
                continue;
            };
            for definition in &group_type.channel_definitions {
                match ChannelUID::in_group(&uid, &group.id, &definition.id) {
                    Ok(channel_uid) => channels.extend(self.create_channel(channel_uid, definition)),
                    Err(err) => {
                        tracing::warn!(thing = %uid, group = %group.id, %err, "invalid grouped channel id");
                    }
                }
            }
        }

        let configuration = self
            .default_configuration(thing_type.config_description_uri.as_ref())
            .merged(&configuration);

        Thing::builder(thing_type.uid.clone(), uid)
            .bridge(thing_type.is_bridge())
            .bridge_uid(bridge_uid)
            .label(thing_type.label.clone())
            .configuration(configuration)
            .channels(channels)
            .properties(thing_type.properties.clone())
            .build()
    }

    fn create_channel(&self, uid: ChannelUID, definition: &ChannelDefinition) -> Option<Channel> {
        let Some(channel_type) = self.channel_types.channel_type_for(definition, None) else {
            tracing::warn!(
                channel = %uid,
                channel_type = %definition.channel_type_uid,
                "unknown channel type, channel skipped"
            );
            return None;
        };

        let configuration =
            self.default_configuration(channel_type.config_description_uri.as_ref());
        Some(
            Channel::builder(uid, channel_type.item_type.clone())
                .kind(channel_type.kind)
                .channel_type_uid(channel_type.uid.clone())
                .configuration(configuration)
                .properties(definition.properties.clone())
                .label(definition.label.clone().or(Some(channel_type.label.clone())))
                .description(definition.description.clone().or(channel_type.description.clone()))
                .default_tags(channel_type.tags.clone())
                .build(),
        )
    }

    fn default_configuration(&self, uri: Option<&String>) -> Configuration {
        uri.and_then(|uri| self.config_descriptions.get(uri, None))
            .map(|description| description.default_configuration())
            .unwrap_or_default()
    }
}
