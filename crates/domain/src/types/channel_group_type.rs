//! Channel group types: a reusable cluster of channel definitions.

use serde::{Deserialize, Serialize};

use super::ChannelDefinition;
use crate::uid::ChannelGroupTypeUID;

/// Template for a repeated cluster of channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelGroupType {
    pub uid: ChannelGroupTypeUID,
    pub advanced: bool,
    pub label: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub channel_definitions: Vec<ChannelDefinition>,
}

impl ChannelGroupType {
    #[must_use]
    pub fn builder(uid: ChannelGroupTypeUID, label: impl Into<String>) -> ChannelGroupTypeBuilder {
        ChannelGroupTypeBuilder {
            group_type: Self {
                uid,
                advanced: false,
                label: label.into(),
                description: None,
                category: None,
                channel_definitions: Vec::new(),
            },
        }
    }
}

/// Step-by-step builder for [`ChannelGroupType`].
#[derive(Debug)]
pub struct ChannelGroupTypeBuilder {
    group_type: ChannelGroupType,
}

impl ChannelGroupTypeBuilder {
    #[must_use]
    pub fn advanced(mut self, advanced: bool) -> Self {
        self.group_type.advanced = advanced;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.group_type.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.group_type.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn channel(mut self, definition: ChannelDefinition) -> Self {
        self.group_type.channel_definitions.push(definition);
        self
    }

    #[must_use]
    pub fn build(self) -> ChannelGroupType {
        self.group_type
    }
}
