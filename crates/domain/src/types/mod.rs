//! Declarative type templates: thing types, bridge types, channel types,
//! and channel group types.
//!
//! Types are created once when a module's descriptors are resolved and are
//! never mutated afterwards; registries hand out clones.

mod channel_group_type;
mod channel_type;
pub mod system;
mod thing_type;

pub use channel_group_type::{ChannelGroupType, ChannelGroupTypeBuilder};
pub use channel_type::{
    ChannelKind, ChannelType, ChannelTypeBuilder, EventDescription, EventOption,
    StateDescription, StateOption,
};
pub use thing_type::{ChannelDefinition, ChannelGroupDefinition, ThingType, ThingTypeBuilder};

use std::fmt;

use crate::config::ConfigDescription;
use crate::uid::{ChannelGroupTypeUID, ChannelTypeUID, ThingTypeUID};

/// Anything stored in a type registry, keyed by its UID.
pub trait TypeDefinition: Clone + Send + Sync + 'static {
    /// Key type.
    type Uid: Clone + Ord + fmt::Display + Send + Sync + 'static;

    /// Human-readable kind used in logs and errors.
    const KIND: &'static str;

    /// The registry key.
    fn uid(&self) -> &Self::Uid;
}

impl TypeDefinition for ThingType {
    type Uid = ThingTypeUID;
    const KIND: &'static str = "ThingType";

    fn uid(&self) -> &Self::Uid {
        &self.uid
    }
}

impl TypeDefinition for ChannelType {
    type Uid = ChannelTypeUID;
    const KIND: &'static str = "ChannelType";

    fn uid(&self) -> &Self::Uid {
        &self.uid
    }
}

impl TypeDefinition for ChannelGroupType {
    type Uid = ChannelGroupTypeUID;
    const KIND: &'static str = "ChannelGroupType";

    fn uid(&self) -> &Self::Uid {
        &self.uid
    }
}

impl TypeDefinition for ConfigDescription {
    type Uid = String;
    const KIND: &'static str = "ConfigDescription";

    fn uid(&self) -> &Self::Uid {
        &self.uri
    }
}
