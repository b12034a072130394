//! Intermediate records produced by the parser.
//!
//! Records keep identifiers exactly as written in the document; turning
//! them into UIDs is the resolver's job, once the binding id is known.

use std::collections::{BTreeMap, BTreeSet};

use smarthome_domain::config::ConfigDescription;
use smarthome_domain::types::{ChannelKind, EventDescription, StateDescription};

use crate::error::DeclarationError;

/// How a type points at its configuration description: by URI, inline, or
/// not at all. Never both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDescriptionRef {
    pub uri: Option<String>,
    pub inline: Option<ConfigDescription>,
}

/// `<channel id=".." typeId="..">` inside `<channels>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelXmlResult {
    pub id: String,
    pub type_id: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub properties: BTreeMap<String, String>,
}

/// `<channel-group id=".." typeId="..">` inside `<channel-groups>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelGroupXmlResult {
    pub id: String,
    pub type_id: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
}

/// A `<thing-type>` or `<bridge-type>` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ThingTypeXmlResult {
    pub id: String,
    pub listed: bool,
    /// `None` when the element is absent (any bridge or none), `Some(vec![])`
    /// when it is present but empty.
    pub supported_bridge_type_refs: Option<Vec<String>>,
    pub label: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: BTreeSet<String>,
    pub channels: Vec<ChannelXmlResult>,
    pub channel_groups: Vec<ChannelGroupXmlResult>,
    pub properties: BTreeMap<String, String>,
    pub representation_property: Option<String>,
    pub config_description: ConfigDescriptionRef,
}

/// A `<channel-type>` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelTypeXmlResult {
    pub id: String,
    pub advanced: bool,
    /// Declared in the reserved `system` namespace.
    pub system: bool,
    pub item_type: Option<String>,
    pub kind: ChannelKind,
    pub label: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: BTreeSet<String>,
    pub state: Option<StateDescription>,
    pub event: Option<EventDescription>,
    pub config_description: ConfigDescriptionRef,
}

/// A `<channel-group-type>` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelGroupTypeXmlResult {
    pub id: String,
    pub advanced: bool,
    pub label: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub channels: Vec<ChannelXmlResult>,
}

/// One converted top-level declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlResult {
    ThingType(ThingTypeXmlResult),
    BridgeType(ThingTypeXmlResult),
    ChannelType(ChannelTypeXmlResult),
    ChannelGroupType(ChannelGroupTypeXmlResult),
}

impl XmlResult {
    /// The declaration's `id` attribute.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::ThingType(record) | Self::BridgeType(record) => &record.id,
            Self::ChannelType(record) => &record.id,
            Self::ChannelGroupType(record) => &record.id,
        }
    }

    /// Element name the record was read from.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ThingType(_) => "thing-type",
            Self::BridgeType(_) => "bridge-type",
            Self::ChannelType(_) => "channel-type",
            Self::ChannelGroupType(_) => "channel-group-type",
        }
    }
}

/// Outcome of parsing one `<thing-descriptions>` document: every declaration
/// that converted, and one error per declaration that did not.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub binding_id: String,
    pub results: Vec<XmlResult>,
    pub errors: Vec<DeclarationError>,
}

/// Outcome of parsing one `<config-descriptions>` document.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedConfigDocument {
    pub descriptions: Vec<ConfigDescription>,
    pub errors: Vec<DeclarationError>,
}
