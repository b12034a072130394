//! Turn parsed records into typed definitions.
//!
//! Resolution is a pure function of the record and the binding id: resolving
//! the same record twice yields equal values.

use smarthome_domain::config::ConfigDescription;
use smarthome_domain::error::UidError;
use smarthome_domain::types::{
    ChannelDefinition, ChannelGroupDefinition, ChannelGroupType, ChannelType, ThingType,
};
use smarthome_domain::uid::{ChannelGroupTypeUID, ChannelTypeUID, SYSTEM_BINDING_ID, ThingTypeUID};

use crate::error::ResolutionError;
use crate::model::{
    ChannelGroupTypeXmlResult, ChannelGroupXmlResult, ChannelTypeXmlResult, ChannelXmlResult,
    ConfigDescriptionRef, ParsedDocument, ThingTypeXmlResult, XmlResult,
};

const SYSTEM_PREFIX: &str = "system.";

/// A resolved declaration, with the inline config description it carried.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedType {
    ThingType {
        thing_type: ThingType,
        config_description: Option<ConfigDescription>,
    },
    ChannelType {
        channel_type: ChannelType,
        config_description: Option<ConfigDescription>,
    },
    ChannelGroupType(ChannelGroupType),
}

/// Every resolvable record of a document, plus one error per record that
/// was not.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDocument {
    pub binding_id: String,
    pub types: Vec<ResolvedType>,
    pub errors: Vec<ResolutionError>,
}

fn uid<T>(id: &str, result: Result<T, UidError>) -> Result<T, ResolutionError> {
    result.map_err(|source| ResolutionError::Uid {
        id: id.to_string(),
        source,
    })
}

/// UID of a channel type referenced as `typeId`: `system.<id>` lives in the
/// system namespace, anything else in `binding_id`.
///
/// # Errors
///
/// [`ResolutionError::Uid`] when a segment is invalid.
pub fn resolve_channel_type_uid(binding_id: &str, type_id: &str) -> Result<ChannelTypeUID, ResolutionError> {
    match type_id.strip_prefix(SYSTEM_PREFIX) {
        Some(system_id) => uid(type_id, ChannelTypeUID::new(SYSTEM_BINDING_ID, system_id)),
        None => uid(type_id, ChannelTypeUID::new(binding_id, type_id)),
    }
}

fn resolve_channel(binding_id: &str, owner: &str, channel: &ChannelXmlResult) -> Result<ChannelDefinition, ResolutionError> {
    let type_id = channel.type_id.as_deref().ok_or_else(|| ResolutionError::MissingTypeId {
        element: "channel",
        id: channel.id.clone(),
        owner: owner.to_string(),
    })?;
    Ok(ChannelDefinition {
        id: channel.id.clone(),
        channel_type_uid: resolve_channel_type_uid(binding_id, type_id)?,
        properties: channel.properties.clone(),
        label: channel.label.clone(),
        description: channel.description.clone(),
    })
}

fn resolve_channel_group(
    binding_id: &str,
    owner: &str,
    group: &ChannelGroupXmlResult,
) -> Result<ChannelGroupDefinition, ResolutionError> {
    let type_id = group.type_id.as_deref().ok_or_else(|| ResolutionError::MissingTypeId {
        element: "channel-group",
        id: group.id.clone(),
        owner: owner.to_string(),
    })?;
    Ok(ChannelGroupDefinition {
        id: group.id.clone(),
        group_type_uid: uid(type_id, ChannelGroupTypeUID::new(binding_id, type_id))?,
        label: group.label.clone(),
        description: group.description.clone(),
    })
}

/// The URI the type points at, and the inline description (with its URI
/// defaulted to `default_uri` when the document left it out).
fn resolve_config_description(
    reference: &ConfigDescriptionRef,
    default_uri: impl FnOnce() -> String,
) -> (Option<String>, Option<ConfigDescription>) {
    match (&reference.uri, &reference.inline) {
        (_, Some(inline)) => {
            let mut inline = inline.clone();
            if inline.uri.is_empty() {
                inline.uri = default_uri();
            }
            (Some(inline.uri.clone()), Some(inline))
        }
        (uri, None) => (uri.clone(), None),
    }
}

/// Resolve a `<thing-type>` (or, with `bridge`, a `<bridge-type>`) record.
///
/// # Errors
///
/// [`ResolutionError`] for an invalid identifier or a channel without
/// `typeId`.
pub fn resolve_thing_type(
    record: &ThingTypeXmlResult,
    binding_id: &str,
    bridge: bool,
) -> Result<(ThingType, Option<ConfigDescription>), ResolutionError> {
    let thing_type_uid = uid(&record.id, ThingTypeUID::new(binding_id, &record.id))?;
    let channel_definitions = record
        .channels
        .iter()
        .map(|channel| resolve_channel(binding_id, &record.id, channel))
        .collect::<Result<Vec<_>, _>>()?;
    let channel_group_definitions = record
        .channel_groups
        .iter()
        .map(|group| resolve_channel_group(binding_id, &record.id, group))
        .collect::<Result<Vec<_>, _>>()?;
    let supported_bridge_type_uids = record
        .supported_bridge_type_refs
        .as_ref()
        .map(|refs| {
            refs.iter()
                .map(|id| uid(id, ThingTypeUID::new(binding_id, id)))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;
    let (config_description_uri, config_description) =
        resolve_config_description(&record.config_description, || format!("thing-type:{thing_type_uid}"));

    let thing_type = ThingType {
        uid: thing_type_uid,
        label: record.label.clone(),
        description: record.description.clone(),
        category: record.category.clone(),
        tags: record.tags.clone(),
        listed: record.listed,
        representation_property: record.representation_property.clone(),
        channel_definitions,
        channel_group_definitions,
        properties: record.properties.clone(),
        config_description_uri,
        supported_bridge_type_uids,
        bridge,
    };
    Ok((thing_type, config_description))
}

/// # Errors
///
/// [`ResolutionError::Uid`] for an invalid identifier.
pub fn resolve_channel_type(
    record: &ChannelTypeXmlResult,
    binding_id: &str,
) -> Result<(ChannelType, Option<ConfigDescription>), ResolutionError> {
    let namespace = if record.system { SYSTEM_BINDING_ID } else { binding_id };
    let channel_type_uid = uid(&record.id, ChannelTypeUID::new(namespace, &record.id))?;
    let (config_description_uri, config_description) =
        resolve_config_description(&record.config_description, || format!("channel-type:{channel_type_uid}"));

    let channel_type = ChannelType {
        uid: channel_type_uid,
        advanced: record.advanced,
        item_type: record.item_type.clone(),
        kind: record.kind,
        label: record.label.clone(),
        description: record.description.clone(),
        category: record.category.clone(),
        tags: record.tags.clone(),
        state: record.state.clone(),
        event: record.event.clone(),
        config_description_uri,
    };
    Ok((channel_type, config_description))
}

/// # Errors
///
/// [`ResolutionError`] for an invalid identifier or a channel without
/// `typeId`.
pub fn resolve_channel_group_type(
    record: &ChannelGroupTypeXmlResult,
    binding_id: &str,
) -> Result<ChannelGroupType, ResolutionError> {
    let channel_definitions = record
        .channels
        .iter()
        .map(|channel| resolve_channel(binding_id, &record.id, channel))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ChannelGroupType {
        uid: uid(&record.id, ChannelGroupTypeUID::new(binding_id, &record.id))?,
        advanced: record.advanced,
        label: record.label.clone(),
        description: record.description.clone(),
        category: record.category.clone(),
        channel_definitions,
    })
}

impl XmlResult {
    /// Resolve this record under `binding_id`.
    ///
    /// # Errors
    ///
    /// [`ResolutionError`] for an invalid identifier or a channel without
    /// `typeId`.
    pub fn resolve(&self, binding_id: &str) -> Result<ResolvedType, ResolutionError> {
        match self {
            Self::ThingType(record) => resolve_thing_type(record, binding_id, false).map(into_thing_type),
            Self::BridgeType(record) => resolve_thing_type(record, binding_id, true).map(into_thing_type),
            Self::ChannelType(record) => {
                resolve_channel_type(record, binding_id).map(|(channel_type, config_description)| {
                    ResolvedType::ChannelType {
                        channel_type,
                        config_description,
                    }
                })
            }
            Self::ChannelGroupType(record) => {
                resolve_channel_group_type(record, binding_id).map(ResolvedType::ChannelGroupType)
            }
        }
    }
}

fn into_thing_type((thing_type, config_description): (ThingType, Option<ConfigDescription>)) -> ResolvedType {
    ResolvedType::ThingType {
        thing_type,
        config_description,
    }
}

/// Resolve every record of `document` independently.
#[must_use]
pub fn resolve_document(document: &ParsedDocument) -> ResolvedDocument {
    let mut resolved = ResolvedDocument {
        binding_id: document.binding_id.clone(),
        types: Vec::with_capacity(document.results.len()),
        errors: Vec::new(),
    };
    for record in &document.results {
        match record.resolve(&document.binding_id) {
            Ok(definition) => resolved.types.push(definition),
            Err(err) => {
                tracing::warn!(binding = %document.binding_id, kind = record.kind(), id = record.id(), error = %err, "record not resolved");
                resolved.errors.push(err);
            }
        }
    }
    resolved
}
