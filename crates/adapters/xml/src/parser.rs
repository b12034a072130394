//! `<thing-descriptions>` conversion.
//!
//! Each top-level declaration is converted on its own: a broken declaration
//! is reported in [`ParsedDocument::errors`] and its siblings still make it
//! into [`ParsedDocument::results`]. Only a malformed document or a wrong
//! root aborts the whole document.

use std::collections::{BTreeMap, BTreeSet};

use smarthome_domain::types::{
    ChannelKind, EventDescription, EventOption, StateDescription, StateOption,
};

use crate::config::{self, list_of, parse_config_description};
use crate::cursor::{ChildCursor, ensure_no_text};
use crate::error::{ConversionError, DeclarationError, DescriptorError};
use crate::model::{
    ChannelGroupTypeXmlResult, ChannelGroupXmlResult, ChannelTypeXmlResult, ChannelXmlResult,
    ConfigDescriptionRef, ParsedConfigDocument, ParsedDocument, ThingTypeXmlResult, XmlResult,
};
use crate::node::{AttributeSpec, Element};

pub(crate) const ROOT: &str = "thing-descriptions";

const ROOT_ATTRIBUTES: &[AttributeSpec] = &[("bindingId", true), ("schemaLocation", false)];
const THING_TYPE_ATTRIBUTES: &[AttributeSpec] = &[("id", true), ("listed", false)];
const CHANNEL_TYPE_ATTRIBUTES: &[AttributeSpec] = &[("id", true), ("advanced", false), ("system", false)];
const CHANNEL_GROUP_TYPE_ATTRIBUTES: &[AttributeSpec] = &[("id", true), ("advanced", false)];
const CHANNEL_ATTRIBUTES: &[AttributeSpec] = &[("id", true), ("typeId", false)];
const STATE_ATTRIBUTES: &[AttributeSpec] = &[
    ("min", false),
    ("max", false),
    ("step", false),
    ("pattern", false),
    ("readOnly", false),
];

const CONFIG_DESCRIPTION: &str = "config-description";
const CONFIG_DESCRIPTION_REF: &str = "config-description-ref";

/// Any descriptor document, dispatched on its root element.
#[derive(Debug, Clone, PartialEq)]
pub enum Descriptor {
    Things(ParsedDocument),
    Configs(ParsedConfigDocument),
}

impl Descriptor {
    /// Parse a `<thing-descriptions>` or `<config-descriptions>` document.
    ///
    /// # Errors
    ///
    /// [`DescriptorError`] for malformed XML, an unknown root, or an invalid
    /// root element.
    pub fn parse(document: &str, text: &str) -> Result<Self, DescriptorError> {
        let root = Element::parse(text).map_err(|source| DescriptorError::Xml {
            document: document.to_string(),
            source,
        })?;
        match root.name.as_str() {
            ROOT => parse_things_root(document, &root).map(Self::Things),
            config::ROOT => config::parse_config_root(document, &root).map(Self::Configs),
            _ => Err(DescriptorError::UnexpectedRoot {
                document: document.to_string(),
                found: root.name,
            }),
        }
    }
}

/// Parse a `<thing-descriptions bindingId="..">` document.
///
/// # Errors
///
/// [`DescriptorError`] for malformed XML, another root, or a root without
/// `bindingId`.
pub fn parse_document(document: &str, text: &str) -> Result<ParsedDocument, DescriptorError> {
    let root = Element::parse(text).map_err(|source| DescriptorError::Xml {
        document: document.to_string(),
        source,
    })?;
    if root.name != ROOT {
        return Err(DescriptorError::UnexpectedRoot {
            document: document.to_string(),
            found: root.name,
        });
    }
    parse_things_root(document, &root)
}

fn parse_things_root(document: &str, root: &Element) -> Result<ParsedDocument, DescriptorError> {
    let root_error = |source| DescriptorError::Root {
        document: document.to_string(),
        source,
    };
    root.check_attributes(ROOT_ATTRIBUTES).map_err(root_error)?;
    let binding_id = root.required_attribute("bindingId").map_err(root_error)?.to_string();
    ensure_no_text(root).map_err(root_error)?;

    let mut parsed = ParsedDocument {
        binding_id,
        results: Vec::new(),
        errors: Vec::new(),
    };
    for declaration in root.elements() {
        match parse_declaration(declaration) {
            Ok(result) => parsed.results.push(result),
            Err(source) => {
                let id = declaration.attribute("id").unwrap_or("?");
                tracing::warn!(document, element = %declaration.name, id, error = %source, "declaration skipped");
                parsed.errors.push(DeclarationError {
                    kind: declaration.name.clone(),
                    id: id.to_string(),
                    source,
                });
            }
        }
    }
    tracing::debug!(
        document,
        binding = %parsed.binding_id,
        results = parsed.results.len(),
        errors = parsed.errors.len(),
        "descriptor parsed"
    );
    Ok(parsed)
}

fn parse_declaration(element: &Element) -> Result<XmlResult, ConversionError> {
    match element.name.as_str() {
        "thing-type" => parse_thing_type(element).map(XmlResult::ThingType),
        "bridge-type" => parse_thing_type(element).map(XmlResult::BridgeType),
        "channel-type" => parse_channel_type(element).map(XmlResult::ChannelType),
        "channel-group-type" => parse_channel_group_type(element).map(XmlResult::ChannelGroupType),
        other => Err(ConversionError::UnexpectedChild {
            parent: ROOT.to_string(),
            child: other.to_string(),
        }),
    }
}

/// Shared by `<thing-type>` and `<bridge-type>`.
fn parse_thing_type(element: &Element) -> Result<ThingTypeXmlResult, ConversionError> {
    element.check_attributes(THING_TYPE_ATTRIBUTES)?;
    let id = element.required_attribute("id")?.to_string();
    let listed = element.bool_attribute("listed", true);

    let mut cursor = ChildCursor::new(element)?;
    let supported_bridge_type_refs = cursor
        .next("supported-bridge-type-refs", false)?
        .map(parse_bridge_type_refs)
        .transpose()?;
    let label = cursor.text("label", true)?.unwrap_or_default();
    let description = cursor.text("description", false)?;
    let category = cursor.text("category", false)?;
    let tags = cursor
        .next("tags", false)?
        .map(parse_tags)
        .transpose()?
        .unwrap_or_default();
    let (channels, channel_groups) = match cursor.next_of(&["channels", "channel-groups"], false)? {
        Some(child) if child.name == "channels" => (parse_channels(child)?, Vec::new()),
        Some(child) => (Vec::new(), parse_channel_groups(child)?),
        None => (Vec::new(), Vec::new()),
    };
    let properties = cursor
        .next("properties", false)?
        .map(parse_properties)
        .transpose()?
        .unwrap_or_default();
    let representation_property = cursor.text("representation-property", false)?;
    let config_description = parse_config_description_ref(element, &mut cursor)?;
    cursor.finish()?;

    Ok(ThingTypeXmlResult {
        id,
        listed,
        supported_bridge_type_refs,
        label,
        description,
        category,
        tags,
        channels,
        channel_groups,
        properties,
        representation_property,
        config_description,
    })
}

fn parse_bridge_type_refs(element: &Element) -> Result<Vec<String>, ConversionError> {
    element.check_attributes(&[])?;
    list_of(element, "bridge-type-ref")?
        .into_iter()
        .map(|reference| {
            reference.check_attributes(&[("id", true)])?;
            Ok(reference.required_attribute("id")?.to_string())
        })
        .collect()
}

fn parse_channels(element: &Element) -> Result<Vec<ChannelXmlResult>, ConversionError> {
    list_of(element, "channel")?.into_iter().map(parse_channel).collect()
}

fn parse_channel(element: &Element) -> Result<ChannelXmlResult, ConversionError> {
    element.check_attributes(CHANNEL_ATTRIBUTES)?;
    let mut cursor = ChildCursor::new(element)?;
    let label = cursor.text("label", false)?;
    let description = cursor.text("description", false)?;
    let properties = cursor
        .next("properties", false)?
        .map(parse_properties)
        .transpose()?
        .unwrap_or_default();
    cursor.finish()?;
    Ok(ChannelXmlResult {
        id: element.required_attribute("id")?.to_string(),
        type_id: element.attribute("typeId").map(str::to_string),
        label,
        description,
        properties,
    })
}

fn parse_channel_groups(element: &Element) -> Result<Vec<ChannelGroupXmlResult>, ConversionError> {
    list_of(element, "channel-group")?
        .into_iter()
        .map(|group| {
            group.check_attributes(CHANNEL_ATTRIBUTES)?;
            let mut cursor = ChildCursor::new(group)?;
            let label = cursor.text("label", false)?;
            let description = cursor.text("description", false)?;
            cursor.finish()?;
            Ok(ChannelGroupXmlResult {
                id: group.required_attribute("id")?.to_string(),
                type_id: group.attribute("typeId").map(str::to_string),
                label,
                description,
            })
        })
        .collect()
}

/// `<property name="..">value</property>` entries; a repeated name is an
/// error, the first value is never overwritten.
fn parse_properties(element: &Element) -> Result<BTreeMap<String, String>, ConversionError> {
    let mut properties = BTreeMap::new();
    for property in list_of(element, "property")? {
        property.check_attributes(&[("name", true)])?;
        let name = property.required_attribute("name")?;
        if properties.contains_key(name) {
            return Err(ConversionError::DuplicateProperty {
                name: name.to_string(),
            });
        }
        properties.insert(name.to_string(), property.text());
    }
    Ok(properties)
}

fn parse_config_description_ref(
    owner: &Element,
    cursor: &mut ChildCursor<'_>,
) -> Result<ConfigDescriptionRef, ConversionError> {
    let mut reference = ConfigDescriptionRef::default();
    while let Some(child) = cursor.next_of(&[CONFIG_DESCRIPTION, CONFIG_DESCRIPTION_REF], false)? {
        if reference.uri.is_some() || reference.inline.is_some() {
            return Err(ConversionError::DuplicateConfigDescription {
                element: owner.name.clone(),
            });
        }
        if child.name == CONFIG_DESCRIPTION {
            reference.inline = Some(parse_config_description(child, false)?);
        } else {
            child.check_attributes(&[("uri", true)])?;
            reference.uri = Some(child.required_attribute("uri")?.to_string());
        }
    }
    Ok(reference)
}

fn parse_channel_type(element: &Element) -> Result<ChannelTypeXmlResult, ConversionError> {
    element.check_attributes(CHANNEL_TYPE_ATTRIBUTES)?;
    let id = element.required_attribute("id")?.to_string();
    let advanced = element.bool_attribute("advanced", false);
    let system = element.bool_attribute("system", false);

    let mut cursor = ChildCursor::new(element)?;
    let (item_type, kind) = match cursor.next_of(&["item-type", "kind"], true)? {
        Some(child) if child.name == "item-type" => (child.non_empty_text(), ChannelKind::State),
        Some(child) => {
            let raw = child.text();
            let kind = raw.parse().map_err(|_| ConversionError::InvalidValue {
                element: child.name.clone(),
                field: "kind",
                value: raw.clone(),
            })?;
            (None, kind)
        }
        None => (None, ChannelKind::State),
    };
    let label = cursor.text("label", true)?.unwrap_or_default();
    let description = cursor.text("description", false)?;
    let category = cursor.text("category", false)?;
    let tags = cursor.next("tags", false)?.map(parse_tags).transpose()?.unwrap_or_default();
    let (state, event) = match cursor.next_of(&["state", "event"], false)? {
        Some(child) if child.name == "state" => (Some(parse_state(child)?), None),
        Some(child) => (None, Some(parse_event(child)?)),
        None => (None, None),
    };
    let config_description = parse_config_description_ref(element, &mut cursor)?;
    cursor.finish()?;

    Ok(ChannelTypeXmlResult {
        id,
        advanced,
        system,
        item_type,
        kind,
        label,
        description,
        category,
        tags,
        state,
        event,
        config_description,
    })
}

fn parse_tags(element: &Element) -> Result<BTreeSet<String>, ConversionError> {
    Ok(list_of(element, "tag")?.into_iter().map(Element::text).collect())
}

fn parse_option_list(element: &Element) -> Result<Vec<(String, Option<String>)>, ConversionError> {
    list_of(element, "option")?
        .into_iter()
        .map(|option| {
            option.check_attributes(&[("value", true)])?;
            Ok((option.required_attribute("value")?.to_string(), option.non_empty_text()))
        })
        .collect()
}

fn parse_state(element: &Element) -> Result<StateDescription, ConversionError> {
    element.check_attributes(STATE_ATTRIBUTES)?;
    let mut cursor = ChildCursor::new(element)?;
    let options = cursor
        .next("options", false)?
        .map(parse_option_list)
        .transpose()?
        .unwrap_or_default();
    cursor.finish()?;
    Ok(StateDescription {
        minimum: element.decimal_attribute("min")?,
        maximum: element.decimal_attribute("max")?,
        step: element.decimal_attribute("step")?,
        pattern: element.attribute("pattern").map(str::to_string),
        read_only: element.bool_attribute("readOnly", false),
        options: options
            .into_iter()
            .map(|(value, label)| StateOption { value, label })
            .collect(),
    })
}

fn parse_event(element: &Element) -> Result<EventDescription, ConversionError> {
    element.check_attributes(&[])?;
    let mut cursor = ChildCursor::new(element)?;
    let options = cursor
        .next("options", false)?
        .map(parse_option_list)
        .transpose()?
        .unwrap_or_default();
    cursor.finish()?;
    Ok(EventDescription {
        options: options
            .into_iter()
            .map(|(value, label)| EventOption { value, label })
            .collect(),
    })
}

fn parse_channel_group_type(element: &Element) -> Result<ChannelGroupTypeXmlResult, ConversionError> {
    element.check_attributes(CHANNEL_GROUP_TYPE_ATTRIBUTES)?;
    let mut cursor = ChildCursor::new(element)?;
    let label = cursor.text("label", true)?.unwrap_or_default();
    let description = cursor.text("description", false)?;
    let category = cursor.text("category", false)?;
    let channels = cursor.next("channels", true)?.map(parse_channels).transpose()?.unwrap_or_default();
    cursor.finish()?;
    Ok(ChannelGroupTypeXmlResult {
        id: element.required_attribute("id")?.to_string(),
        advanced: element.bool_attribute("advanced", false),
        label,
        description,
        category,
        channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> ParsedDocument {
        parse_document(
            "test.xml",
            &format!(
                r#"<thing:thing-descriptions bindingId="acme"
                    xmlns:thing="https://openhab.org/schemas/thing-description/v1.0.0"
                    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
                    xsi:schemaLocation="https://openhab.org/schemas/thing-description/v1.0.0">
                    {body}
                </thing:thing-descriptions>"#
            ),
        )
        .unwrap()
    }

    fn single_error(body: &str) -> ConversionError {
        let parsed = parse(body);
        assert!(parsed.results.is_empty(), "unexpected results: {:?}", parsed.results);
        assert_eq!(parsed.errors.len(), 1);
        parsed.errors[0].source.clone()
    }

    #[test]
    fn should_parse_thing_type_in_sequence() {
        let parsed = parse(
            r#"<thing-type id="sensor" listed="false">
                <supported-bridge-type-refs>
                    <bridge-type-ref id="hub"/>
                </supported-bridge-type-refs>
                <label>Sensor</label>
                <description>Climate sensor</description>
                <category>Sensor</category>
                <tags><tag>Climate</tag><tag>Outdoor</tag></tags>
                <channels>
                    <channel id="temperature" typeId="system.outdoor-temperature">
                        <label>Outside</label>
                    </channel>
                    <channel id="battery" typeId="system.battery-level"/>
                </channels>
                <properties>
                    <property name="vendor">Acme</property>
                </properties>
                <representation-property>serial</representation-property>
                <config-description-ref uri="thing-type:acme:sensor"/>
            </thing-type>"#,
        );

        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        assert_eq!(parsed.binding_id, "acme");
        let XmlResult::ThingType(record) = &parsed.results[0] else {
            panic!("expected a thing type, got {:?}", parsed.results[0]);
        };
        assert_eq!(record.id, "sensor");
        assert!(!record.listed);
        assert_eq!(record.supported_bridge_type_refs, Some(vec!["hub".to_string()]));
        assert_eq!(record.label, "Sensor");
        assert_eq!(
            record.tags.iter().map(String::as_str).collect::<Vec<_>>(),
            ["Climate", "Outdoor"]
        );
        assert_eq!(record.channels.len(), 2);
        assert_eq!(record.channels[0].label.as_deref(), Some("Outside"));
        assert_eq!(record.channels[1].type_id.as_deref(), Some("system.battery-level"));
        assert_eq!(record.properties.get("vendor").map(String::as_str), Some("Acme"));
        assert_eq!(record.representation_property.as_deref(), Some("serial"));
        assert_eq!(record.config_description.uri.as_deref(), Some("thing-type:acme:sensor"));
    }

    #[test]
    fn should_keep_absent_and_empty_bridge_refs_apart() {
        let parsed = parse(
            r#"<thing-type id="free"><label>Free</label></thing-type>
               <thing-type id="standalone">
                   <supported-bridge-type-refs/>
                   <label>Standalone</label>
               </thing-type>"#,
        );

        let refs: Vec<Option<Vec<String>>> = parsed
            .results
            .iter()
            .map(|result| match result {
                XmlResult::ThingType(record) => record.supported_bridge_type_refs.clone(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(refs, vec![None, Some(Vec::new())]);
    }

    #[test]
    fn should_default_listed_to_true_on_non_literal() {
        let parsed = parse(r#"<thing-type id="a" listed="yes"><label>A</label></thing-type>"#);
        let XmlResult::ThingType(record) = &parsed.results[0] else {
            panic!("expected a thing type");
        };
        assert!(record.listed);
    }

    #[test]
    fn should_parse_bridge_type_with_same_builder() {
        let parsed = parse(r#"<bridge-type id="hub"><label>Hub</label></bridge-type>"#);
        assert!(matches!(&parsed.results[0], XmlResult::BridgeType(record) if record.id == "hub"));
    }

    #[test]
    fn should_report_missing_label() {
        let err = single_error(r#"<thing-type id="a"><description>no label</description></thing-type>"#);
        assert_eq!(
            err,
            ConversionError::MissingElement {
                parent: "thing-type".to_string(),
                element: "label".to_string(),
            }
        );
    }

    #[test]
    fn should_report_out_of_order_child_as_trailing_content() {
        let err = single_error(
            r#"<thing-type id="a"><label>A</label><category>C</category><description>late</description></thing-type>"#,
        );
        assert!(matches!(err, ConversionError::UnexpectedContent { ref found, .. } if found == "<description>"));
    }

    #[test]
    fn should_reject_duplicate_property() {
        let err = single_error(
            r#"<thing-type id="a">
                <label>A</label>
                <properties>
                    <property name="vendor">Acme</property>
                    <property name="vendor">Other</property>
                </properties>
            </thing-type>"#,
        );
        assert_eq!(
            err,
            ConversionError::DuplicateProperty {
                name: "vendor".to_string()
            }
        );
    }

    #[test]
    fn should_reject_both_config_description_forms() {
        let err = single_error(
            r#"<thing-type id="a">
                <label>A</label>
                <config-description-ref uri="thing-type:acme:a"/>
                <config-description/>
            </thing-type>"#,
        );
        assert!(matches!(err, ConversionError::DuplicateConfigDescription { .. }));
    }

    #[test]
    fn should_keep_inline_config_description() {
        let parsed = parse(
            r#"<thing-type id="a">
                <label>A</label>
                <config-description>
                    <parameter name="refresh" type="integer"><default>30</default></parameter>
                </config-description>
            </thing-type>"#,
        );
        let XmlResult::ThingType(record) = &parsed.results[0] else {
            panic!("expected a thing type");
        };
        let inline = record.config_description.inline.as_ref().unwrap();
        assert_eq!(inline.uri, "");
        assert!(inline.parameter("refresh").is_some());
        assert!(record.config_description.uri.is_none());
    }

    #[test]
    fn should_parse_state_channel_type() {
        let parsed = parse(
            r#"<channel-type id="mode" advanced="true">
                <item-type>String</item-type>
                <label>Mode</label>
                <tags><tag>Control</tag><tag>Mode</tag></tags>
                <state min="0" max="10" step="0.5" pattern="%s" readOnly="true">
                    <options>
                        <option value="eco">Eco</option>
                        <option value="boost"/>
                    </options>
                </state>
            </channel-type>"#,
        );

        let XmlResult::ChannelType(record) = &parsed.results[0] else {
            panic!("expected a channel type, got {:?}", parsed);
        };
        assert!(record.advanced);
        assert_eq!(record.item_type.as_deref(), Some("String"));
        assert_eq!(record.kind, ChannelKind::State);
        assert_eq!(record.tags.len(), 2);
        let state = record.state.as_ref().unwrap();
        assert_eq!(state.maximum, Some(10.0));
        assert_eq!(state.step, Some(0.5));
        assert!(state.read_only);
        assert_eq!(state.options[0].label.as_deref(), Some("Eco"));
        assert_eq!(state.options[1].label, None);
    }

    #[test]
    fn should_parse_trigger_channel_type() {
        let parsed = parse(
            r#"<channel-type id="button">
                <kind>trigger</kind>
                <label>Button</label>
                <event><options><option value="PRESSED">Pressed</option></options></event>
            </channel-type>"#,
        );
        let XmlResult::ChannelType(record) = &parsed.results[0] else {
            panic!("expected a channel type");
        };
        assert_eq!(record.kind, ChannelKind::Trigger);
        assert!(record.item_type.is_none());
        assert_eq!(record.event.as_ref().unwrap().options[0].value, "PRESSED");
    }

    #[test]
    fn should_reject_non_tag_child_in_tags() {
        let err = single_error(
            r#"<channel-type id="a">
                <item-type>Switch</item-type>
                <label>A</label>
                <tags><tag>Switch</tag><category>nope</category></tags>
            </channel-type>"#,
        );
        assert_eq!(
            err,
            ConversionError::UnexpectedChild {
                parent: "tags".to_string(),
                child: "category".to_string(),
            }
        );
    }

    #[test]
    fn should_reject_non_tag_child_in_thing_type_tags() {
        let err = single_error(
            r#"<thing-type id="a">
                <label>A</label>
                <tags><tag>Lighting</tag><bogus>x</bogus></tags>
            </thing-type>"#,
        );
        assert_eq!(
            err,
            ConversionError::UnexpectedChild {
                parent: "tags".to_string(),
                child: "bogus".to_string(),
            }
        );
    }

    #[test]
    fn should_reject_thing_type_tags_after_channels() {
        let err = single_error(
            r#"<thing-type id="a">
                <label>A</label>
                <channels><channel id="c" typeId="x"/></channels>
                <tags><tag>Lighting</tag></tags>
            </thing-type>"#,
        );
        assert!(matches!(err, ConversionError::UnexpectedContent { ref found, .. } if found == "<tags>"));
    }

    #[test]
    fn should_require_item_type_or_kind() {
        let err = single_error(r#"<channel-type id="a"><label>A</label></channel-type>"#);
        assert!(matches!(err, ConversionError::MissingElement { ref element, .. } if element == "item-type|kind"));
    }

    #[test]
    fn should_parse_channel_group_type() {
        let parsed = parse(
            r#"<channel-group-type id="climate">
                <label>Climate</label>
                <channels>
                    <channel id="temperature" typeId="system.outdoor-temperature"/>
                </channels>
            </channel-group-type>"#,
        );
        let XmlResult::ChannelGroupType(record) = &parsed.results[0] else {
            panic!("expected a channel group type");
        };
        assert_eq!(record.channels[0].id, "temperature");
    }

    #[test]
    fn should_keep_valid_siblings_of_broken_declaration() {
        let parsed = parse(
            r#"<thing-type id="good"><label>Good</label></thing-type>
               <thing-type><label>No id</label></thing-type>
               <widget id="w"/>
               <channel-type id="also-good"><item-type>Switch</item-type><label>S</label></channel-type>"#,
        );

        let ids: Vec<&str> = parsed.results.iter().map(XmlResult::id).collect();
        assert_eq!(ids, vec!["good", "also-good"]);
        assert_eq!(parsed.errors.len(), 2);
        assert!(matches!(
            parsed.errors[0].source,
            ConversionError::MissingAttribute { attribute: "id", .. }
        ));
        assert_eq!(parsed.errors[1].kind, "widget");
    }

    #[test]
    fn should_abort_on_missing_binding_id() {
        let result = parse_document("test.xml", "<thing-descriptions/>");
        assert!(matches!(result, Err(DescriptorError::Root { .. })));
    }

    #[test]
    fn should_abort_on_malformed_xml() {
        let result = parse_document("test.xml", "<thing-descriptions bindingId=\"acme\">");
        assert!(matches!(result, Err(DescriptorError::Xml { .. })));
    }

    #[test]
    fn should_dispatch_on_root_element() {
        let things = Descriptor::parse("a.xml", r#"<thing-descriptions bindingId="acme"/>"#).unwrap();
        let configs = Descriptor::parse("b.xml", "<config-descriptions/>").unwrap();

        assert!(matches!(things, Descriptor::Things(_)));
        assert!(matches!(configs, Descriptor::Configs(_)));
    }
}
