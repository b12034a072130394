//! `<config-description>` conversion, inline and in `<config-descriptions>`
//! documents.

use smarthome_domain::config::{
    ConfigDescription, ConfigDescriptionParameter, ParameterGroup, ParameterOption, ParameterPattern,
    ParameterType,
};

use crate::cursor::ensure_no_text;
use crate::error::{ConversionError, DeclarationError, DescriptorError};
use crate::model::ParsedConfigDocument;
use crate::node::{AttributeSpec, Element, parse_bool};

pub(crate) const ROOT: &str = "config-descriptions";

const PARAMETER_ATTRIBUTES: &[AttributeSpec] = &[
    ("name", true),
    ("type", true),
    ("min", false),
    ("max", false),
    ("step", false),
    ("pattern", false),
    ("required", false),
    ("readOnly", false),
    ("multiple", false),
    ("groupName", false),
    ("unit", false),
];

fn invalid(element: &Element, field: &'static str, value: &str) -> ConversionError {
    ConversionError::InvalidValue {
        element: element.name.clone(),
        field,
        value: value.to_string(),
    }
}

/// Children of `element`, all of which must be named `child`.
pub(crate) fn list_of<'a>(element: &'a Element, child: &str) -> Result<Vec<&'a Element>, ConversionError> {
    ensure_no_text(element)?;
    element
        .elements()
        .map(|item| {
            if item.name == child {
                Ok(item)
            } else {
                Err(ConversionError::UnexpectedChild {
                    parent: element.name.clone(),
                    child: item.name.clone(),
                })
            }
        })
        .collect()
}

fn parse_options(element: &Element) -> Result<Vec<ParameterOption>, ConversionError> {
    list_of(element, "option")?
        .into_iter()
        .map(|option| {
            option.check_attributes(&[("value", true)])?;
            Ok(ParameterOption {
                value: option.required_attribute("value")?.to_string(),
                label: option.text(),
            })
        })
        .collect()
}

fn parse_parameter(element: &Element) -> Result<ConfigDescriptionParameter, ConversionError> {
    element.check_attributes(PARAMETER_ATTRIBUTES)?;
    let name = element.required_attribute("name")?;
    let raw_type = element.required_attribute("type")?;
    let parameter_type: ParameterType = raw_type.parse().map_err(|_| invalid(element, "type", raw_type))?;

    let mut parameter = ConfigDescriptionParameter::builder(name, parameter_type).build();
    parameter.min = element.decimal_attribute("min")?;
    parameter.max = element.decimal_attribute("max")?;
    parameter.step = element.decimal_attribute("step")?;
    parameter.pattern = element.attribute("pattern").map(ParameterPattern::new);
    parameter.required = element.bool_attribute("required", false);
    parameter.read_only = element.bool_attribute("readOnly", false);
    parameter.multiple = element.bool_attribute("multiple", false);
    parameter.group_name = element.attribute("groupName").map(str::to_string);
    parameter.unit = element.attribute("unit").map(str::to_string);

    ensure_no_text(element)?;
    for child in element.elements() {
        match child.name.as_str() {
            "label" => parameter.label = child.non_empty_text(),
            "description" => parameter.description = child.non_empty_text(),
            "context" => parameter.context = child.non_empty_text(),
            "default" => parameter.default = Some(child.text()),
            "required" => parameter.required = parse_bool(&child.name, "required", &child.text(), false),
            "advanced" => parameter.advanced = parse_bool(&child.name, "advanced", &child.text(), false),
            "limitToOptions" => {
                parameter.limit_to_options = parse_bool(&child.name, "limitToOptions", &child.text(), true);
            }
            "multipleLimit" => {
                let raw = child.text();
                parameter.multiple_limit = Some(raw.parse().map_err(|_| invalid(child, "multipleLimit", &raw))?);
            }
            "unitLabel" => parameter.unit_label = child.non_empty_text(),
            "options" => parameter.options = parse_options(child)?,
            other => {
                return Err(ConversionError::UnexpectedChild {
                    parent: element.name.clone(),
                    child: other.to_string(),
                });
            }
        }
    }
    Ok(parameter)
}

fn parse_group(element: &Element) -> Result<ParameterGroup, ConversionError> {
    element.check_attributes(&[("name", true)])?;
    let mut group = ParameterGroup {
        name: element.required_attribute("name")?.to_string(),
        ..ParameterGroup::default()
    };
    ensure_no_text(element)?;
    for child in element.elements() {
        match child.name.as_str() {
            "label" => group.label = child.non_empty_text(),
            "description" => group.description = child.non_empty_text(),
            "context" => group.context = child.non_empty_text(),
            "advanced" => group.advanced = parse_bool(&child.name, "advanced", &child.text(), false),
            other => {
                return Err(ConversionError::UnexpectedChild {
                    parent: element.name.clone(),
                    child: other.to_string(),
                });
            }
        }
    }
    Ok(group)
}

/// Convert a `<config-description>` element.
///
/// Inline descriptions may omit `uri` (the resolver derives one from the
/// owning type); the URI is then empty.
///
/// # Errors
///
/// The first [`ConversionError`] found in the element or its parameters.
pub fn parse_config_description(element: &Element, uri_required: bool) -> Result<ConfigDescription, ConversionError> {
    element.check_attributes(&[("uri", uri_required)])?;
    let uri = element.attribute("uri").unwrap_or_default();
    let mut builder = ConfigDescription::builder(uri);
    ensure_no_text(element)?;
    for child in element.elements() {
        builder = match child.name.as_str() {
            "parameter" => builder.parameter(parse_parameter(child)?),
            "parameter-group" => builder.group(parse_group(child)?),
            other => {
                return Err(ConversionError::UnexpectedChild {
                    parent: element.name.clone(),
                    child: other.to_string(),
                });
            }
        };
    }
    Ok(builder.build())
}

pub(crate) fn parse_config_root(document: &str, root: &Element) -> Result<ParsedConfigDocument, DescriptorError> {
    root.check_attributes(&[("schemaLocation", false)])
        .map_err(|source| DescriptorError::Root {
            document: document.to_string(),
            source,
        })?;

    let mut parsed = ParsedConfigDocument {
        descriptions: Vec::new(),
        errors: Vec::new(),
    };
    for child in root.elements() {
        let result = if child.name == "config-description" {
            parse_config_description(child, true)
        } else {
            Err(ConversionError::UnexpectedChild {
                parent: root.name.clone(),
                child: child.name.clone(),
            })
        };
        match result {
            Ok(description) => parsed.descriptions.push(description),
            Err(source) => {
                tracing::warn!(document, element = %child.name, error = %source, "config description skipped");
                parsed.errors.push(DeclarationError {
                    kind: child.name.clone(),
                    id: child.attribute("uri").unwrap_or("?").to_string(),
                    source,
                });
            }
        }
    }
    Ok(parsed)
}

/// Parse a `<config-descriptions>` document.
///
/// # Errors
///
/// [`DescriptorError`] when the document is malformed or has another root;
/// invalid descriptions are reported in [`ParsedConfigDocument::errors`].
pub fn parse_config_document(document: &str, text: &str) -> Result<ParsedConfigDocument, DescriptorError> {
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
    parse_config_root(document, &root)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<config-descriptions>
    <config-description uri="thing-type:acme:sensor">
        <parameter-group name="connection">
            <label>Connection</label>
        </parameter-group>
        <parameter name="host" type="text" required="true" groupName="connection">
            <label>Host</label>
            <context>network-address</context>
        </parameter>
        <parameter name="refresh" type="integer" min="1" max="3600" unit="s">
            <label>Refresh interval</label>
            <default>60</default>
            <advanced>true</advanced>
        </parameter>
        <parameter name="mode" type="text">
            <options>
                <option value="eco">Eco</option>
                <option value="boost">Boost</option>
            </options>
            <limitToOptions>false</limitToOptions>
        </parameter>
    </config-description>
    <config-description uri="channel-type:acme:broken">
        <parameter name="x" type="colour"/>
    </config-description>
</config-descriptions>"#;

    #[test]
    fn should_parse_parameters_and_groups() {
        let parsed = parse_config_document("acme.xml", DOCUMENT).unwrap();

        assert_eq!(parsed.descriptions.len(), 1);
        let description = &parsed.descriptions[0];
        assert_eq!(description.uri, "thing-type:acme:sensor");
        assert_eq!(description.groups[0].label.as_deref(), Some("Connection"));

        let host = description.parameter("host").unwrap();
        assert!(host.required);
        assert_eq!(host.context.as_deref(), Some("network-address"));
        assert_eq!(host.group_name.as_deref(), Some("connection"));

        let refresh = description.parameter("refresh").unwrap();
        assert_eq!(refresh.parameter_type, ParameterType::Integer);
        assert_eq!(refresh.min, Some(1.0));
        assert_eq!(refresh.default.as_deref(), Some("60"));
        assert!(refresh.advanced);

        let mode = description.parameter("mode").unwrap();
        assert_eq!(mode.options.len(), 2);
        assert_eq!(mode.options[1].label, "Boost");
        assert!(!mode.limit_to_options);
    }

    #[test]
    fn should_report_invalid_description_and_keep_the_others() {
        let parsed = parse_config_document("acme.xml", DOCUMENT).unwrap();

        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].id, "channel-type:acme:broken");
        assert!(matches!(
            parsed.errors[0].source,
            ConversionError::InvalidValue { field: "type", .. }
        ));
    }

    #[test]
    fn should_require_uri_at_document_level() {
        let parsed = parse_config_document(
            "acme.xml",
            "<config-descriptions><config-description/></config-descriptions>",
        )
        .unwrap();

        assert!(matches!(
            parsed.errors[0].source,
            ConversionError::MissingAttribute { attribute: "uri", .. }
        ));
    }

    #[test]
    fn should_reject_unknown_parameter_child() {
        let element = Element::parse(
            r#"<config-description><parameter name="a" type="text"><colour/></parameter></config-description>"#,
        )
        .unwrap();

        let result = parse_config_description(&element, false);

        assert!(matches!(result, Err(ConversionError::UnexpectedChild { ref child, .. }) if child == "colour"));
    }

    #[test]
    fn should_reject_other_root() {
        let result = parse_config_document("acme.xml", "<thing-descriptions bindingId=\"acme\"/>");
        assert!(matches!(result, Err(DescriptorError::UnexpectedRoot { .. })));
    }
}
