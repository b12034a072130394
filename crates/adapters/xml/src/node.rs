//! Crate-owned element tree built from a tokenized document.
//!
//! Namespace prefixes are stripped, comments and whitespace-only text are
//! dropped, so converters only ever see local names and meaningful text.

use crate::error::ConversionError;

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// Attribute declared by an element kind: `(name, required)`.
pub type AttributeSpec = (&'static str, bool);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    /// Tokenize `text` and return its root element.
    ///
    /// # Errors
    ///
    /// Returns the tokenizer error for malformed XML.
    pub fn parse(text: &str) -> Result<Self, roxmltree::Error> {
        let document = roxmltree::Document::parse(text)?;
        Ok(Self::from_node(document.root_element()))
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let attributes = node
            .attributes()
            .map(|attribute| (attribute.name().to_string(), attribute.value().to_string()))
            .collect();
        let children = node
            .children()
            .filter_map(|child| {
                if child.is_element() {
                    Some(Node::Element(Self::from_node(child)))
                } else if child.is_text() {
                    child
                        .text()
                        .filter(|text| !text.trim().is_empty())
                        .map(|text| Node::Text(text.to_string()))
                } else {
                    None
                }
            })
            .collect();
        Self {
            name: node.tag_name().name().to_string(),
            attributes,
            children,
        }
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Element children, in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Concatenated text content, trimmed.
    #[must_use]
    pub fn text(&self) -> String {
        let mut text = String::new();
        for child in &self.children {
            if let Node::Text(part) = child {
                text.push_str(part);
            }
        }
        text.trim().to_string()
    }

    /// Text content, or `None` when empty.
    #[must_use]
    pub fn non_empty_text(&self) -> Option<String> {
        Some(self.text()).filter(|text| !text.is_empty())
    }

    /// Check the attributes against the element kind's declaration.
    ///
    /// # Errors
    ///
    /// [`ConversionError::MissingAttribute`] for an absent required
    /// attribute, [`ConversionError::UnexpectedAttribute`] for an undeclared
    /// one.
    pub fn check_attributes(&self, schema: &[AttributeSpec]) -> Result<(), ConversionError> {
        for (name, required) in schema {
            if *required && self.attribute(name).is_none() {
                return Err(ConversionError::MissingAttribute {
                    element: self.name.clone(),
                    attribute: name,
                });
            }
        }
        if let Some((name, _)) = self
            .attributes
            .iter()
            .find(|(name, _)| !schema.iter().any(|(declared, _)| declared == name))
        {
            return Err(ConversionError::UnexpectedAttribute {
                element: self.name.clone(),
                attribute: name.clone(),
            });
        }
        Ok(())
    }

    /// # Errors
    ///
    /// [`ConversionError::MissingAttribute`] when absent.
    pub fn required_attribute(&self, name: &'static str) -> Result<&str, ConversionError> {
        self.attribute(name).ok_or_else(|| ConversionError::MissingAttribute {
            element: self.name.clone(),
            attribute: name,
        })
    }

    /// Boolean attribute, `default` when absent or not a literal.
    #[must_use]
    pub fn bool_attribute(&self, name: &'static str, default: bool) -> bool {
        self.attribute(name)
            .map_or(default, |raw| parse_bool(&self.name, name, raw, default))
    }

    /// Decimal attribute.
    ///
    /// # Errors
    ///
    /// [`ConversionError::InvalidValue`] when present but not a number.
    pub fn decimal_attribute(&self, name: &'static str) -> Result<Option<f64>, ConversionError> {
        self.attribute(name)
            .map(|raw| {
                raw.trim().parse().map_err(|_| ConversionError::InvalidValue {
                    element: self.name.clone(),
                    field: name,
                    value: raw.to_string(),
                })
            })
            .transpose()
    }
}

/// Parse a case-sensitive `true`/`false` literal; anything else is logged
/// and replaced by `default`.
#[must_use]
pub fn parse_bool(element: &str, field: &str, raw: &str, default: bool) -> bool {
    match raw.trim().parse::<bool>() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(element, field, value = raw, default, "not a boolean literal, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_strip_namespace_prefixes_and_blank_text() {
        let root = Element::parse(
            r#"<t:thing-descriptions xmlns:t="urn:things" t:bindingId="acme">
                <!-- comment -->
                <t:thing-type id="sensor"/>
            </t:thing-descriptions>"#,
        )
        .unwrap();

        assert_eq!(root.name, "thing-descriptions");
        assert_eq!(root.attribute("bindingId"), Some("acme"));
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.elements().next().unwrap().name, "thing-type");
    }

    #[test]
    fn should_reject_malformed_document() {
        assert!(Element::parse("<thing-descriptions>").is_err());
    }

    #[test]
    fn should_trim_text_content() {
        let element = Element::parse("<label>  Outdoor sensor \n</label>").unwrap();
        assert_eq!(element.text(), "Outdoor sensor");
    }

    #[test]
    fn should_report_missing_required_attribute() {
        let element = Element::parse(r#"<channel typeId="power"/>"#).unwrap();

        let result = element.check_attributes(&[("id", true), ("typeId", false)]);

        assert_eq!(
            result,
            Err(ConversionError::MissingAttribute {
                element: "channel".to_string(),
                attribute: "id",
            })
        );
    }

    #[test]
    fn should_report_undeclared_attribute() {
        let element = Element::parse(r#"<channel id="a" colour="red"/>"#).unwrap();

        let result = element.check_attributes(&[("id", true), ("typeId", false)]);

        assert!(matches!(
            result,
            Err(ConversionError::UnexpectedAttribute { ref attribute, .. }) if attribute == "colour"
        ));
    }

    #[test]
    fn should_fall_back_to_default_for_non_literal_boolean() {
        let element = Element::parse(r#"<thing-type id="a" listed="yes" advanced="TRUE"/>"#).unwrap();

        assert!(element.bool_attribute("listed", true));
        assert!(!element.bool_attribute("advanced", false));
        assert!(!element.bool_attribute("missing", false));
    }

    #[test]
    fn should_parse_decimal_attribute() {
        let element = Element::parse(r#"<state min="0.5" max="ten"/>"#).unwrap();

        assert_eq!(element.decimal_attribute("min"), Ok(Some(0.5)));
        assert_eq!(element.decimal_attribute("step"), Ok(None));
        assert!(element.decimal_attribute("max").is_err());
    }
}
