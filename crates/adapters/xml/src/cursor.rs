//! Sequential consumption of an element's children.
//!
//! Descriptor elements have a fixed child order. A [`ChildCursor`] walks the
//! children once: optional children that are absent are skipped, required
//! ones must be next in line, and [`ChildCursor::finish`] rejects whatever
//! was not consumed.

use crate::error::ConversionError;
use crate::node::{Element, Node};

/// Fail when `element` holds text next to (or instead of) child elements.
///
/// # Errors
///
/// [`ConversionError::UnexpectedContent`] naming the stray text.
pub fn ensure_no_text(element: &Element) -> Result<(), ConversionError> {
    match element.children.iter().find_map(|child| match child {
        Node::Text(text) => Some(text),
        Node::Element(_) => None,
    }) {
        Some(text) => Err(ConversionError::UnexpectedContent {
            element: element.name.clone(),
            found: text.trim().to_string(),
        }),
        None => Ok(()),
    }
}

pub struct ChildCursor<'a> {
    parent: &'a Element,
    children: Vec<&'a Element>,
    position: usize,
}

impl<'a> ChildCursor<'a> {
    /// # Errors
    ///
    /// [`ConversionError::UnexpectedContent`] when the parent holds text
    /// next to its children.
    pub fn new(parent: &'a Element) -> Result<Self, ConversionError> {
        ensure_no_text(parent)?;
        Ok(Self {
            parent,
            children: parent.elements().collect(),
            position: 0,
        })
    }

    /// Consume the next child if it is named `name`.
    ///
    /// # Errors
    ///
    /// [`ConversionError::MissingElement`] when `required` and the next
    /// child has another name.
    pub fn next(&mut self, name: &str, required: bool) -> Result<Option<&'a Element>, ConversionError> {
        self.next_of(&[name], required)
    }

    /// Consume the next child if its name is one of `names`.
    ///
    /// # Errors
    ///
    /// [`ConversionError::MissingElement`] when `required` and the next
    /// child matches none of them.
    pub fn next_of(&mut self, names: &[&str], required: bool) -> Result<Option<&'a Element>, ConversionError> {
        match self.children.get(self.position) {
            Some(child) if names.contains(&child.name.as_str()) => {
                self.position += 1;
                Ok(Some(*child))
            }
            _ if required => Err(ConversionError::MissingElement {
                parent: self.parent.name.clone(),
                element: names.join("|"),
            }),
            _ => Ok(None),
        }
    }

    /// Text of the next child named `name`, if present.
    ///
    /// # Errors
    ///
    /// Same as [`next`](Self::next).
    pub fn text(&mut self, name: &str, required: bool) -> Result<Option<String>, ConversionError> {
        Ok(self.next(name, required)?.map(Element::text))
    }

    /// # Errors
    ///
    /// [`ConversionError::UnexpectedContent`] if any child is left.
    pub fn finish(self) -> Result<(), ConversionError> {
        match self.children.get(self.position) {
            Some(child) => Err(ConversionError::UnexpectedContent {
                element: self.parent.name.clone(),
                found: format!("<{}>", child.name),
            }),
            None => Ok(()),
        }
    }
}
