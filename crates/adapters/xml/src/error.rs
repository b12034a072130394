//! Descriptor adapter error types.

use smarthome_domain::error::UidError;

/// A descriptor element does not have the expected shape.
///
/// Every variant names the element (and attribute or child) involved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// A required attribute is absent.
    #[error("<{element}> requires attribute '{attribute}'")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    /// An attribute the element does not declare.
    #[error("<{element}> does not accept attribute '{attribute}'")]
    UnexpectedAttribute { element: String, attribute: String },

    /// A required child element is absent (or out of sequence).
    #[error("<{parent}> requires child <{element}>")]
    MissingElement { parent: String, element: String },

    /// Children remain after the element's sequence was consumed, or text
    /// appears where only elements are allowed.
    #[error("unexpected trailing content in <{element}>: {found}")]
    UnexpectedContent { element: String, found: String },

    /// A container holds a child of the wrong kind.
    #[error("<{parent}> may not contain <{child}>")]
    UnexpectedChild { parent: String, child: String },

    /// A property name appears twice in one `<properties>` block.
    #[error("duplicate property '{name}'")]
    DuplicateProperty { name: String },

    /// Both an inline config description and a reference are present.
    #[error("<{element}> declares both config-description and config-description-ref")]
    DuplicateConfigDescription { element: String },

    /// A value cannot be converted to the expected type.
    #[error("<{element}> has invalid {field} '{value}'")]
    InvalidValue {
        element: String,
        field: &'static str,
        value: String,
    },
}

/// One top-level declaration of a document could not be converted; its
/// siblings are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} '{id}'")]
pub struct DeclarationError {
    /// Element name of the declaration (`thing-type`, `channel-type`, …).
    pub kind: String,
    /// Its `id` (or `uri`) attribute, or `?` when absent.
    pub id: String,
    #[source]
    pub source: ConversionError,
}

/// A parsed record cannot be turned into a typed definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// A channel or channel group reference without `typeId`.
    #[error("{element} '{id}' of '{owner}' has no typeId")]
    MissingTypeId {
        element: &'static str,
        id: String,
        owner: String,
    },

    /// An identifier is not a valid UID segment.
    #[error("invalid identifier in '{id}'")]
    Uid {
        id: String,
        #[source]
        source: UidError,
    },
}

/// A whole descriptor document (or module) could not be read.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// The document is not well-formed XML.
    #[error("malformed XML in {document}")]
    Xml {
        document: String,
        #[source]
        source: roxmltree::Error,
    },

    /// The root element is not one this adapter reads.
    #[error("unexpected root <{found}> in {document}")]
    UnexpectedRoot { document: String, found: String },

    /// The root element itself is invalid.
    #[error("invalid root element in {document}")]
    Root {
        document: String,
        #[source]
        source: ConversionError,
    },

    /// A translation file is invalid.
    #[error("invalid translation file {document} at line {line}")]
    Properties { document: String, line: usize },

    /// Reading from the module source failed.
    #[error("cannot read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The module is not known to the source.
    #[error("unknown module '{0}'")]
    UnknownModule(String),
}
