//! # smarthome-adapter-xml
//!
//! Descriptor adapter: reads the XML documents a binding ships and turns
//! them into thing types, channel types, channel group types and config
//! descriptions.
//!
//! ## How it works
//!
//! 1. A [`DescriptorSource`] lists modules and hands out their documents
//!    (`ESH-INF/thing/*.xml`, `ESH-INF/config/*.xml`,
//!    `ESH-INF/i18n/*.properties`).
//! 2. Each document is parsed into intermediate records ([`model`]). A
//!    broken declaration is reported and skipped; its siblings survive.
//! 3. Records are resolved against the document's `bindingId` into typed
//!    definitions (`system.*` channel type references land in the `system`
//!    binding).
//! 4. The [`DescriptorTracker`] contributes the definitions and translation
//!    bundles to module-scoped providers, and withdraws them when the module
//!    goes away.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `smarthome-app` and `smarthome-domain`.
//! `roxmltree` types never leave this crate except as error sources.

mod config;
mod cursor;
mod error;
pub mod model;
mod node;
mod parser;
mod properties;
mod resolve;
mod source;
mod tracker;

pub use config::parse_config_document;
pub use error::{ConversionError, DeclarationError, DescriptorError, ResolutionError};
pub use parser::{Descriptor, parse_document};
pub use properties::{PropertiesError, bundle_locale, parse_properties};
pub use resolve::{
    ResolvedDocument, ResolvedType, resolve_channel_group_type, resolve_channel_type,
    resolve_channel_type_uid, resolve_document, resolve_thing_type,
};
pub use source::{
    DescriptorSource, DirectoryDescriptorSource, ModuleDocuments, NamedDocument,
    StaticDescriptorSource,
};
pub use tracker::{DescriptorTracker, ModuleIssue, ModuleReport, TypeProviders};
