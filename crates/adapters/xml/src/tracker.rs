//! Module tracker: loads what a module ships into the type providers, and
//! removes it again when the module goes away.

use std::sync::Arc;

use smarthome_app::error::RegistryError;
use smarthome_app::module::ModuleId;
use smarthome_app::registry::{ModuleTypeProvider, StaticTranslations};
use smarthome_domain::config::ConfigDescription;
use smarthome_domain::types::{ChannelGroupType, ChannelType, ThingType};

use crate::error::{DeclarationError, DescriptorError, ResolutionError};
use crate::parser::Descriptor;
use crate::properties::{bundle_locale, parse_properties};
use crate::resolve::{ResolvedType, resolve_document};
use crate::source::{DescriptorSource, NamedDocument};

/// The module-scoped providers a tracker contributes to.
#[derive(Clone, Default)]
pub struct TypeProviders {
    pub thing_types: Arc<ModuleTypeProvider<ThingType>>,
    pub channel_types: Arc<ModuleTypeProvider<ChannelType>>,
    pub channel_group_types: Arc<ModuleTypeProvider<ChannelGroupType>>,
    pub config_descriptions: Arc<ModuleTypeProvider<ConfigDescription>>,
    pub translations: Arc<StaticTranslations>,
}

/// Something in a module that could not be loaded. The rest of the module
/// still is.
#[derive(Debug, thiserror::Error)]
pub enum ModuleIssue {
    #[error("document rejected")]
    Document(#[source] DescriptorError),

    #[error("declaration rejected in {document}")]
    Declaration {
        document: String,
        #[source]
        error: DeclarationError,
    },

    #[error("declaration not resolved in {document}")]
    Resolution {
        document: String,
        #[source]
        error: ResolutionError,
    },

    #[error("contribution rejected from {document}")]
    Registry {
        document: String,
        #[source]
        error: RegistryError,
    },
}

/// What [`DescriptorTracker::module_added`] loaded.
#[derive(Debug)]
pub struct ModuleReport {
    pub module: ModuleId,
    pub thing_types: usize,
    pub channel_types: usize,
    pub channel_group_types: usize,
    pub config_descriptions: usize,
    /// Translation bundles loaded.
    pub translations: usize,
    pub issues: Vec<ModuleIssue>,
}

impl ModuleReport {
    fn new(module: ModuleId) -> Self {
        Self {
            module,
            thing_types: 0,
            channel_types: 0,
            channel_group_types: 0,
            config_descriptions: 0,
            translations: 0,
            issues: Vec::new(),
        }
    }

    /// Whether everything the module ships was loaded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Loads and unloads modules into a set of [`TypeProviders`].
pub struct DescriptorTracker {
    providers: TypeProviders,
}

impl DescriptorTracker {
    #[must_use]
    pub fn new(providers: TypeProviders) -> Self {
        Self { providers }
    }

    #[must_use]
    pub fn providers(&self) -> &TypeProviders {
        &self.providers
    }

    /// Parse, resolve and contribute every document of `module`.
    ///
    /// Broken documents, declarations and contributions are collected in
    /// the report; their siblings are loaded regardless.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError`] only when the module's documents cannot
    /// be read at all.
    #[tracing::instrument(skip_all, fields(module = %module))]
    pub async fn module_added<S: DescriptorSource>(
        &self,
        source: &S,
        module: &ModuleId,
    ) -> Result<ModuleReport, DescriptorError> {
        let documents = source.read_documents(module).await?;
        let mut report = ModuleReport::new(module.clone());
        for document in &documents.descriptors {
            self.load_descriptor(module, document, &mut report);
        }
        for bundle in &documents.translations {
            self.load_translations(module, bundle, &mut report);
        }

        for issue in &report.issues {
            tracing::warn!(error = %issue, cause = ?std::error::Error::source(issue).map(ToString::to_string), "module issue");
        }
        tracing::info!(
            thing_types = report.thing_types,
            channel_types = report.channel_types,
            channel_group_types = report.channel_group_types,
            config_descriptions = report.config_descriptions,
            translations = report.translations,
            issues = report.issues.len(),
            "module loaded"
        );
        Ok(report)
    }

    fn load_descriptor(&self, module: &ModuleId, document: &NamedDocument, report: &mut ModuleReport) {
        match Descriptor::parse(&document.name, &document.content) {
            Err(err) => report.issues.push(ModuleIssue::Document(err)),
            Ok(Descriptor::Configs(parsed)) => {
                report
                    .issues
                    .extend(parsed.errors.into_iter().map(|error| ModuleIssue::Declaration {
                        document: document.name.clone(),
                        error,
                    }));
                for description in parsed.descriptions {
                    self.add_config_description(module, &document.name, description, report);
                }
            }
            Ok(Descriptor::Things(parsed)) => {
                let resolved = resolve_document(&parsed);
                report
                    .issues
                    .extend(parsed.errors.into_iter().map(|error| ModuleIssue::Declaration {
                        document: document.name.clone(),
                        error,
                    }));
                report
                    .issues
                    .extend(resolved.errors.into_iter().map(|error| ModuleIssue::Resolution {
                        document: document.name.clone(),
                        error,
                    }));
                for definition in resolved.types {
                    self.add_resolved(module, &document.name, definition, report);
                }
            }
        }
    }

    fn add_resolved(&self, module: &ModuleId, document: &str, definition: ResolvedType, report: &mut ModuleReport) {
        let registry_issue = |error| ModuleIssue::Registry {
            document: document.to_string(),
            error,
        };
        match definition {
            ResolvedType::ThingType {
                thing_type,
                config_description,
            } => {
                match self.providers.thing_types.add(module, thing_type) {
                    Ok(()) => report.thing_types += 1,
                    Err(err) => report.issues.push(registry_issue(err)),
                }
                if let Some(description) = config_description {
                    self.add_config_description(module, document, description, report);
                }
            }
            ResolvedType::ChannelType {
                channel_type,
                config_description,
            } => {
                match self.providers.channel_types.add(module, channel_type) {
                    Ok(()) => report.channel_types += 1,
                    Err(err) => report.issues.push(registry_issue(err)),
                }
                if let Some(description) = config_description {
                    self.add_config_description(module, document, description, report);
                }
            }
            ResolvedType::ChannelGroupType(group_type) => {
                match self.providers.channel_group_types.add(module, group_type) {
                    Ok(()) => report.channel_group_types += 1,
                    Err(err) => report.issues.push(registry_issue(err)),
                }
            }
        }
    }

    fn add_config_description(
        &self,
        module: &ModuleId,
        document: &str,
        description: ConfigDescription,
        report: &mut ModuleReport,
    ) {
        match self.providers.config_descriptions.add(module, description) {
            Ok(()) => report.config_descriptions += 1,
            Err(error) => report.issues.push(ModuleIssue::Registry {
                document: document.to_string(),
                error,
            }),
        }
    }

    fn load_translations(&self, module: &ModuleId, bundle: &NamedDocument, report: &mut ModuleReport) {
        let Some(locale) = bundle_locale(&bundle.name) else {
            tracing::debug!(bundle = %bundle.name, "bundle without locale suffix skipped");
            return;
        };
        match parse_properties(&bundle.content) {
            Ok(entries) => {
                self.providers.translations.add(module, &locale, entries);
                report.translations += 1;
            }
            Err(err) => report.issues.push(ModuleIssue::Document(DescriptorError::Properties {
                document: bundle.name.clone(),
                line: err.line,
            })),
        }
    }

    /// Withdraw everything `module` contributed. Returns the number of
    /// types and config descriptions removed.
    #[tracing::instrument(skip_all, fields(module = %module))]
    pub fn module_removed(&self, module: &ModuleId) -> usize {
        let removed = self.providers.thing_types.remove_module(module).len()
            + self.providers.channel_types.remove_module(module).len()
            + self.providers.channel_group_types.remove_module(module).len()
            + self.providers.config_descriptions.remove_module(module).len();
        self.providers.translations.remove_module(module);
        tracing::info!(removed, "module unloaded");
        removed
    }
}
