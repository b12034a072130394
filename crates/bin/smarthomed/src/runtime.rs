//! Wiring: registries, descriptor modules, bindings, and the thing manager.

use std::sync::Arc;

use smarthome_adapter_xml::{
    DescriptorError, DescriptorSource, DescriptorTracker, DirectoryDescriptorSource, ModuleReport,
    TypeProviders,
};
use smarthome_app::event_bus::InProcessEventBus;
use smarthome_app::handler::Scheduler;
use smarthome_app::handler_factory::ThingHandlerFactory;
use smarthome_app::module::ModuleId;
use smarthome_app::registry::{
    ChannelGroupTypeRegistry, ChannelTypeRegistry, ConfigDescriptionRegistry, ModuleTypeProvider,
    StaticTranslations, SystemChannelTypeProvider, ThingTypeRegistry,
};
use smarthome_app::thing_factory::ThingFactory;
use smarthome_app::thing_manager::ThingManager;
use smarthome_binding_virtual::VirtualHandlerFactory;
use smarthome_domain::error::ThingError;
use smarthome_domain::event::Event;
use smarthome_domain::i18n::Locale;
use smarthome_domain::thing::Thing;
use smarthome_domain::uid::ThingUID;
use tokio::sync::broadcast;

use crate::config::{Config, ConfigError, ThingConfig};

/// Errors while starting the runtime or creating things.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot load descriptor modules")]
    Descriptors(#[from] DescriptorError),

    #[error("thing type '{0}' is unknown")]
    UnknownThingType(String),

    #[error("cannot add thing '{uid}'")]
    Thing {
        uid: String,
        #[source]
        source: ThingError,
    },

    #[error("the runtime must be started from within a tokio runtime")]
    NoAsyncRuntime,
}

/// Every type registry, fed by the module providers and the system
/// channel types.
pub struct Registries {
    pub thing_types: Arc<ThingTypeRegistry>,
    pub channel_types: Arc<ChannelTypeRegistry>,
    pub channel_group_types: Arc<ChannelGroupTypeRegistry>,
    pub config_descriptions: Arc<ConfigDescriptionRegistry>,
}

impl Registries {
    fn new(providers: &TypeProviders) -> Self {
        let thing_types = Arc::new(ThingTypeRegistry::new());
        thing_types.add_provider(providers.thing_types.clone());

        let channel_types = Arc::new(ChannelTypeRegistry::new());
        channel_types.add_provider(Arc::new(
            SystemChannelTypeProvider::new().with_translations(providers.translations.clone()),
        ));
        channel_types.add_provider(providers.channel_types.clone());

        let channel_group_types = Arc::new(ChannelGroupTypeRegistry::new());
        channel_group_types.add_provider(providers.channel_group_types.clone());

        let config_descriptions = Arc::new(ConfigDescriptionRegistry::new());
        config_descriptions.add_provider(providers.config_descriptions.clone());

        Self {
            thing_types,
            channel_types,
            channel_group_types,
            config_descriptions,
        }
    }
}

/// The running system.
pub struct Runtime {
    registries: Registries,
    tracker: DescriptorTracker,
    modules: Vec<ModuleId>,
    bus: Arc<InProcessEventBus>,
    manager: Arc<ThingManager>,
    thing_factory: Arc<ThingFactory>,
    factories: Vec<Arc<dyn ThingHandlerFactory>>,
    locale: Option<Locale>,
}

fn module_providers(translations: &Arc<StaticTranslations>) -> TypeProviders {
    TypeProviders {
        thing_types: Arc::new(ModuleTypeProvider::new().with_translations(translations.clone())),
        channel_types: Arc::new(ModuleTypeProvider::new().with_translations(translations.clone())),
        channel_group_types: Arc::new(
            ModuleTypeProvider::new().with_translations(translations.clone()),
        ),
        config_descriptions: Arc::new(
            ModuleTypeProvider::new().with_translations(translations.clone()),
        ),
        translations: Arc::clone(translations),
    }
}

fn log_report(report: &ModuleReport) {
    if !report.is_clean() {
        tracing::warn!(
            module = %report.module,
            issues = report.issues.len(),
            "module loaded with issues"
        );
    }
}

impl Runtime {
    /// Load every enabled module, wire the registries and the thing manager,
    /// and register the enabled bindings' handler factories.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when the configuration is invalid, the
    /// addons directory cannot be listed, or no tokio runtime is running.
    #[tracing::instrument(skip_all)]
    pub async fn start(config: &Config) -> Result<Self, RuntimeError> {
        let locale = config.locale()?;
        let translations = Arc::new(StaticTranslations::default());
        let providers = module_providers(&translations);
        let registries = Registries::new(&providers);
        let tracker = DescriptorTracker::new(providers);
        let mut modules = Vec::new();

        if config.bindings.virtual_enabled {
            let module = smarthome_binding_virtual::module();
            let report = tracker
                .module_added(&smarthome_binding_virtual::descriptors(), &module)
                .await?;
            log_report(&report);
            modules.push(module);
        }
        if let Some(dir) = &config.addons.dir {
            let source = DirectoryDescriptorSource::new(dir);
            for module in source.modules().await? {
                match tracker.module_added(&source, &module).await {
                    Ok(report) => {
                        log_report(&report);
                        modules.push(module);
                    }
                    Err(err) => tracing::error!(%module, %err, "module skipped"),
                }
            }
        }

        let bus = Arc::new(InProcessEventBus::new(config.runtime.event_capacity));
        let manager = ThingManager::new(
            Arc::clone(&registries.thing_types),
            Arc::clone(&registries.config_descriptions),
            bus.clone(),
        );
        let thing_factory = Arc::new(ThingFactory::new(
            Arc::clone(&registries.channel_types),
            Arc::clone(&registries.channel_group_types),
            Arc::clone(&registries.config_descriptions),
        ));

        let mut factories: Vec<Arc<dyn ThingHandlerFactory>> = Vec::new();
        if config.bindings.virtual_enabled {
            let scheduler = Scheduler::current(smarthome_binding_virtual::BINDING_ID)
                .ok_or(RuntimeError::NoAsyncRuntime)?;
            factories.push(Arc::new(VirtualHandlerFactory::new(
                Arc::clone(&registries.thing_types),
                Arc::clone(&thing_factory),
                scheduler,
            )));
        }
        for factory in &factories {
            manager.add_handler_factory(Arc::clone(factory));
        }

        tracing::info!(
            modules = modules.len(),
            thing_types = registries.thing_types.get_all(None).len(),
            "runtime started"
        );
        Ok(Self {
            registries,
            tracker,
            modules,
            bus,
            manager,
            thing_factory,
            factories,
            locale,
        })
    }

    #[must_use]
    pub fn manager(&self) -> &Arc<ThingManager> {
        &self.manager
    }

    #[must_use]
    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    /// Modules whose descriptors were loaded.
    #[must_use]
    pub fn modules(&self) -> &[ModuleId] {
        &self.modules
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Build a thing from its configuration entry: channels and default
    /// configuration come from the thing type.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::UnknownThingType`] when no module provides
    /// the type, or a configuration error for malformed UIDs.
    pub fn build_thing(&self, entry: &ThingConfig) -> Result<Thing, RuntimeError> {
        let type_uid = entry.thing_type_uid()?;
        let thing_uid = entry.thing_uid()?;
        let bridge_uid = entry.bridge_uid()?;
        let configuration = entry.configuration()?;

        let created = match self
            .factories
            .iter()
            .find(|factory| factory.supports_thing_type(&type_uid))
        {
            Some(factory) => factory.create_thing(
                &type_uid,
                configuration,
                Some(thing_uid),
                bridge_uid,
            ),
            None => self
                .registries
                .thing_types
                .get(&type_uid, None)
                .map(|thing_type| {
                    self.thing_factory.create_thing(
                        &thing_type,
                        configuration,
                        Some(thing_uid),
                        bridge_uid,
                    )
                }),
        };
        let thing = created.ok_or_else(|| RuntimeError::UnknownThingType(type_uid.to_string()))?;

        let mut builder = thing.to_builder();
        if let Some(label) = &entry.label {
            builder = builder.label(label.clone());
        }
        if let Some(location) = &entry.location {
            builder = builder.location(location.clone());
        }
        Ok(builder.build())
    }

    /// Create and add every configured thing, bridges first.
    ///
    /// A thing that cannot be created is logged and skipped.
    #[tracing::instrument(skip_all, fields(count = entries.len()))]
    pub fn create_things(&self, entries: &[ThingConfig]) -> Vec<ThingUID> {
        let mut ordered: Vec<&ThingConfig> = entries.iter().collect();
        ordered.sort_by_key(|entry| entry.bridge.is_some());

        let mut added = Vec::new();
        for entry in ordered {
            let result = self.build_thing(entry).and_then(|thing| {
                let uid = thing.uid().clone();
                self.manager
                    .add_thing(thing)
                    .map(|()| uid)
                    .map_err(|source| RuntimeError::Thing {
                        uid: entry.uid.clone(),
                        source,
                    })
            });
            match result {
                Ok(uid) => {
                    self.log_thing(&uid);
                    added.push(uid);
                }
                Err(err) => tracing::error!(thing = %entry.uid, error = %err, "thing not created"),
            }
        }
        added
    }

    fn log_thing(&self, uid: &ThingUID) {
        let Some(thing) = self.manager.thing(uid) else {
            return;
        };
        let type_label = self
            .registries
            .thing_types
            .get(thing.thing_type_uid(), self.locale.as_ref())
            .map(|thing_type| thing_type.label);
        tracing::info!(
            thing = %uid,
            kind = type_label.as_deref().unwrap_or("?"),
            status = %thing.status_info(),
            "thing added"
        );
    }

    /// Remove every thing (children before their bridges), then withdraw
    /// the loaded modules.
    #[tracing::instrument(skip_all)]
    pub fn shutdown(&self) {
        let mut things = self.manager.things();
        things.sort_by_key(Thing::is_bridge);
        for thing in things {
            if let Err(err) = self.manager.remove_thing(thing.uid()) {
                tracing::warn!(thing = %thing.uid(), %err, "thing not removed");
            }
        }
        for factory in &self.factories {
            self.manager.remove_handler_factory(factory);
        }
        for module in &self.modules {
            self.tracker.module_removed(module);
        }
        tracing::info!(remaining = self.manager.things().len(), "runtime stopped");
    }
}
