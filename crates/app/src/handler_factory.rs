//! Handler factories: bind things to handler instances.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use smarthome_domain::config::Configuration;
use smarthome_domain::error::ThingError;
use smarthome_domain::thing::Thing;
use smarthome_domain::uid::{ThingTypeUID, ThingUID};

use crate::handler::ThingHandler;
use crate::lock;
use crate::ports::ThingHandlerCallback;
use crate::registry::ThingTypeRegistry;
use crate::thing_factory::ThingFactory;

/// Bookkeeping every factory needs: the handlers it published and the
/// collaborators used to create things.
pub struct HandlerFactoryCore {
    handlers: Mutex<HashMap<ThingUID, Arc<dyn ThingHandler>>>,
    thing_types: Arc<ThingTypeRegistry>,
    thing_factory: Arc<ThingFactory>,
}

impl HandlerFactoryCore {
    #[must_use]
    pub fn new(thing_types: Arc<ThingTypeRegistry>, thing_factory: Arc<ThingFactory>) -> Self {
        Self {
            handlers: Mutex::new(HashMap::new()),
            thing_types,
            thing_factory,
        }
    }

    fn publish(&self, uid: ThingUID, handler: Arc<dyn ThingHandler>) {
        lock(&self.handlers).insert(uid, handler);
    }

    fn take(&self, uid: &ThingUID) -> Option<Arc<dyn ThingHandler>> {
        lock(&self.handlers).remove(uid)
    }

    #[must_use]
    pub fn handler(&self, uid: &ThingUID) -> Option<Arc<dyn ThingHandler>> {
        lock(&self.handlers).get(uid).cloned()
    }

    #[must_use]
    pub fn handler_count(&self) -> usize {
        lock(&self.handlers).len()
    }

    #[must_use]
    pub fn thing_types(&self) -> &Arc<ThingTypeRegistry> {
        &self.thing_types
    }
}

/// Creates handlers for the thing types of one binding.
pub trait ThingHandlerFactory: Send + Sync {
    fn core(&self) -> &HandlerFactoryCore;

    fn supports_thing_type(&self, thing_type_uid: &ThingTypeUID) -> bool;

    /// Construct (but do not initialize) a handler for `thing`.
    ///
    /// # Errors
    ///
    /// Returns an error when no handler can be built for this thing.
    fn create_handler(&self, thing: Thing) -> Result<Arc<dyn ThingHandler>, ThingError>;

    /// Hook invoked before a published handler is disposed.
    fn remove_handler(&self, _handler: &Arc<dyn ThingHandler>) {}

    /// Construct a handler, attach `callback`, initialize it, and publish it
    /// under the thing's UID.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::HandlerRegistration`] when construction fails;
    /// nothing is published then.
    fn register_handler(
        &self,
        thing: Thing,
        callback: Arc<dyn ThingHandlerCallback>,
    ) -> Result<Arc<dyn ThingHandler>, ThingError> {
        let uid = thing.uid().clone();
        let handler = self
            .create_handler(thing)
            .map_err(|err| ThingError::HandlerRegistration {
                thing: uid.to_string(),
                source: Box::new(err),
            })?;
        handler.set_callback(Some(callback));
        handler.initialize();
        self.core().publish(uid, Arc::clone(&handler));
        Ok(handler)
    }

    /// Withdraw, dispose, and detach the handler of `uid`. Unknown UIDs are
    /// ignored.
    fn unregister_handler(&self, uid: &ThingUID) -> Option<Arc<dyn ThingHandler>> {
        let handler = self.core().take(uid)?;
        self.remove_handler(&handler);
        handler.dispose();
        handler.set_callback(None);
        Some(handler)
    }

    /// Create a thing of a registered type; `None` when the type is unknown.
    fn create_thing(
        &self,
        thing_type_uid: &ThingTypeUID,
        configuration: Configuration,
        thing_uid: Option<ThingUID>,
        bridge_uid: Option<ThingUID>,
    ) -> Option<Thing> {
        let core = self.core();
        let thing_type = core.thing_types.get(thing_type_uid, None)?;
        Some(
            core.thing_factory
                .create_thing(&thing_type, configuration, thing_uid, bridge_uid),
        )
    }

    fn handler(&self, uid: &ThingUID) -> Option<Arc<dyn ThingHandler>> {
        self.core().handler(uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use smarthome_domain::command::{Command, State};
    use smarthome_domain::error::ConfigValidationError;
    use smarthome_domain::thing::{ThingStatus, ThingStatusInfo};
    use smarthome_domain::types::ThingType;
    use smarthome_domain::uid::ChannelUID;

    use crate::handler::BaseThingHandler;
    use crate::module::ModuleId;
    use crate::registry::{
        ChannelGroupTypeRegistry, ChannelTypeRegistry, ConfigDescriptionRegistry,
        ModuleTypeProvider,
    };

    struct NullCallback;

    impl ThingHandlerCallback for NullCallback {
        fn state_updated(&self, _: &ChannelUID, _: State) {}
        fn post_command(&self, _: &ChannelUID, _: Command) {}
        fn channel_triggered(&self, _: &Thing, _: &ChannelUID, _: &str) {}
        fn status_updated(&self, _: &Thing, _: ThingStatusInfo) {}
        fn thing_updated(&self, _: &Thing) -> Result<(), ThingError> {
            Ok(())
        }
        fn validate_configuration_parameters(
            &self,
            _: &Thing,
            _: &Configuration,
        ) -> Result<(), ConfigValidationError> {
            Ok(())
        }
        fn bridge(&self, _: &ThingUID) -> Option<Thing> {
            None
        }
    }

    struct EchoHandler {
        base: BaseThingHandler,
        disposed: AtomicBool,
    }

    impl ThingHandler for EchoHandler {
        fn base(&self) -> &BaseThingHandler {
            &self.base
        }

        fn initialize(&self) {
            self.base.update_status(ThingStatus::Online).unwrap();
        }

        fn handle_command(&self, _: &ChannelUID, _: Command) {}

        fn dispose(&self) {
            self.disposed.store(true, Ordering::SeqCst);
        }
    }

    struct EchoFactory {
        core: HandlerFactoryCore,
        removed: AtomicBool,
    }

    impl ThingHandlerFactory for EchoFactory {
        fn core(&self) -> &HandlerFactoryCore {
            &self.core
        }

        fn supports_thing_type(&self, thing_type_uid: &ThingTypeUID) -> bool {
            thing_type_uid.binding_id() == "acme"
        }

        fn create_handler(&self, thing: Thing) -> Result<Arc<dyn ThingHandler>, ThingError> {
            if thing.uid().id() == "broken" {
                return Err(ThingError::InvalidArgument("cannot drive this".to_string()));
            }
            Ok(Arc::new(EchoHandler {
                base: BaseThingHandler::new(thing),
                disposed: AtomicBool::new(false),
            }))
        }

        fn remove_handler(&self, _handler: &Arc<dyn ThingHandler>) {
            self.removed.store(true, Ordering::SeqCst);
        }
    }

    fn factory() -> EchoFactory {
        let thing_types = Arc::new(ThingTypeRegistry::new());
        let provider: Arc<ModuleTypeProvider<ThingType>> = Arc::new(ModuleTypeProvider::new());
        provider
            .add(
                &ModuleId::new("acme"),
                ThingType::builder("acme:sensor".parse().unwrap(), "Sensor").build(),
            )
            .unwrap();
        thing_types.add_provider(provider);
        let thing_factory = Arc::new(ThingFactory::new(
            Arc::new(ChannelTypeRegistry::new()),
            Arc::new(ChannelGroupTypeRegistry::new()),
            Arc::new(ConfigDescriptionRegistry::new()),
        ));
        EchoFactory {
            core: HandlerFactoryCore::new(thing_types, thing_factory),
            removed: AtomicBool::new(false),
        }
    }

    fn thing(id: &str) -> Thing {
        let type_uid: ThingTypeUID = "acme:sensor".parse().unwrap();
        let uid = ThingUID::new(&type_uid, id).unwrap();
        Thing::builder(type_uid, uid).build()
    }

    #[test]
    fn should_initialize_and_publish_registered_handler() {
        let factory = factory();

        let handler = factory
            .register_handler(thing("dev1"), Arc::new(NullCallback))
            .unwrap();

        assert_eq!(handler.thing().status(), ThingStatus::Online);
        assert!(factory.handler(&"acme:sensor:dev1".parse().unwrap()).is_some());
    }

    #[test]
    fn should_report_construction_failure_without_publishing() {
        let factory = factory();

        let result = factory.register_handler(thing("broken"), Arc::new(NullCallback));

        assert!(matches!(result, Err(ThingError::HandlerRegistration { .. })));
        assert_eq!(factory.core().handler_count(), 0);
    }

    #[test]
    fn should_dispose_and_detach_on_unregister() {
        let factory = factory();
        let uid: ThingUID = "acme:sensor:dev1".parse().unwrap();
        factory
            .register_handler(thing("dev1"), Arc::new(NullCallback))
            .unwrap();

        let handler = factory.unregister_handler(&uid).unwrap();

        assert!(factory.removed.load(Ordering::SeqCst));
        assert!(!handler.base().has_callback());
        assert!(factory.handler(&uid).is_none());
    }

    #[test]
    fn should_ignore_unregister_of_unknown_thing() {
        let factory = factory();
        assert!(factory.unregister_handler(&"acme:sensor:nope".parse().unwrap()).is_none());
        assert!(!factory.removed.load(Ordering::SeqCst));
    }

    #[test]
    fn should_create_thing_of_known_type_only() {
        let factory = factory();
        let uid: ThingUID = "acme:sensor:dev9".parse().unwrap();

        let created = factory.create_thing(
            &"acme:sensor".parse().unwrap(),
            Configuration::new(),
            Some(uid.clone()),
            None,
        );
        assert_eq!(created.map(|t| t.uid().clone()), Some(uid));

        let unknown = factory.create_thing(&"acme:ghost".parse().unwrap(), Configuration::new(), None, None);
        assert!(unknown.is_none());
    }
}
