//! Handler factory of the virtual binding.

use std::sync::Arc;

use smarthome_app::handler::{Scheduler, ThingHandler};
use smarthome_app::handler_factory::{HandlerFactoryCore, ThingHandlerFactory};
use smarthome_app::registry::ThingTypeRegistry;
use smarthome_app::thing_factory::ThingFactory;
use smarthome_domain::error::ThingError;
use smarthome_domain::thing::Thing;
use smarthome_domain::uid::ThingTypeUID;

use crate::BINDING_ID;
use crate::devices::{HubHandler, LightHandler, SensorHandler};

pub const HUB: &str = "hub";
pub const LIGHT: &str = "light";
pub const SENSOR: &str = "sensor";

/// Builds handlers for `virtual:hub`, `virtual:light` and `virtual:sensor`.
///
/// Background work of every handler runs on the shared [`Scheduler`].
pub struct VirtualHandlerFactory {
    core: HandlerFactoryCore,
    scheduler: Scheduler,
}

impl VirtualHandlerFactory {
    #[must_use]
    pub fn new(
        thing_types: Arc<ThingTypeRegistry>,
        thing_factory: Arc<ThingFactory>,
        scheduler: Scheduler,
    ) -> Self {
        Self {
            core: HandlerFactoryCore::new(thing_types, thing_factory),
            scheduler,
        }
    }
}

impl ThingHandlerFactory for VirtualHandlerFactory {
    fn core(&self) -> &HandlerFactoryCore {
        &self.core
    }

    fn supports_thing_type(&self, thing_type_uid: &ThingTypeUID) -> bool {
        thing_type_uid.binding_id() == BINDING_ID
            && matches!(thing_type_uid.id(), HUB | LIGHT | SENSOR)
    }

    fn create_handler(&self, thing: Thing) -> Result<Arc<dyn ThingHandler>, ThingError> {
        let handler: Arc<dyn ThingHandler> = match thing.thing_type_uid().id() {
            HUB => Arc::new(HubHandler::new(thing, self.scheduler.clone())),
            LIGHT => Arc::new(LightHandler::new(thing)),
            SENSOR => Arc::new(SensorHandler::new(thing, self.scheduler.clone())),
            other => {
                return Err(ThingError::InvalidArgument(format!(
                    "virtual binding has no '{other}' devices"
                )));
            }
        };
        Ok(handler)
    }

    fn remove_handler(&self, handler: &Arc<dyn ThingHandler>) {
        tracing::debug!(thing = %handler.thing().uid(), "virtual handler removed");
    }
}
