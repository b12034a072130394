//! # smarthome-binding-virtual
//!
//! Virtual/demo binding that provides simulated devices for testing and
//! demonstration purposes.
//!
//! ## Provided thing types
//!
//! | Thing type | Channels | Behaviour |
//! |------------|----------|-----------|
//! | `virtual:hub` (bridge) | none | Connects in the background; `reachable = false` keeps it `OFFLINE` |
//! | `virtual:light` | `power` (`system.power`) | Follows on/off commands, echoes its state on refresh |
//! | `virtual:sensor` | `temperature`, `battery` | Reports a reading every `refresh` seconds |
//!
//! The descriptor and its translations are embedded; feed [`descriptors`]
//! to a `DescriptorTracker` under [`module`] to register the types.
//!
//! ## Dependency rule
//!
//! Depends on `smarthome-app` (handler traits), `smarthome-domain`, and
//! `smarthome-adapter-xml` for the embedded descriptor source.

mod devices;
mod factory;

use smarthome_adapter_xml::StaticDescriptorSource;
use smarthome_app::module::ModuleId;

pub use devices::{HubHandler, LightHandler, Reading, SensorHandler};
pub use factory::{HUB, LIGHT, SENSOR, VirtualHandlerFactory};

pub const BINDING_ID: &str = "virtual";

const THING_TYPES: &str = include_str!("../ESH-INF/thing/thing-types.xml");
const GERMAN: &str = include_str!("../ESH-INF/i18n/virtual_de.properties");

/// The module the embedded descriptors are contributed under.
#[must_use]
pub fn module() -> ModuleId {
    ModuleId::new(BINDING_ID)
}

/// The binding's embedded descriptor documents and translations.
#[must_use]
pub fn descriptors() -> StaticDescriptorSource {
    let module = module();
    StaticDescriptorSource::new()
        .with_descriptor(&module, "virtual/ESH-INF/thing/thing-types.xml", THING_TYPES)
        .with_translation(&module, "virtual_de.properties", GERMAN)
}
