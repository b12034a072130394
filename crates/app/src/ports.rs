//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the lifecycle engine and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod callback;
pub mod event_bus;
pub mod translation;
pub mod type_provider;

pub use callback::ThingHandlerCallback;
pub use event_bus::EventPublisher;
pub use translation::TranslationProvider;
pub use type_provider::{ProviderChangeListener, TypeProvider};
