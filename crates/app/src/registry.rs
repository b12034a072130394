//! Type providers and registries.
//!
//! Modules contribute types to a [`ModuleTypeProvider`]; registries aggregate
//! any number of providers and answer lookups, first hit wins. Reads never
//! block on writers: providers publish immutable snapshots and swap them on
//! every change.

mod localize;
mod provider;
mod registries;
mod system;
mod translations;

pub use localize::Localize;
pub use provider::ModuleTypeProvider;
pub use registries::{
    ChannelGroupTypeRegistry, ChannelTypeRegistry, ConfigDescriptionRegistry, ThingTypeRegistry,
    TypeRegistry,
};
pub use system::SystemChannelTypeProvider;
pub use translations::StaticTranslations;
