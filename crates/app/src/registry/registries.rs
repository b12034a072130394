//! Registries aggregating several providers of one type kind.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use smarthome_domain::config::ConfigDescription;
use smarthome_domain::i18n::Locale;
use smarthome_domain::types::{
    ChannelDefinition, ChannelGroupType, ChannelType, ThingType, TypeDefinition,
};

use crate::ports::TypeProvider;
use crate::{read, write};

/// Looks types up across its providers; the first provider with a hit wins.
pub struct TypeRegistry<T: TypeDefinition> {
    providers: RwLock<Vec<Arc<dyn TypeProvider<T>>>>,
}

pub type ThingTypeRegistry = TypeRegistry<ThingType>;
pub type ChannelTypeRegistry = TypeRegistry<ChannelType>;
pub type ChannelGroupTypeRegistry = TypeRegistry<ChannelGroupType>;
pub type ConfigDescriptionRegistry = TypeRegistry<ConfigDescription>;

impl<T: TypeDefinition> Default for TypeRegistry<T> {
    fn default() -> Self {
        Self {
            providers: RwLock::new(Vec::new()),
        }
    }
}

impl<T: TypeDefinition> TypeRegistry<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_provider(&self, provider: Arc<dyn TypeProvider<T>>) {
        write(&self.providers).push(provider);
    }

    pub fn remove_provider(&self, provider: &Arc<dyn TypeProvider<T>>) {
        write(&self.providers).retain(|p| !Arc::ptr_eq(p, provider));
    }

    fn providers(&self) -> Vec<Arc<dyn TypeProvider<T>>> {
        read(&self.providers).clone()
    }

    #[must_use]
    pub fn get(&self, uid: &T::Uid, locale: Option<&Locale>) -> Option<T> {
        self.providers()
            .iter()
            .find_map(|provider| provider.get(uid, locale))
    }

    /// Every known type, each UID once.
    #[must_use]
    pub fn get_all(&self, locale: Option<&Locale>) -> Vec<T> {
        let mut all = BTreeMap::new();
        for provider in self.providers() {
            for value in provider.get_all(locale) {
                all.entry(value.uid().clone()).or_insert(value);
            }
        }
        all.into_values().collect()
    }
}

impl TypeRegistry<ChannelType> {
    /// The channel type a definition refers to.
    #[must_use]
    pub fn channel_type_for(
        &self,
        definition: &ChannelDefinition,
        locale: Option<&Locale>,
    ) -> Option<ChannelType> {
        self.get(&definition.channel_type_uid, locale)
    }
}

impl TypeRegistry<ThingType> {
    /// Bridge types only.
    #[must_use]
    pub fn bridge_types(&self, locale: Option<&Locale>) -> Vec<ThingType> {
        self.get_all(locale)
            .into_iter()
            .filter(ThingType::is_bridge)
            .collect()
    }
}
