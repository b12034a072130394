//! Provider of the framework's own channel types.

use std::collections::BTreeMap;
use std::sync::Arc;

use smarthome_domain::i18n::Locale;
use smarthome_domain::types::{ChannelType, system};
use smarthome_domain::uid::{ChannelTypeUID, SYSTEM_BINDING_ID};

use super::Localize;
use crate::module::ModuleId;
use crate::ports::{TranslationProvider, TypeProvider};

/// Serves the fixed catalogue of `system:*` channel types.
pub struct SystemChannelTypeProvider {
    module: ModuleId,
    types: BTreeMap<ChannelTypeUID, ChannelType>,
    translations: Option<Arc<dyn TranslationProvider>>,
}

impl Default for SystemChannelTypeProvider {
    fn default() -> Self {
        Self {
            module: ModuleId::new(SYSTEM_BINDING_ID),
            types: system::channel_types()
                .into_iter()
                .map(|t| (t.uid.clone(), t))
                .collect(),
            translations: None,
        }
    }
}

impl SystemChannelTypeProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Translations are looked up under the `system` module.
    #[must_use]
    pub fn with_translations(mut self, translations: Arc<dyn TranslationProvider>) -> Self {
        self.translations = Some(translations);
        self
    }

    fn serve(&self, channel_type: &ChannelType, locale: Option<&Locale>) -> ChannelType {
        match (&self.translations, locale) {
            (Some(translations), Some(locale)) => {
                channel_type.localize(&self.module, translations.as_ref(), locale)
            }
            _ => channel_type.clone(),
        }
    }
}

impl TypeProvider<ChannelType> for SystemChannelTypeProvider {
    fn get(&self, uid: &ChannelTypeUID, locale: Option<&Locale>) -> Option<ChannelType> {
        self.types.get(uid).map(|t| self.serve(t, locale))
    }

    fn get_all(&self, locale: Option<&Locale>) -> Vec<ChannelType> {
        self.types.values().map(|t| self.serve(t, locale)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serve_system_temperature() {
        let provider = SystemChannelTypeProvider::new();
        let uid: ChannelTypeUID = "system:temperature".parse().unwrap();
        let found = provider.get(&uid, None).unwrap();
        assert_eq!(found.item_type.as_deref(), Some("Number:Temperature"));
    }

    #[test]
    fn should_not_serve_binding_types() {
        let provider = SystemChannelTypeProvider::new();
        let uid: ChannelTypeUID = "acme:temperature".parse().unwrap();
        assert!(provider.get(&uid, None).is_none());
    }

    #[test]
    fn should_list_whole_catalogue() {
        let provider = SystemChannelTypeProvider::new();
        let all = provider.get_all(None);
        assert_eq!(all.len(), system::channel_types().len());
        assert!(all.iter().all(|t| t.uid.is_system()));
    }
}
