//! In-memory [`TranslationProvider`].

use std::collections::HashMap;
use std::sync::RwLock;

use smarthome_domain::i18n::Locale;

use crate::module::ModuleId;
use crate::ports::TranslationProvider;
use crate::{read, write};

type Bundle = HashMap<String, String>;

/// Translations grouped by module and locale tag (`de`, `de_CH`).
#[derive(Default)]
pub struct StaticTranslations {
    modules: RwLock<HashMap<ModuleId, HashMap<String, Bundle>>>,
}

impl StaticTranslations {
    /// Add (or extend) the bundle of `module` for the `locale` tag.
    pub fn add<K, V>(&self, module: &ModuleId, locale: &str, entries: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut modules = write(&self.modules);
        modules
            .entry(module.clone())
            .or_default()
            .entry(locale.replace('-', "_"))
            .or_default()
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    /// Drop every bundle of `module`.
    pub fn remove_module(&self, module: &ModuleId) {
        write(&self.modules).remove(module);
    }

    /// Number of locales loaded for `module`.
    #[must_use]
    pub fn locale_count(&self, module: &ModuleId) -> usize {
        read(&self.modules).get(module).map_or(0, HashMap::len)
    }
}

impl TranslationProvider for StaticTranslations {
    fn text(
        &self,
        module: &ModuleId,
        key: &str,
        default: Option<&str>,
        locale: &Locale,
    ) -> Option<String> {
        let modules = read(&self.modules);
        modules
            .get(module)
            .and_then(|bundles| {
                locale
                    .candidates()
                    .iter()
                    .find_map(|tag| bundles.get(tag).and_then(|bundle| bundle.get(key)))
                    .cloned()
            })
            .or_else(|| default.map(str::to_string))
    }
}
