//! Module-scoped, copy-on-write type provider.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, RwLock};

use smarthome_domain::i18n::Locale;
use smarthome_domain::types::TypeDefinition;

use super::Localize;
use crate::error::RegistryError;
use crate::module::ModuleId;
use crate::ports::{ProviderChangeListener, TranslationProvider, TypeProvider};
use crate::{lock, read, write};

struct Entry<T> {
    module: ModuleId,
    value: T,
}

impl<T: Clone> Clone for Entry<T> {
    fn clone(&self) -> Self {
        Self {
            module: self.module.clone(),
            value: self.value.clone(),
        }
    }
}

type Snapshot<T> = Arc<BTreeMap<<T as TypeDefinition>::Uid, Entry<T>>>;
type Listeners<T> = Arc<Vec<Arc<dyn ProviderChangeListener<T>>>>;

/// Holds the types contributed by every module for one type kind.
///
/// Readers clone the current snapshot `Arc` and never wait on writers;
/// writers are serialized by a separate mutex, build a new map, and swap it
/// in. Listeners are notified after the swap, outside every lock.
pub struct ModuleTypeProvider<T: Localize> {
    snapshot: RwLock<Snapshot<T>>,
    writer: Mutex<()>,
    listeners: RwLock<Listeners<T>>,
    translations: Option<Arc<dyn TranslationProvider>>,
}

impl<T: Localize> Default for ModuleTypeProvider<T> {
    fn default() -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(BTreeMap::new())),
            writer: Mutex::new(()),
            listeners: RwLock::new(Arc::new(Vec::new())),
            translations: None,
        }
    }
}

impl<T: Localize> ModuleTypeProvider<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Localize served types through `translations` when a locale is asked for.
    #[must_use]
    pub fn with_translations(mut self, translations: Arc<dyn TranslationProvider>) -> Self {
        self.translations = Some(translations);
        self
    }

    fn current(&self) -> Snapshot<T> {
        Arc::clone(&read(&self.snapshot))
    }

    fn current_listeners(&self) -> Listeners<T> {
        Arc::clone(&read(&self.listeners))
    }

    /// Contribute `value` on behalf of `module`.
    ///
    /// The same module contributing the same UID again replaces the previous
    /// value and fires `updated`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateUid`] when another module already
    /// contributes that UID; the first contribution is kept.
    pub fn add(&self, module: &ModuleId, value: T) -> Result<(), RegistryError> {
        let previous = {
            let _writer = lock(&self.writer);
            let current = self.current();
            let uid = value.uid().clone();
            if let Some(existing) = current.get(&uid)
                && existing.module != *module
            {
                tracing::warn!(
                    kind = T::KIND,
                    %uid,
                    owner = %existing.module,
                    rejected = %module,
                    "duplicate type contribution ignored"
                );
                return Err(RegistryError::DuplicateUid {
                    kind: T::KIND,
                    uid: uid.to_string(),
                    owner: existing.module.to_string(),
                });
            }
            let mut next = (*current).clone();
            let previous = next.insert(
                uid,
                Entry {
                    module: module.clone(),
                    value: value.clone(),
                },
            );
            *write(&self.snapshot) = Arc::new(next);
            previous
        };

        for listener in self.current_listeners().iter() {
            match &previous {
                Some(old) => listener.updated(&old.value, &value),
                None => listener.added(&value),
            }
        }
        Ok(())
    }

    /// Contribute every value, collecting rejections instead of stopping.
    pub fn add_all(&self, module: &ModuleId, values: impl IntoIterator<Item = T>) -> Vec<RegistryError> {
        values
            .into_iter()
            .filter_map(|value| self.add(module, value).err())
            .collect()
    }

    /// Remove everything `module` contributed and return it.
    ///
    /// Each listener receives exactly one `removed` per removed type.
    pub fn remove_module(&self, module: &ModuleId) -> Vec<T> {
        let removed: Vec<T> = {
            let _writer = lock(&self.writer);
            let current = self.current();
            let (gone, kept): (Vec<_>, Vec<_>) = current
                .iter()
                .map(|(uid, entry)| (uid.clone(), entry.clone()))
                .partition(|(_, entry)| entry.module == *module);
            if gone.is_empty() {
                return Vec::new();
            }
            *write(&self.snapshot) = Arc::new(kept.into_iter().collect());
            gone.into_iter().map(|(_, entry)| entry.value).collect()
        };

        tracing::debug!(kind = T::KIND, %module, count = removed.len(), "module types removed");
        for listener in self.current_listeners().iter() {
            for value in &removed {
                listener.removed(value);
            }
        }
        removed
    }

    /// The module that contributed `uid`.
    #[must_use]
    pub fn module_of(&self, uid: &T::Uid) -> Option<ModuleId> {
        self.current().get(uid).map(|entry| entry.module.clone())
    }

    pub fn add_listener(&self, listener: Arc<dyn ProviderChangeListener<T>>) {
        let mut listeners = write(&self.listeners);
        let mut next = (**listeners).clone();
        next.push(listener);
        *listeners = Arc::new(next);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn ProviderChangeListener<T>>) {
        let mut listeners = write(&self.listeners);
        let next = listeners
            .iter()
            .filter(|l| !Arc::ptr_eq(l, listener))
            .cloned()
            .collect();
        *listeners = Arc::new(next);
    }

    fn serve(&self, entry: &Entry<T>, locale: Option<&Locale>) -> T {
        match (&self.translations, locale) {
            (Some(translations), Some(locale)) => {
                entry.value.localize(&entry.module, translations.as_ref(), locale)
            }
            _ => entry.value.clone(),
        }
    }
}

impl<T: Localize> TypeProvider<T> for ModuleTypeProvider<T> {
    fn get(&self, uid: &T::Uid, locale: Option<&Locale>) -> Option<T> {
        self.current()
            .get(uid)
            .map(|entry| self.serve(entry, locale))
    }

    fn get_all(&self, locale: Option<&Locale>) -> Vec<T> {
        self.current()
            .values()
            .map(|entry| self.serve(entry, locale))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StaticTranslations;
    use smarthome_domain::types::ThingType;
    use smarthome_domain::uid::ThingTypeUID;

    #[derive(Default)]
    struct RecordingListener {
        added: Mutex<Vec<String>>,
        updated: Mutex<Vec<String>>,
        removed: Mutex<Vec<String>>,
    }

    impl ProviderChangeListener<ThingType> for RecordingListener {
        fn added(&self, element: &ThingType) {
            self.added.lock().unwrap().push(element.uid.to_string());
        }

        fn updated(&self, _old: &ThingType, new: &ThingType) {
            self.updated.lock().unwrap().push(new.uid.to_string());
        }

        fn removed(&self, element: &ThingType) {
            self.removed.lock().unwrap().push(element.uid.to_string());
        }
    }

    fn thing_type(uid: &str, label: &str) -> ThingType {
        let uid: ThingTypeUID = uid.parse().unwrap();
        ThingType::builder(uid, label).build()
    }

    fn acme() -> ModuleId {
        ModuleId::new("acme")
    }

    #[test]
    fn should_serve_contributed_type() {
        let provider: ModuleTypeProvider<ThingType> = ModuleTypeProvider::new();
        provider.add(&acme(), thing_type("acme:sensor", "Sensor")).unwrap();

        let found = provider.get(&"acme:sensor".parse().unwrap(), None).unwrap();
        assert_eq!(found.label, "Sensor");
        assert_eq!(provider.module_of(&found.uid), Some(acme()));
    }

    #[test]
    fn should_return_none_for_unknown_uid() {
        let provider: ModuleTypeProvider<ThingType> = ModuleTypeProvider::new();
        assert!(provider.get(&"acme:nothing".parse().unwrap(), None).is_none());
    }

    #[test]
    fn should_replace_when_same_module_contributes_again() {
        let provider: ModuleTypeProvider<ThingType> = ModuleTypeProvider::new();
        let listener = Arc::new(RecordingListener::default());
        provider.add_listener(listener.clone());

        provider.add(&acme(), thing_type("acme:sensor", "Sensor")).unwrap();
        provider.add(&acme(), thing_type("acme:sensor", "Sensor v2")).unwrap();

        let found = provider.get(&"acme:sensor".parse().unwrap(), None).unwrap();
        assert_eq!(found.label, "Sensor v2");
        assert_eq!(listener.added.lock().unwrap().len(), 1);
        assert_eq!(listener.updated.lock().unwrap().len(), 1);
    }

    #[test]
    fn should_reject_duplicate_from_other_module_and_keep_first() {
        let provider: ModuleTypeProvider<ThingType> = ModuleTypeProvider::new();
        provider.add(&acme(), thing_type("acme:sensor", "Sensor")).unwrap();

        let result = provider.add(&ModuleId::new("other"), thing_type("acme:sensor", "Impostor"));

        assert!(matches!(result, Err(RegistryError::DuplicateUid { .. })));
        let found = provider.get(&"acme:sensor".parse().unwrap(), None).unwrap();
        assert_eq!(found.label, "Sensor");
    }

    #[test]
    fn should_remove_module_types_and_notify_once_per_type() {
        let provider: ModuleTypeProvider<ThingType> = ModuleTypeProvider::new();
        let first = Arc::new(RecordingListener::default());
        let second = Arc::new(RecordingListener::default());
        provider.add_listener(first.clone());
        provider.add_listener(second.clone());
        provider.add(&acme(), thing_type("acme:sensor", "Sensor")).unwrap();
        provider.add(&acme(), thing_type("acme:light", "Light")).unwrap();
        provider
            .add(&ModuleId::new("other"), thing_type("other:plug", "Plug"))
            .unwrap();

        let removed = provider.remove_module(&acme());

        assert_eq!(removed.len(), 2);
        assert!(provider.get(&"acme:sensor".parse().unwrap(), None).is_none());
        assert!(provider.get(&"acme:light".parse().unwrap(), None).is_none());
        assert!(provider.get(&"other:plug".parse().unwrap(), None).is_some());
        for listener in [&first, &second] {
            let mut seen = listener.removed.lock().unwrap().clone();
            seen.sort();
            assert_eq!(seen, vec!["acme:light".to_string(), "acme:sensor".to_string()]);
        }
    }

    #[test]
    fn should_not_notify_when_module_contributed_nothing() {
        let provider: ModuleTypeProvider<ThingType> = ModuleTypeProvider::new();
        let listener = Arc::new(RecordingListener::default());
        provider.add_listener(listener.clone());

        assert!(provider.remove_module(&acme()).is_empty());
        assert!(listener.removed.lock().unwrap().is_empty());
    }

    #[test]
    fn should_stop_notifying_removed_listener() {
        let provider: ModuleTypeProvider<ThingType> = ModuleTypeProvider::new();
        let listener = Arc::new(RecordingListener::default());
        let as_dyn: Arc<dyn ProviderChangeListener<ThingType>> = listener.clone();
        provider.add_listener(Arc::clone(&as_dyn));
        provider.remove_listener(&as_dyn);

        provider.add(&acme(), thing_type("acme:sensor", "Sensor")).unwrap();

        assert!(listener.added.lock().unwrap().is_empty());
    }

    #[test]
    fn should_localize_only_when_locale_given() {
        let translations = Arc::new(StaticTranslations::default());
        translations.add(&acme(), "de", [("thing-type.acme.sensor.label", "Fühler")]);
        let provider: ModuleTypeProvider<ThingType> =
            ModuleTypeProvider::new().with_translations(translations);
        provider.add(&acme(), thing_type("acme:sensor", "Sensor")).unwrap();
        let uid: ThingTypeUID = "acme:sensor".parse().unwrap();
        let locale: Locale = "de".parse().unwrap();

        assert_eq!(provider.get(&uid, Some(&locale)).unwrap().label, "Fühler");
        assert_eq!(provider.get(&uid, None).unwrap().label, "Sensor");
        assert_eq!(provider.get_all(Some(&locale))[0].label, "Fühler");
    }
}
