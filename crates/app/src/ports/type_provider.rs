//! Type provider port: read access to declared types.

use smarthome_domain::i18n::Locale;
use smarthome_domain::types::TypeDefinition;

/// Serves types of one kind, optionally localized.
///
/// An unknown UID yields `None`, never an error.
pub trait TypeProvider<T: TypeDefinition>: Send + Sync {
    fn get(&self, uid: &T::Uid, locale: Option<&Locale>) -> Option<T>;

    fn get_all(&self, locale: Option<&Locale>) -> Vec<T>;
}

/// Observes contributions to a provider.
///
/// Listeners are invoked after the provider's snapshot has been swapped, on
/// the thread performing the change.
pub trait ProviderChangeListener<T>: Send + Sync {
    fn added(&self, _element: &T) {}

    fn updated(&self, _old: &T, _new: &T) {}

    fn removed(&self, _element: &T) {}
}
