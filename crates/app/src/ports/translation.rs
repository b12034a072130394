//! Localization port.

use smarthome_domain::i18n::Locale;

use crate::module::ModuleId;

/// Looks up localized texts contributed by a module.
pub trait TranslationProvider: Send + Sync {
    /// The translation of `key` for `locale`, or `default` when none exists.
    fn text(
        &self,
        module: &ModuleId,
        key: &str,
        default: Option<&str>,
        locale: &Locale,
    ) -> Option<String>;
}
