//! Localized copies of types.

use smarthome_domain::config::ConfigDescription;
use smarthome_domain::i18n::{self, KeyKind, Locale};
use smarthome_domain::types::{
    ChannelDefinition, ChannelGroupType, ChannelType, ThingType, TypeDefinition,
};

use crate::module::ModuleId;
use crate::ports::TranslationProvider;

/// A type that can produce a copy of itself with translated texts.
pub trait Localize: TypeDefinition {
    #[must_use]
    fn localize(
        &self,
        module: &ModuleId,
        translations: &dyn TranslationProvider,
        locale: &Locale,
    ) -> Self;
}

struct Translator<'a> {
    module: &'a ModuleId,
    translations: &'a dyn TranslationProvider,
    locale: &'a Locale,
}

impl Translator<'_> {
    fn text(&self, key: &str, default: &str) -> String {
        self.translations
            .text(self.module, key, Some(default), self.locale)
            .unwrap_or_else(|| default.to_string())
    }

    fn optional(&self, key: &str, default: Option<&str>) -> Option<String> {
        self.translations
            .text(self.module, key, default, self.locale)
    }

    fn channel_definitions(
        &self,
        kind: KeyKind,
        binding_id: &str,
        type_id: &str,
        definitions: &[ChannelDefinition],
    ) -> Vec<ChannelDefinition> {
        definitions
            .iter()
            .map(|definition| ChannelDefinition {
                label: self.optional(
                    &i18n::channel_key(kind, binding_id, type_id, &definition.id, "label"),
                    definition.label.as_deref(),
                ),
                description: self.optional(
                    &i18n::channel_key(kind, binding_id, type_id, &definition.id, "description"),
                    definition.description.as_deref(),
                ),
                ..definition.clone()
            })
            .collect()
    }
}

impl Localize for ThingType {
    fn localize(
        &self,
        module: &ModuleId,
        translations: &dyn TranslationProvider,
        locale: &Locale,
    ) -> Self {
        let t = Translator {
            module,
            translations,
            locale,
        };
        let (binding, id) = (self.uid.binding_id(), self.uid.id());
        let mut groups = self.channel_group_definitions.clone();
        for group in &mut groups {
            group.label = t.optional(
                &i18n::group_key(binding, id, &group.id, "label"),
                group.label.as_deref(),
            );
            group.description = t.optional(
                &i18n::group_key(binding, id, &group.id, "description"),
                group.description.as_deref(),
            );
        }
        Self {
            label: t.text(&i18n::type_key(KeyKind::ThingType, binding, id, "label"), &self.label),
            description: t.optional(
                &i18n::type_key(KeyKind::ThingType, binding, id, "description"),
                self.description.as_deref(),
            ),
            channel_definitions: t.channel_definitions(
                KeyKind::ThingType,
                binding,
                id,
                &self.channel_definitions,
            ),
            channel_group_definitions: groups,
            ..self.clone()
        }
    }
}

impl Localize for ChannelType {
    fn localize(
        &self,
        module: &ModuleId,
        translations: &dyn TranslationProvider,
        locale: &Locale,
    ) -> Self {
        let t = Translator {
            module,
            translations,
            locale,
        };
        let (binding, id) = (self.uid.binding_id(), self.uid.id());
        let state = self.state.clone().map(|mut state| {
            for option in &mut state.options {
                option.label = t.optional(
                    &i18n::state_option_key(binding, id, &option.value),
                    option.label.as_deref(),
                );
            }
            state
        });
        let event = self.event.clone().map(|mut event| {
            for option in &mut event.options {
                option.label = t.optional(
                    &i18n::event_option_key(binding, id, &option.value),
                    option.label.as_deref(),
                );
            }
            event
        });
        Self {
            label: t.text(&i18n::type_key(KeyKind::ChannelType, binding, id, "label"), &self.label),
            description: t.optional(
                &i18n::type_key(KeyKind::ChannelType, binding, id, "description"),
                self.description.as_deref(),
            ),
            state,
            event,
            ..self.clone()
        }
    }
}

impl Localize for ChannelGroupType {
    fn localize(
        &self,
        module: &ModuleId,
        translations: &dyn TranslationProvider,
        locale: &Locale,
    ) -> Self {
        let t = Translator {
            module,
            translations,
            locale,
        };
        let (binding, id) = (self.uid.binding_id(), self.uid.id());
        Self {
            label: t.text(
                &i18n::type_key(KeyKind::ChannelGroupType, binding, id, "label"),
                &self.label,
            ),
            description: t.optional(
                &i18n::type_key(KeyKind::ChannelGroupType, binding, id, "description"),
                self.description.as_deref(),
            ),
            channel_definitions: t.channel_definitions(
                KeyKind::ChannelGroupType,
                binding,
                id,
                &self.channel_definitions,
            ),
            ..self.clone()
        }
    }
}

// Parameter labels are served as declared.
impl Localize for ConfigDescription {
    fn localize(&self, _: &ModuleId, _: &dyn TranslationProvider, _: &Locale) -> Self {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StaticTranslations;
    use smarthome_domain::types::{StateDescription, StateOption};
    use smarthome_domain::uid::{ChannelTypeUID, ThingTypeUID};

    fn translations() -> StaticTranslations {
        let translations = StaticTranslations::default();
        translations.add(
            &ModuleId::new("acme"),
            "de",
            [
                ("thing-type.acme.sensor.label", "Fühler"),
                ("thing-type.acme.sensor.channel.temp.label", "Temperatur"),
                ("channel-type.acme.mode.state.option.eco", "Sparbetrieb"),
            ],
        );
        translations
    }

    #[test]
    fn should_translate_thing_type_and_channel_labels() {
        let uid: ThingTypeUID = "acme:sensor".parse().unwrap();
        let thing_type = ThingType::builder(uid, "Sensor")
            .description("A sensor")
            .channel(
                ChannelDefinition::new("temp", "system:temperature".parse().unwrap())
                    .with_label("Temperature"),
            )
            .build();
        let locale: Locale = "de-CH".parse().unwrap();

        let localized = thing_type.localize(&ModuleId::new("acme"), &translations(), &locale);

        assert_eq!(localized.label, "Fühler");
        assert_eq!(localized.description.as_deref(), Some("A sensor"));
        assert_eq!(
            localized.channel_definitions[0].label.as_deref(),
            Some("Temperatur")
        );
        assert_eq!(thing_type.label, "Sensor");
    }

    #[test]
    fn should_translate_state_option_labels() {
        let uid: ChannelTypeUID = "acme:mode".parse().unwrap();
        let channel_type = ChannelType::state(uid, "String", "Mode")
            .state_description(StateDescription {
                options: vec![
                    StateOption {
                        value: "eco".to_string(),
                        label: Some("Eco".to_string()),
                    },
                    StateOption {
                        value: "boost".to_string(),
                        label: Some("Boost".to_string()),
                    },
                ],
                ..StateDescription::default()
            })
            .build();
        let locale: Locale = "de".parse().unwrap();

        let localized = channel_type.localize(&ModuleId::new("acme"), &translations(), &locale);
        let options = &localized.state.unwrap().options;

        assert_eq!(options[0].label.as_deref(), Some("Sparbetrieb"));
        assert_eq!(options[1].label.as_deref(), Some("Boost"));
        assert_eq!(localized.label, "Mode");
    }
}
