//! Locales and translation keys for type labels and descriptions.
//!
//! Keys follow the `<kind>.<binding>.<type>[.<sub>…].<field>` convention,
//! e.g. `thing-type.acme.sensor.label` or
//! `channel-type.acme.mode.state.option.eco`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A language tag such as `de` or `de-CH`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    /// The primary language subtag (`de` for `de-CH`).
    #[must_use]
    pub fn language(&self) -> &str {
        self.0.split(['-', '_']).next().unwrap_or(&self.0)
    }

    /// Lookup candidates, most specific first (`de_CH`, `de`).
    #[must_use]
    pub fn candidates(&self) -> Vec<String> {
        let normalized = self.0.replace('-', "_");
        let language = self.language().to_string();
        if normalized == language {
            vec![language]
        } else {
            vec![normalized, language]
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = !s.is_empty()
            && s.split(['-', '_'])
                .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric()));
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(format!("invalid locale '{s}'"))
        }
    }
}

impl TryFrom<String> for Locale {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Locale> for String {
    fn from(value: Locale) -> Self {
        value.0
    }
}

/// Which kind of type a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    ThingType,
    ChannelType,
    ChannelGroupType,
}

impl KeyKind {
    fn prefix(self) -> &'static str {
        match self {
            Self::ThingType => "thing-type",
            Self::ChannelType => "channel-type",
            Self::ChannelGroupType => "channel-group-type",
        }
    }
}

/// Key of a top-level field (`label`, `description`) of a type.
#[must_use]
pub fn type_key(kind: KeyKind, binding_id: &str, type_id: &str, field: &str) -> String {
    format!("{}.{binding_id}.{type_id}.{field}", kind.prefix())
}

/// Key of a field of a channel definition inside a thing or group type.
#[must_use]
pub fn channel_key(kind: KeyKind, binding_id: &str, type_id: &str, channel_id: &str, field: &str) -> String {
    format!("{}.{binding_id}.{type_id}.channel.{channel_id}.{field}", kind.prefix())
}

/// Key of a field of a channel group definition inside a thing type.
#[must_use]
pub fn group_key(binding_id: &str, type_id: &str, group_id: &str, field: &str) -> String {
    format!(
        "{}.{binding_id}.{type_id}.group.{group_id}.{field}",
        KeyKind::ThingType.prefix()
    )
}

/// Key of a state option label of a channel type.
#[must_use]
pub fn state_option_key(binding_id: &str, type_id: &str, value: &str) -> String {
    format!(
        "{}.{binding_id}.{type_id}.state.option.{value}",
        KeyKind::ChannelType.prefix()
    )
}

/// Key of an event option label of a channel type.
#[must_use]
pub fn event_option_key(binding_id: &str, type_id: &str, value: &str) -> String {
    format!(
        "{}.{binding_id}.{type_id}.event.option.{value}",
        KeyKind::ChannelType.prefix()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_thing_type_label_key() {
        assert_eq!(
            type_key(KeyKind::ThingType, "acme", "sensor", "label"),
            "thing-type.acme.sensor.label"
        );
    }

    #[test]
    fn should_build_channel_definition_key() {
        assert_eq!(
            channel_key(KeyKind::ThingType, "acme", "sensor", "temp", "label"),
            "thing-type.acme.sensor.channel.temp.label"
        );
    }

    #[test]
    fn should_build_state_option_key() {
        assert_eq!(
            state_option_key("acme", "mode", "eco"),
            "channel-type.acme.mode.state.option.eco"
        );
    }

    #[test]
    fn should_list_candidates_most_specific_first() {
        let locale: Locale = "de-CH".parse().unwrap();
        assert_eq!(locale.language(), "de");
        assert_eq!(locale.candidates(), vec!["de_CH".to_string(), "de".to_string()]);
        let plain: Locale = "fr".parse().unwrap();
        assert_eq!(plain.candidates(), vec!["fr".to_string()]);
    }

    #[test]
    fn should_reject_malformed_locale() {
        assert!("".parse::<Locale>().is_err());
        assert!("de--CH".parse::<Locale>().is_err());
    }
}
