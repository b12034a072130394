//! Configuration values and their declarative schemas.
//!
//! A [`Configuration`] is a plain key→value map attached to things and
//! channels. A [`ConfigDescription`] declares which parameters exist, their
//! types, and their constraints; it validates proposed configurations.

mod description;
mod validation;

pub use description::{
    ConfigDescription, ConfigDescriptionBuilder, ConfigDescriptionParameter,
    ConfigDescriptionParameterBuilder, ParameterGroup, ParameterOption, ParameterPattern,
    ParameterType,
};

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single typed configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Integer(i64),
    Decimal(f64),
    Text(String),
    List(Vec<ConfigValue>),
}

impl ConfigValue {
    /// Numeric view of the value, if it is a number.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Decimal(v) => Some(*v),
            _ => None,
        }
    }

    /// Text view of the value, if it is text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Boolean view of the value, if it is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer view of the value, if it is an integer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => v.fmt(f),
            Self::Integer(v) => v.fmt(f),
            Self::Decimal(v) => v.fmt(f),
            Self::Text(v) => f.write_str(v),
            Self::List(values) => {
                let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Key→value configuration of a thing or channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration(BTreeMap<String, ConfigValue>);

impl Configuration {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a parameter value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.0.get(key)
    }

    /// Whether the parameter is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Set a parameter, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Option<ConfigValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Remove a parameter, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        self.0.remove(key)
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Return a copy of `self` with every entry of `other` applied on top.
    #[must_use]
    pub fn merged(&self, other: &Configuration) -> Self {
        let mut merged = self.0.clone();
        for (key, value) in &other.0 {
            merged.insert(key.clone(), value.clone());
        }
        Self(merged)
    }

    /// Parameter names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// All entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Borrow the underlying map.
    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<String, ConfigValue> {
        &self.0
    }
}

impl FromIterator<(String, ConfigValue)> for Configuration {
    fn from_iter<T: IntoIterator<Item = (String, ConfigValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_merge_other_configuration_on_top() {
        let base = Configuration::new().with("host", "a").with("port", 80_i64);
        let update = Configuration::new().with("port", 8080_i64);
        let merged = base.merged(&update);
        assert_eq!(merged.get("host"), Some(&ConfigValue::from("a")));
        assert_eq!(merged.get("port"), Some(&ConfigValue::Integer(8080)));
        assert_eq!(base.get("port"), Some(&ConfigValue::Integer(80)));
    }

    #[test]
    fn should_deserialize_untagged_values() {
        let json = r#"{"a": true, "b": 3, "c": 2.5, "d": "x", "e": [1, 2]}"#;
        let config: Configuration = serde_json::from_str(json).unwrap();
        assert_eq!(config.get("a"), Some(&ConfigValue::Bool(true)));
        assert_eq!(config.get("b"), Some(&ConfigValue::Integer(3)));
        assert_eq!(config.get("c"), Some(&ConfigValue::Decimal(2.5)));
        assert_eq!(config.get("d"), Some(&ConfigValue::Text("x".to_string())));
        assert!(matches!(config.get("e"), Some(ConfigValue::List(v)) if v.len() == 2));
    }

    #[test]
    fn should_view_integer_as_f64() {
        assert_eq!(ConfigValue::Integer(4).as_f64(), Some(4.0));
        assert_eq!(ConfigValue::from("4").as_f64(), None);
    }

    #[test]
    fn should_display_list_values() {
        let value = ConfigValue::List(vec![ConfigValue::Integer(1), ConfigValue::from("a")]);
        assert_eq!(value.to_string(), "[1, a]");
    }
}
