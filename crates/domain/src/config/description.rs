//! Config descriptions: declarative schemas for configuration parameters.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{ConfigValue, Configuration};

/// Value type of a configuration parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    Text,
    Integer,
    Decimal,
    Boolean,
}

impl ParameterType {
    /// Lower-case name as used in descriptor documents.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
        }
    }

    /// Convert a raw textual value (e.g. a default) into a typed value.
    ///
    /// Returns `None` when the text is not a valid literal of this type.
    #[must_use]
    pub fn parse_value(self, raw: &str) -> Option<ConfigValue> {
        let raw = raw.trim();
        match self {
            Self::Text => Some(ConfigValue::Text(raw.to_string())),
            Self::Integer => raw.parse().ok().map(ConfigValue::Integer),
            Self::Decimal => raw.parse().ok().map(ConfigValue::Decimal),
            Self::Boolean => raw.parse().ok().map(ConfigValue::Bool),
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "integer" => Ok(Self::Integer),
            "decimal" => Ok(Self::Decimal),
            "boolean" => Ok(Self::Boolean),
            other => Err(other.to_string()),
        }
    }
}

/// A selectable value of a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterOption {
    pub value: String,
    pub label: String,
}

/// A text parameter's `pattern`, compiled once.
///
/// The whole value must match. A pattern that does not compile is kept
/// verbatim (so descriptions still round-trip) but constrains nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ParameterPattern {
    source: String,
    regex: Option<Regex>,
}

impl ParameterPattern {
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let regex = match Regex::new(&format!("^(?:{source})$")) {
            Ok(regex) => Some(regex),
            Err(err) => {
                tracing::warn!(pattern = %source, %err, "parameter pattern does not compile, ignored");
                None
            }
        };
        Self { source, regex }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.regex.is_some()
    }

    /// Whether `text` satisfies the pattern; always true for an invalid one.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.regex.as_ref().is_none_or(|regex| regex.is_match(text))
    }
}

impl PartialEq for ParameterPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl From<String> for ParameterPattern {
    fn from(source: String) -> Self {
        Self::new(source)
    }
}

impl From<ParameterPattern> for String {
    fn from(pattern: ParameterPattern) -> Self {
        pattern.source
    }
}

impl fmt::Display for ParameterPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Visual grouping of parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterGroup {
    pub name: String,
    pub label: Option<String>,
    pub description: Option<String>,
    pub context: Option<String>,
    pub advanced: bool,
}

/// Declaration of a single configuration parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDescriptionParameter {
    pub name: String,
    pub parameter_type: ParameterType,
    pub label: Option<String>,
    pub description: Option<String>,
    pub context: Option<String>,
    pub default: Option<String>,
    pub required: bool,
    pub read_only: bool,
    pub multiple: bool,
    pub multiple_limit: Option<usize>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub pattern: Option<ParameterPattern>,
    pub options: Vec<ParameterOption>,
    pub limit_to_options: bool,
    pub advanced: bool,
    pub group_name: Option<String>,
    pub unit: Option<String>,
    pub unit_label: Option<String>,
}

impl ConfigDescriptionParameter {
    /// Create a builder for a parameter of the given name and type.
    #[must_use]
    pub fn builder(name: impl Into<String>, parameter_type: ParameterType) -> ConfigDescriptionParameterBuilder {
        ConfigDescriptionParameterBuilder {
            parameter: Self {
                name: name.into(),
                parameter_type,
                label: None,
                description: None,
                context: None,
                default: None,
                required: false,
                read_only: false,
                multiple: false,
                multiple_limit: None,
                min: None,
                max: None,
                step: None,
                pattern: None,
                options: Vec::new(),
                limit_to_options: true,
                advanced: false,
                group_name: None,
                unit: None,
                unit_label: None,
            },
        }
    }

    /// The default converted to this parameter's type, if declared and valid.
    #[must_use]
    pub fn typed_default(&self) -> Option<ConfigValue> {
        let raw = self.default.as_deref()?;
        if self.multiple {
            let values: Option<Vec<ConfigValue>> = raw
                .split(',')
                .map(|part| self.parameter_type.parse_value(part))
                .collect();
            return values.map(ConfigValue::List);
        }
        self.parameter_type.parse_value(raw)
    }
}

/// Step-by-step builder for [`ConfigDescriptionParameter`].
#[derive(Debug)]
pub struct ConfigDescriptionParameterBuilder {
    parameter: ConfigDescriptionParameter,
}

impl ConfigDescriptionParameterBuilder {
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.parameter.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.parameter.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.parameter.context = Some(context.into());
        self
    }

    #[must_use]
    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.parameter.default = Some(default.into());
        self
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.parameter.required = required;
        self
    }

    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.parameter.read_only = read_only;
        self
    }

    #[must_use]
    pub fn multiple(mut self, multiple: bool) -> Self {
        self.parameter.multiple = multiple;
        self
    }

    #[must_use]
    pub fn multiple_limit(mut self, limit: usize) -> Self {
        self.parameter.multiple_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn min(mut self, min: f64) -> Self {
        self.parameter.min = Some(min);
        self
    }

    #[must_use]
    pub fn max(mut self, max: f64) -> Self {
        self.parameter.max = Some(max);
        self
    }

    #[must_use]
    pub fn step(mut self, step: f64) -> Self {
        self.parameter.step = Some(step);
        self
    }

    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.parameter.pattern = Some(ParameterPattern::new(pattern));
        self
    }

    #[must_use]
    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.parameter.options.push(ParameterOption {
            value: value.into(),
            label: label.into(),
        });
        self
    }

    #[must_use]
    pub fn limit_to_options(mut self, limit: bool) -> Self {
        self.parameter.limit_to_options = limit;
        self
    }

    #[must_use]
    pub fn advanced(mut self, advanced: bool) -> Self {
        self.parameter.advanced = advanced;
        self
    }

    #[must_use]
    pub fn group_name(mut self, group: impl Into<String>) -> Self {
        self.parameter.group_name = Some(group.into());
        self
    }

    #[must_use]
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.parameter.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn unit_label(mut self, unit_label: impl Into<String>) -> Self {
        self.parameter.unit_label = Some(unit_label.into());
        self
    }

    #[must_use]
    pub fn build(self) -> ConfigDescriptionParameter {
        self.parameter
    }
}

/// Schema for the configuration of a thing, channel, or service.
///
/// Identified by a URI such as `thing-type:acme:sensor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDescription {
    pub uri: String,
    pub parameters: Vec<ConfigDescriptionParameter>,
    pub groups: Vec<ParameterGroup>,
}

impl ConfigDescription {
    /// Create a builder for the description identified by `uri`.
    #[must_use]
    pub fn builder(uri: impl Into<String>) -> ConfigDescriptionBuilder {
        ConfigDescriptionBuilder {
            description: Self {
                uri: uri.into(),
                parameters: Vec::new(),
                groups: Vec::new(),
            },
        }
    }

    /// Look up a parameter by name.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&ConfigDescriptionParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Configuration made of every parameter's typed default.
    #[must_use]
    pub fn default_configuration(&self) -> Configuration {
        self.parameters
            .iter()
            .filter_map(|p| p.typed_default().map(|v| (p.name.clone(), v)))
            .collect()
    }
}

/// Step-by-step builder for [`ConfigDescription`].
#[derive(Debug)]
pub struct ConfigDescriptionBuilder {
    description: ConfigDescription,
}

impl ConfigDescriptionBuilder {
    #[must_use]
    pub fn parameter(mut self, parameter: ConfigDescriptionParameter) -> Self {
        self.description.parameters.push(parameter);
        self
    }

    #[must_use]
    pub fn group(mut self, group: ParameterGroup) -> Self {
        self.description.groups.push(group);
        self
    }

    #[must_use]
    pub fn build(self) -> ConfigDescription {
        self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_typed_defaults() {
        assert_eq!(
            ParameterType::Integer.parse_value(" 42 "),
            Some(ConfigValue::Integer(42))
        );
        assert_eq!(
            ParameterType::Decimal.parse_value("1.5"),
            Some(ConfigValue::Decimal(1.5))
        );
        assert_eq!(
            ParameterType::Boolean.parse_value("true"),
            Some(ConfigValue::Bool(true))
        );
        assert_eq!(ParameterType::Integer.parse_value("abc"), None);
    }

    #[test]
    fn should_split_default_of_multiple_parameter() {
        let param = ConfigDescriptionParameter::builder("ids", ParameterType::Integer)
            .multiple(true)
            .default_value("1,2")
            .build();
        assert_eq!(
            param.typed_default(),
            Some(ConfigValue::List(vec![
                ConfigValue::Integer(1),
                ConfigValue::Integer(2)
            ]))
        );
    }

    #[test]
    fn should_build_default_configuration_from_declared_defaults() {
        let desc = ConfigDescription::builder("thing-type:acme:sensor")
            .parameter(
                ConfigDescriptionParameter::builder("refresh", ParameterType::Integer)
                    .default_value("30")
                    .build(),
            )
            .parameter(ConfigDescriptionParameter::builder("host", ParameterType::Text).build())
            .build();
        let config = desc.default_configuration();
        assert_eq!(config.len(), 1);
        assert_eq!(config.get("refresh"), Some(&ConfigValue::Integer(30)));
    }

    #[test]
    fn should_parse_parameter_type_names() {
        assert_eq!("decimal".parse::<ParameterType>(), Ok(ParameterType::Decimal));
        assert!("Decimal".parse::<ParameterType>().is_err());
    }
}
