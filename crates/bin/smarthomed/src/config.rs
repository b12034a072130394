//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `smarthome.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use smarthome_domain::config::{ConfigValue, Configuration};
use smarthome_domain::i18n::Locale;
use smarthome_domain::uid::{ThingTypeUID, ThingUID};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where descriptor modules are read from.
    pub addons: AddonsConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Runtime settings.
    pub runtime: RuntimeConfig,
    /// Binding toggles.
    pub bindings: BindingsConfig,
    /// Things to create at startup.
    pub things: Vec<ThingConfig>,
}

/// Descriptor module directory.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddonsConfig {
    /// Directory holding one sub-directory per module (`<module>/ESH-INF/…`).
    pub dir: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Locale type labels are logged in (e.g. `de-CH`).
    pub locale: Option<String>,
    /// Capacity of the in-process event bus.
    pub event_capacity: usize,
}

/// Per-binding toggles.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BindingsConfig {
    /// Enable the virtual/demo binding.
    pub virtual_enabled: bool,
}

/// A `[[things]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ThingConfig {
    /// Full thing UID (`binding:type[:bridge]:id`).
    pub uid: String,
    /// Thing type UID (`binding:type`).
    pub thing_type: String,
    /// UID of the bridge the thing is attached to.
    pub bridge: Option<String>,
    pub label: Option<String>,
    pub location: Option<String>,
    /// Configuration parameters; defaults from the type fill the rest.
    #[serde(default)]
    pub configuration: toml::Table,
}

impl Config {
    /// Load configuration from `smarthome.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// result does not validate.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("smarthome.toml")
    }

    /// Same as [`load`](Self::load) with an explicit file path.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path.as_ref())?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SMARTHOME_ADDONS_DIR") {
            self.addons.dir = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("SMARTHOME_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("SMARTHOME_LOCALE") {
            self.runtime.locale = Some(val);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.runtime.event_capacity == 0 {
            return Err(ConfigError::Validation(
                "event_capacity must be non-zero".to_string(),
            ));
        }
        self.locale()?;
        let mut seen = BTreeSet::new();
        for thing in &self.things {
            let uid = thing.thing_uid()?;
            let thing_type = thing.thing_type_uid()?;
            if uid.binding_id() != thing_type.binding_id() || uid.thing_type_id() != thing_type.id() {
                return Err(ConfigError::Validation(format!(
                    "thing '{uid}' does not belong to thing type '{thing_type}'"
                )));
            }
            thing.bridge_uid()?;
            thing.configuration()?;
            if !seen.insert(uid.clone()) {
                return Err(ConfigError::Validation(format!("thing '{uid}' is declared twice")));
            }
        }
        Ok(())
    }

    /// The configured locale.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a malformed language tag.
    pub fn locale(&self) -> Result<Option<Locale>, ConfigError> {
        self.runtime
            .locale
            .as_deref()
            .map(str::parse::<Locale>)
            .transpose()
            .map_err(ConfigError::Validation)
    }
}

impl ThingConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a malformed UID.
    pub fn thing_uid(&self) -> Result<ThingUID, ConfigError> {
        self.uid
            .parse()
            .map_err(|err| ConfigError::Validation(format!("thing uid '{}': {err}", self.uid)))
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a malformed UID.
    pub fn thing_type_uid(&self) -> Result<ThingTypeUID, ConfigError> {
        self.thing_type.parse().map_err(|err| {
            ConfigError::Validation(format!("thing type '{}': {err}", self.thing_type))
        })
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a malformed UID.
    pub fn bridge_uid(&self) -> Result<Option<ThingUID>, ConfigError> {
        self.bridge
            .as_deref()
            .map(|bridge| {
                bridge
                    .parse()
                    .map_err(|err| ConfigError::Validation(format!("bridge uid '{bridge}': {err}")))
            })
            .transpose()
    }

    /// The `[things.configuration]` table as a [`Configuration`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for dates and nested tables,
    /// which have no configuration counterpart.
    pub fn configuration(&self) -> Result<Configuration, ConfigError> {
        self.configuration
            .iter()
            .try_fold(Configuration::new(), |configuration, (key, value)| {
                let value = config_value(value).ok_or_else(|| {
                    ConfigError::Validation(format!(
                        "thing '{}': parameter '{key}' has an unsupported value",
                        self.uid
                    ))
                })?;
                Ok(configuration.with(key.clone(), value))
            })
    }
}

fn config_value(value: &toml::Value) -> Option<ConfigValue> {
    match value {
        toml::Value::Boolean(b) => Some(ConfigValue::Bool(*b)),
        toml::Value::Integer(i) => Some(ConfigValue::Integer(*i)),
        toml::Value::Float(f) => Some(ConfigValue::Decimal(*f)),
        toml::Value::String(s) => Some(ConfigValue::Text(s.clone())),
        toml::Value::Array(items) => items
            .iter()
            .map(config_value)
            .collect::<Option<Vec<_>>>()
            .map(ConfigValue::List),
        toml::Value::Datetime(_) | toml::Value::Table(_) => None,
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "smarthomed=info,smarthome_app=info,smarthome_adapter_xml=info,smarthome_binding_virtual=info"
                .to_string(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            locale: None,
            event_capacity: 256,
        }
    }
}

impl Default for BindingsConfig {
    fn default() -> Self {
        Self {
            virtual_enabled: true,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
