//! Validation of a [`Configuration`] against its [`ConfigDescription`].

use super::{ConfigDescription, ConfigDescriptionParameter, ConfigValue, Configuration, ParameterType};
use crate::error::{ConfigValidationError, ParameterViolation, ViolationKind};

impl ConfigDescription {
    /// Validate `config` against the declared parameters.
    ///
    /// Parameters not declared here are accepted as-is. Every violation is
    /// collected before returning, so callers get the full picture at once.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigValidationError`] listing each offending parameter.
    pub fn validate(&self, config: &Configuration) -> Result<(), ConfigValidationError> {
        let violations: Vec<ParameterViolation> = self
            .parameters
            .iter()
            .filter_map(|param| {
                check_parameter(param, config.get(&param.name)).map(|kind| ParameterViolation {
                    parameter: param.name.clone(),
                    kind,
                })
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConfigValidationError { violations })
        }
    }
}

fn check_parameter(param: &ConfigDescriptionParameter, value: Option<&ConfigValue>) -> Option<ViolationKind> {
    let Some(value) = value else {
        return param.required.then_some(ViolationKind::Required);
    };

    if let ConfigValue::List(values) = value {
        if !param.multiple {
            return Some(ViolationKind::Multiplicity);
        }
        if param.multiple_limit.is_some_and(|limit| values.len() > limit) {
            return Some(ViolationKind::Multiplicity);
        }
        if param.required && values.is_empty() {
            return Some(ViolationKind::Required);
        }
        return values.iter().find_map(|v| check_single(param, v));
    }

    check_single(param, value)
}

fn check_single(param: &ConfigDescriptionParameter, value: &ConfigValue) -> Option<ViolationKind> {
    if !type_matches(param.parameter_type, value) {
        return Some(ViolationKind::TypeMismatch {
            expected: param.parameter_type.as_str(),
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let measure = match value {
        ConfigValue::Text(text) => Some(text.chars().count() as f64),
        other => other.as_f64(),
    };
    if let Some(measure) = measure {
        if let Some(min) = param.min.filter(|min| measure < *min) {
            return Some(ViolationKind::BelowMin { min: min.to_string() });
        }
        if let Some(max) = param.max.filter(|max| measure > *max) {
            return Some(ViolationKind::AboveMax { max: max.to_string() });
        }
    }

    if let (Some(pattern), ConfigValue::Text(text)) = (&param.pattern, value)
        && !pattern.matches(text)
    {
        return Some(ViolationKind::PatternMismatch {
            pattern: pattern.to_string(),
        });
    }

    if param.limit_to_options && !param.options.is_empty() {
        let raw = value.to_string();
        if !param.options.iter().any(|opt| opt.value == raw) {
            return Some(ViolationKind::NotAnOption);
        }
    }

    None
}

fn type_matches(expected: ParameterType, value: &ConfigValue) -> bool {
    matches!(
        (expected, value),
        (ParameterType::Text, ConfigValue::Text(_))
            | (ParameterType::Integer, ConfigValue::Integer(_))
            | (ParameterType::Decimal, ConfigValue::Decimal(_) | ConfigValue::Integer(_))
            | (ParameterType::Boolean, ConfigValue::Bool(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn description() -> ConfigDescription {
        ConfigDescription::builder("thing-type:acme:sensor")
            .parameter(
                ConfigDescriptionParameter::builder("host", ParameterType::Text)
                    .required(true)
                    .pattern("[a-z0-9.]+")
                    .build(),
            )
            .parameter(
                ConfigDescriptionParameter::builder("port", ParameterType::Integer)
                    .min(1.0)
                    .max(65535.0)
                    .build(),
            )
            .parameter(
                ConfigDescriptionParameter::builder("mode", ParameterType::Text)
                    .option("fast", "Fast")
                    .option("slow", "Slow")
                    .build(),
            )
            .parameter(
                ConfigDescriptionParameter::builder("ratio", ParameterType::Decimal).build(),
            )
            .parameter(
                ConfigDescriptionParameter::builder("ids", ParameterType::Integer)
                    .multiple(true)
                    .multiple_limit(2)
                    .build(),
            )
            .build()
    }

    #[test]
    fn should_accept_valid_configuration() {
        let config = Configuration::new()
            .with("host", "hub.local")
            .with("port", 8080_i64)
            .with("mode", "fast")
            .with("ratio", 2_i64);
        assert!(description().validate(&config).is_ok());
    }

    #[test]
    fn should_accept_undeclared_parameters() {
        let config = Configuration::new().with("host", "a").with("extra", true);
        assert!(description().validate(&config).is_ok());
    }

    #[test]
    fn should_report_missing_required_parameter() {
        let err = description().validate(&Configuration::new()).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].kind, ViolationKind::Required);
    }

    #[test]
    fn should_report_type_mismatch() {
        let config = Configuration::new().with("host", "a").with("port", "eighty");
        let err = description().validate(&config).unwrap_err();
        assert_eq!(
            err.violations[0].kind,
            ViolationKind::TypeMismatch { expected: "integer" }
        );
    }

    #[test]
    fn should_report_every_offending_parameter() {
        let config = Configuration::new()
            .with("host", "UPPER")
            .with("port", 0_i64)
            .with("mode", "medium");
        let err = description().validate(&config).unwrap_err();
        assert_eq!(err.violations.len(), 3);
        assert!(err.contains("host"));
        assert!(err.contains("port"));
        assert!(err.contains("mode"));
    }

    #[test]
    fn should_reject_list_for_single_valued_parameter() {
        let config = Configuration::new()
            .with("host", "a")
            .with("port", ConfigValue::List(vec![ConfigValue::Integer(1)]));
        let err = description().validate(&config).unwrap_err();
        assert_eq!(err.violations[0].kind, ViolationKind::Multiplicity);
    }

    #[test]
    fn should_enforce_multiple_limit() {
        let ids = ConfigValue::List(vec![
            ConfigValue::Integer(1),
            ConfigValue::Integer(2),
            ConfigValue::Integer(3),
        ]);
        let config = Configuration::new().with("host", "a").with("ids", ids);
        let err = description().validate(&config).unwrap_err();
        assert_eq!(err.violations[0].kind, ViolationKind::Multiplicity);
    }

    #[test]
    fn should_check_text_length_against_bounds() {
        let desc = ConfigDescription::builder("x:y")
            .parameter(
                ConfigDescriptionParameter::builder("code", ParameterType::Text)
                    .min(4.0)
                    .build(),
            )
            .build();
        let err = desc
            .validate(&Configuration::new().with("code", "abc"))
            .unwrap_err();
        assert!(matches!(err.violations[0].kind, ViolationKind::BelowMin { .. }));
    }

    #[test]
    fn should_allow_free_values_when_not_limited_to_options() {
        let desc = ConfigDescription::builder("x:y")
            .parameter(
                ConfigDescriptionParameter::builder("mode", ParameterType::Text)
                    .option("fast", "Fast")
                    .limit_to_options(false)
                    .build(),
            )
            .build();
        assert!(desc.validate(&Configuration::new().with("mode", "other")).is_ok());
    }

    #[test]
    fn should_ignore_pattern_that_does_not_compile() {
        let desc = ConfigDescription::builder("x:y")
            .parameter(
                ConfigDescriptionParameter::builder("code", ParameterType::Text)
                    .pattern("[unclosed")
                    .build(),
            )
            .build();
        let pattern = desc.parameters[0].pattern.as_ref().unwrap();

        assert!(!pattern.is_valid());
        assert_eq!(pattern.as_str(), "[unclosed");
        assert!(desc.validate(&Configuration::new().with("code", "anything")).is_ok());
    }

    #[test]
    fn should_match_pattern_against_whole_value() {
        let err = description()
            .validate(&Configuration::new().with("host", "hub.local!"))
            .unwrap_err();
        assert_eq!(
            err.violations[0].kind,
            ViolationKind::PatternMismatch {
                pattern: "[a-z0-9.]+".to_string()
            }
        );
    }
}
