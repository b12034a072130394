//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`ThingError`]
//! via `#[from]` where the error crosses the handler boundary.

use std::fmt;

/// A UID string could not be parsed or one of its segments is invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UidError {
    /// The UID has fewer segments than its kind requires.
    #[error("UID '{uid}' must have at least {expected} segments")]
    TooFewSegments {
        /// The offending UID text.
        uid: String,
        /// Minimum segment count.
        expected: usize,
    },

    /// The UID has more segments than its kind allows.
    #[error("UID '{uid}' must have exactly {expected} segments")]
    TooManySegments {
        /// The offending UID text.
        uid: String,
        /// Exact segment count.
        expected: usize,
    },

    /// A segment is empty or contains characters outside `[A-Za-z0-9_-]`.
    #[error("UID segment '{segment}' is invalid")]
    InvalidSegment {
        /// The offending segment.
        segment: String,
    },
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} '{id}' not found")]
pub struct NotFoundError {
    /// Kind of the missing object (`"Thing"`, `"ThingType"`, …).
    pub entity: &'static str,
    /// Identifier that was looked up.
    pub id: String,
}

/// One configuration parameter that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterViolation {
    /// Parameter name.
    pub parameter: String,
    /// What constraint was violated.
    pub kind: ViolationKind,
}

/// The constraint a [`ParameterViolation`] refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// A required parameter is missing or null.
    Required,
    /// The value does not have the declared type.
    TypeMismatch {
        /// Declared parameter type.
        expected: &'static str,
    },
    /// Numeric value (or text length) below the declared minimum.
    BelowMin {
        /// Declared minimum.
        min: String,
    },
    /// Numeric value (or text length) above the declared maximum.
    AboveMax {
        /// Declared maximum.
        max: String,
    },
    /// Text value does not match the declared pattern.
    PatternMismatch {
        /// Declared pattern.
        pattern: String,
    },
    /// Value is not one of the declared options.
    NotAnOption,
    /// A list was given for a single-valued parameter, or too many entries.
    Multiplicity,
}

impl fmt::Display for ParameterViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::Required => write!(f, "'{}' is required", self.parameter),
            ViolationKind::TypeMismatch { expected } => {
                write!(f, "'{}' must be of type {expected}", self.parameter)
            }
            ViolationKind::BelowMin { min } => {
                write!(f, "'{}' must be at least {min}", self.parameter)
            }
            ViolationKind::AboveMax { max } => {
                write!(f, "'{}' must be at most {max}", self.parameter)
            }
            ViolationKind::PatternMismatch { pattern } => {
                write!(f, "'{}' must match pattern {pattern}", self.parameter)
            }
            ViolationKind::NotAnOption => {
                write!(f, "'{}' must be one of the declared options", self.parameter)
            }
            ViolationKind::Multiplicity => {
                write!(f, "'{}' has an invalid number of values", self.parameter)
            }
        }
    }
}

/// Proposed configuration parameters failed their declared constraints.
///
/// Lists every offending parameter, never only the first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid configuration: {}", join_violations(.violations))]
pub struct ConfigValidationError {
    /// All violations found, in parameter declaration order.
    pub violations: Vec<ParameterViolation>,
}

impl ConfigValidationError {
    /// Whether the named parameter is among the violations.
    #[must_use]
    pub fn contains(&self, parameter: &str) -> bool {
        self.violations.iter().any(|v| v.parameter == parameter)
    }
}

fn join_violations(violations: &[ParameterViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised by the thing/handler layer.
#[derive(Debug, thiserror::Error)]
pub enum ThingError {
    /// An operation was attempted outside the handler's registered lifetime.
    #[error("illegal state: {0}")]
    IllegalState(&'static str),

    /// A caller-supplied argument is unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The target does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// A UID could not be built.
    #[error("invalid UID")]
    Uid(#[from] UidError),

    /// Configuration parameters failed validation.
    #[error(transparent)]
    ConfigValidation(#[from] ConfigValidationError),

    /// A handler factory could not build a handler.
    #[error("failed to register handler for '{thing}'")]
    HandlerRegistration {
        /// UID of the thing that has no handler.
        thing: String,
        /// Underlying cause.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
