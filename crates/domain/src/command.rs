//! Commands sent to channels and states reported by them.
//!
//! Deliberately minimal value types; richer unit-aware types are out of scope.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An instruction for a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Command {
    /// Ask the handler to report the channel's current state.
    Refresh,
    OnOff(bool),
    Decimal(f64),
    Text(String),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Refresh => f.write_str("REFRESH"),
            Self::OnOff(true) => f.write_str("ON"),
            Self::OnOff(false) => f.write_str("OFF"),
            Self::Decimal(v) => v.fmt(f),
            Self::Text(v) => f.write_str(v),
        }
    }
}

/// The current value of a state channel.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum State {
    /// The value cannot be determined.
    Undef,
    /// No value has been reported yet.
    #[default]
    Null,
    OnOff(bool),
    Decimal(f64),
    Text(String),
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undef => f.write_str("UNDEF"),
            Self::Null => f.write_str("NULL"),
            Self::OnOff(true) => f.write_str("ON"),
            Self::OnOff(false) => f.write_str("OFF"),
            Self::Decimal(v) => v.fmt(f),
            Self::Text(v) => f.write_str(v),
        }
    }
}
