//! Thing lifecycle status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a thing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThingStatus {
    #[default]
    Uninitialized,
    Initializing,
    Unknown,
    Online,
    Offline,
    Removing,
    Removed,
}

impl ThingStatus {
    /// Whether a handler has completed initialization.
    ///
    /// Only [`Unknown`](Self::Unknown), [`Online`](Self::Online) and
    /// [`Offline`](Self::Offline) count; commands and updates are only
    /// dispatched to handlers in one of these states.
    #[must_use]
    pub fn is_initialized(self) -> bool {
        matches!(self, Self::Unknown | Self::Online | Self::Offline)
    }
}

impl fmt::Display for ThingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uninitialized => "UNINITIALIZED",
            Self::Initializing => "INITIALIZING",
            Self::Unknown => "UNKNOWN",
            Self::Online => "ONLINE",
            Self::Offline => "OFFLINE",
            Self::Removing => "REMOVING",
            Self::Removed => "REMOVED",
        })
    }
}

/// Sub-reason qualifying a [`ThingStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThingStatusDetail {
    #[default]
    None,
    HandlerMissingError,
    HandlerRegisteringError,
    HandlerInitializingError,
    HandlerConfigurationPending,
    ConfigurationPending,
    CommunicationError,
    ConfigurationError,
    BridgeOffline,
    FirmwareUpdating,
    DutyCycle,
    BridgeUninitialized,
    Gone,
    Disabled,
}

impl fmt::Display for ThingStatusDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "NONE",
            Self::HandlerMissingError => "HANDLER_MISSING_ERROR",
            Self::HandlerRegisteringError => "HANDLER_REGISTERING_ERROR",
            Self::HandlerInitializingError => "HANDLER_INITIALIZING_ERROR",
            Self::HandlerConfigurationPending => "HANDLER_CONFIGURATION_PENDING",
            Self::ConfigurationPending => "CONFIGURATION_PENDING",
            Self::CommunicationError => "COMMUNICATION_ERROR",
            Self::ConfigurationError => "CONFIGURATION_ERROR",
            Self::BridgeOffline => "BRIDGE_OFFLINE",
            Self::FirmwareUpdating => "FIRMWARE_UPDATING",
            Self::DutyCycle => "DUTY_CYCLE",
            Self::BridgeUninitialized => "BRIDGE_UNINITIALIZED",
            Self::Gone => "GONE",
            Self::Disabled => "DISABLED",
        })
    }
}

/// Status, detail, and optional human-readable description of a thing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThingStatusInfo {
    pub status: ThingStatus,
    pub detail: ThingStatusDetail,
    pub description: Option<String>,
}

impl ThingStatusInfo {
    #[must_use]
    pub fn new(status: ThingStatus, detail: ThingStatusDetail, description: Option<String>) -> Self {
        Self {
            status,
            detail,
            description,
        }
    }

    /// Status with detail [`ThingStatusDetail::None`] and no description.
    #[must_use]
    pub fn of(status: ThingStatus) -> Self {
        Self::new(status, ThingStatusDetail::None, None)
    }
}

impl fmt::Display for ThingStatusInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status)?;
        if self.detail != ThingStatusDetail::None {
            write!(f, " ({})", self.detail)?;
        }
        if let Some(description) = &self.description {
            write!(f, ": {description}")?;
        }
        Ok(())
    }
}
