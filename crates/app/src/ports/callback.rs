//! Handler callback port: everything a handler emits goes through here.

use smarthome_domain::command::{Command, State};
use smarthome_domain::config::Configuration;
use smarthome_domain::error::{ConfigValidationError, ThingError};
use smarthome_domain::thing::{Thing, ThingStatusInfo};
use smarthome_domain::uid::{ChannelUID, ThingUID};

/// Runtime side of a handler: receives state, status, and thing changes.
///
/// A handler holds at most one callback, attached after construction and
/// detached before disposal.
pub trait ThingHandlerCallback: Send + Sync {
    /// A state channel reported a new value.
    fn state_updated(&self, channel_uid: &ChannelUID, state: State);

    /// The handler sends a command to another channel.
    fn post_command(&self, channel_uid: &ChannelUID, command: Command);

    /// A trigger channel fired.
    fn channel_triggered(&self, thing: &Thing, channel_uid: &ChannelUID, event: &str);

    /// The thing's status changed.
    fn status_updated(&self, thing: &Thing, status: ThingStatusInfo);

    /// The handler replaced its thing snapshot (configuration, properties, …).
    ///
    /// # Errors
    ///
    /// Returns an error when the runtime rejects the new snapshot; the
    /// handler then restores its previous snapshot.
    fn thing_updated(&self, thing: &Thing) -> Result<(), ThingError>;

    /// Validate proposed configuration `parameters` for `thing`.
    ///
    /// # Errors
    ///
    /// Returns every violated parameter constraint.
    fn validate_configuration_parameters(
        &self,
        thing: &Thing,
        parameters: &Configuration,
    ) -> Result<(), ConfigValidationError>;

    /// Snapshot of the bridge with the given UID.
    fn bridge(&self, bridge_uid: &ThingUID) -> Option<Thing>;
}
