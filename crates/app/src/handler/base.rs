//! State shared by every handler: the thing snapshot and the callback slot.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use smarthome_domain::command::{Command, State};
use smarthome_domain::config::Configuration;
use smarthome_domain::error::ThingError;
use smarthome_domain::thing::{Thing, ThingStatus, ThingStatusDetail, ThingStatusInfo};
use smarthome_domain::uid::ChannelUID;

use crate::lock;
use crate::ports::ThingHandlerCallback;

struct Slot {
    thing: Thing,
    callback: Option<Arc<dyn ThingHandlerCallback>>,
}

/// Holds a handler's current [`Thing`] snapshot and its callback.
///
/// Both live under one mutex: every emitter checks the callback slot under
/// that mutex, clones what it needs, and invokes the callback only after
/// releasing it. Emitting with an empty slot fails with
/// [`ThingError::IllegalState`].
pub struct BaseThingHandler {
    slot: Mutex<Slot>,
    updates: Mutex<()>,
}

impl BaseThingHandler {
    #[must_use]
    pub fn new(thing: Thing) -> Self {
        Self {
            slot: Mutex::new(Slot {
                thing,
                callback: None,
            }),
            updates: Mutex::new(()),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn thing(&self) -> Thing {
        lock(&self.slot).thing.clone()
    }

    #[must_use]
    pub fn configuration(&self) -> Configuration {
        lock(&self.slot).thing.configuration().clone()
    }

    /// Whether the thing's status is `UNKNOWN`, `ONLINE` or `OFFLINE`.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        lock(&self.slot).thing.status().is_initialized()
    }

    pub fn set_callback(&self, callback: Option<Arc<dyn ThingHandlerCallback>>) {
        lock(&self.slot).callback = callback;
    }

    #[must_use]
    pub fn has_callback(&self) -> bool {
        lock(&self.slot).callback.is_some()
    }

    /// Replace the snapshot without notifying anyone.
    pub fn set_thing(&self, thing: Thing) {
        lock(&self.slot).thing = thing;
    }

    /// Serialize configuration and thing updates of one handler.
    pub fn lock_updates(&self) -> MutexGuard<'_, ()> {
        lock(&self.updates)
    }

    /// Snapshot and callback, or an error when no callback is attached.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::IllegalState`] when the callback slot is empty.
    pub fn registered(&self) -> Result<(Thing, Arc<dyn ThingHandlerCallback>), ThingError> {
        let slot = lock(&self.slot);
        match &slot.callback {
            Some(callback) => Ok((slot.thing.clone(), Arc::clone(callback))),
            None => Err(ThingError::IllegalState("handler has no callback attached")),
        }
    }

    fn channel_uid(thing: &Thing, channel_id: &str) -> Result<ChannelUID, ThingError> {
        Ok(ChannelUID::new(thing.uid(), channel_id)?)
    }

    /// Report a new state for the channel `channel_id` of this thing.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::IllegalState`] without a callback, or a UID
    /// error for an invalid channel id.
    pub fn update_state(&self, channel_id: &str, state: State) -> Result<(), ThingError> {
        let (thing, callback) = self.registered()?;
        let channel_uid = Self::channel_uid(&thing, channel_id)?;
        callback.state_updated(&channel_uid, state);
        Ok(())
    }

    /// Send a command to the channel `channel_id` of this thing.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::IllegalState`] without a callback.
    pub fn post_command(&self, channel_id: &str, command: Command) -> Result<(), ThingError> {
        let (thing, callback) = self.registered()?;
        let channel_uid = Self::channel_uid(&thing, channel_id)?;
        callback.post_command(&channel_uid, command);
        Ok(())
    }

    /// Fire the trigger channel `channel_id` with `event`.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::IllegalState`] without a callback.
    pub fn trigger_channel(&self, channel_id: &str, event: &str) -> Result<(), ThingError> {
        let (thing, callback) = self.registered()?;
        let channel_uid = Self::channel_uid(&thing, channel_id)?;
        callback.channel_triggered(&thing, &channel_uid, event);
        Ok(())
    }

    /// Change the thing's status with detail `NONE`.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::IllegalState`] without a callback.
    pub fn update_status(&self, status: ThingStatus) -> Result<(), ThingError> {
        self.update_status_info(ThingStatusInfo::of(status))
    }

    /// Change the thing's status, detail and description.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::IllegalState`] without a callback.
    pub fn update_status_detail(
        &self,
        status: ThingStatus,
        detail: ThingStatusDetail,
        description: Option<String>,
    ) -> Result<(), ThingError> {
        self.update_status_info(ThingStatusInfo::new(status, detail, description))
    }

    fn update_status_info(&self, info: ThingStatusInfo) -> Result<(), ThingError> {
        let (thing, callback) = {
            let mut slot = lock(&self.slot);
            let Some(callback) = slot.callback.clone() else {
                return Err(ThingError::IllegalState("handler has no callback attached"));
            };
            slot.thing = slot.thing.with_status_info(info.clone());
            (slot.thing.clone(), callback)
        };
        callback.status_updated(&thing, info);
        Ok(())
    }

    /// Swap in `thing` and notify the runtime; restore the previous
    /// snapshot if the runtime rejects it.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::IllegalState`] without a callback, or the
    /// runtime's rejection.
    pub fn update_thing(&self, thing: Thing) -> Result<(), ThingError> {
        let (previous, callback) = {
            let mut slot = lock(&self.slot);
            let Some(callback) = slot.callback.clone() else {
                return Err(ThingError::IllegalState("handler has no callback attached"));
            };
            let previous = std::mem::replace(&mut slot.thing, thing.clone());
            (previous, callback)
        };
        if let Err(err) = callback.thing_updated(&thing) {
            tracing::warn!(thing = %thing.uid(), %err, "thing update rejected, snapshot restored");
            lock(&self.slot).thing = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Merge `properties` into the thing's properties.
    ///
    /// # Errors
    ///
    /// Same as [`update_thing`](Self::update_thing).
    pub fn update_properties(&self, properties: &BTreeMap<String, String>) -> Result<(), ThingError> {
        let thing = self.thing().with_properties(properties);
        self.update_thing(thing)
    }

    /// Replace the thing's configuration.
    ///
    /// # Errors
    ///
    /// Same as [`update_thing`](Self::update_thing).
    pub fn update_configuration(&self, configuration: Configuration) -> Result<(), ThingError> {
        let thing = self.thing().with_configuration(configuration);
        self.update_thing(thing)
    }

    /// Snapshot of the bridge this thing is attached to.
    #[must_use]
    pub fn bridge(&self) -> Option<Thing> {
        let (thing, callback) = self.registered().ok()?;
        callback.bridge(thing.bridge_uid()?)
    }
}
