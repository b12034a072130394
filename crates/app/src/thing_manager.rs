//! Thing manager: the runtime side of every handler.
//!
//! Owns the current snapshot of each thing, binds things to handlers through
//! the registered factories, implements [`ThingHandlerCallback`], and turns
//! everything handlers report into events.
//!
//! No lock is held while a handler or factory is called: handlers call back
//! into the manager synchronously.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, RwLock, Weak};

use smarthome_domain::command::{Command, State};
use smarthome_domain::config::Configuration;
use smarthome_domain::error::{ConfigValidationError, NotFoundError, ThingError};
use smarthome_domain::event::{Event, EventKind};
use smarthome_domain::thing::{Thing, ThingStatus, ThingStatusDetail, ThingStatusInfo};
use smarthome_domain::uid::{ChannelUID, ThingTypeUID, ThingUID};

use crate::handler::{ConfigStatusMessage, ThingHandler};
use crate::handler_factory::ThingHandlerFactory;
use crate::ports::{EventPublisher, ThingHandlerCallback};
use crate::registry::{ConfigDescriptionRegistry, ThingTypeRegistry};
use crate::{lock, read, write};

#[derive(Clone)]
struct Managed {
    thing: Thing,
    handler: Option<Arc<dyn ThingHandler>>,
    factory: Option<Arc<dyn ThingHandlerFactory>>,
}

fn thing_not_found(uid: &ThingUID) -> ThingError {
    NotFoundError {
        entity: "Thing",
        id: uid.to_string(),
    }
    .into()
}

/// Runtime for all things and their handlers.
pub struct ThingManager {
    this: Weak<ThingManager>,
    things: Mutex<BTreeMap<ThingUID, Managed>>,
    factories: RwLock<Vec<Arc<dyn ThingHandlerFactory>>>,
    thing_types: Arc<ThingTypeRegistry>,
    config_descriptions: Arc<ConfigDescriptionRegistry>,
    events: Arc<dyn EventPublisher>,
}

impl ThingManager {
    /// Create a manager publishing its events through `events`.
    #[must_use]
    pub fn new(
        thing_types: Arc<ThingTypeRegistry>,
        config_descriptions: Arc<ConfigDescriptionRegistry>,
        events: Arc<dyn EventPublisher>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            things: Mutex::new(BTreeMap::new()),
            factories: RwLock::new(Vec::new()),
            thing_types,
            config_descriptions,
            events,
        })
    }

    fn callback(&self) -> Option<Arc<dyn ThingHandlerCallback>> {
        self.this
            .upgrade()
            .map(|this| this as Arc<dyn ThingHandlerCallback>)
    }

    fn managed(&self, uid: &ThingUID) -> Option<Managed> {
        lock(&self.things).get(uid).cloned()
    }

    fn publish(&self, kind: EventKind) {
        self.events.publish(Event::new(kind));
    }

    fn factory_for(&self, thing_type_uid: &ThingTypeUID) -> Option<Arc<dyn ThingHandlerFactory>> {
        read(&self.factories)
            .iter()
            .find(|factory| factory.supports_thing_type(thing_type_uid))
            .cloned()
    }

    /// Register a factory and bind every waiting thing it supports.
    #[tracing::instrument(skip_all)]
    pub fn add_handler_factory(&self, factory: Arc<dyn ThingHandlerFactory>) {
        write(&self.factories).push(Arc::clone(&factory));
        let waiting: Vec<ThingUID> = lock(&self.things)
            .values()
            .filter(|m| m.handler.is_none())
            .filter(|m| m.thing.status() == ThingStatus::Uninitialized)
            .filter(|m| factory.supports_thing_type(m.thing.thing_type_uid()))
            .map(|m| m.thing.uid().clone())
            .collect();
        for uid in waiting {
            self.register(&uid);
        }
    }

    /// Withdraw a factory; its handlers are disposed and their things wait
    /// for another factory.
    #[tracing::instrument(skip_all)]
    pub fn remove_handler_factory(&self, factory: &Arc<dyn ThingHandlerFactory>) {
        write(&self.factories).retain(|f| !Arc::ptr_eq(f, factory));
        let bound: Vec<ThingUID> = lock(&self.things)
            .values()
            .filter(|m| m.factory.as_ref().is_some_and(|f| Arc::ptr_eq(f, factory)))
            .map(|m| m.thing.uid().clone())
            .collect();
        for uid in bound {
            self.unregister(&uid);
            self.apply_status(
                &uid,
                ThingStatusInfo::new(
                    ThingStatus::Uninitialized,
                    ThingStatusDetail::HandlerMissingError,
                    None,
                ),
            );
        }
    }

    /// Start managing `thing` and bind it to a handler when possible.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::InvalidArgument`] if a thing with the same UID
    /// is already managed.
    #[tracing::instrument(skip_all, fields(thing = %thing.uid()))]
    pub fn add_thing(&self, thing: Thing) -> Result<(), ThingError> {
        let uid = thing.uid().clone();
        {
            let mut things = lock(&self.things);
            if things.contains_key(&uid) {
                return Err(ThingError::InvalidArgument(format!(
                    "thing '{uid}' is already managed"
                )));
            }
            things.insert(
                uid.clone(),
                Managed {
                    thing: thing.with_status_info(ThingStatusInfo::default()),
                    handler: None,
                    factory: None,
                },
            );
        }
        tracing::info!("thing added");
        self.publish(EventKind::ThingAdded {
            thing_uid: uid.clone(),
        });
        self.register(&uid);
        Ok(())
    }

    /// Replace a managed thing from outside; its handler is told.
    ///
    /// A thing without a handler gets another registration attempt.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::NotFound`] for an unknown thing.
    #[tracing::instrument(skip_all, fields(thing = %thing.uid()))]
    pub fn update_thing(&self, thing: Thing) -> Result<(), ThingError> {
        let uid = thing.uid().clone();
        let (thing, handler) = {
            let mut things = lock(&self.things);
            let managed = things.get_mut(&uid).ok_or_else(|| thing_not_found(&uid))?;
            managed.thing = thing.with_status_info(managed.thing.status_info().clone());
            (managed.thing.clone(), managed.handler.clone())
        };
        self.publish(EventKind::ThingUpdated {
            thing_uid: uid.clone(),
        });
        match handler {
            Some(handler) => handler.thing_updated(thing),
            None => self.register(&uid),
        }
        Ok(())
    }

    /// Remove a thing: `REMOVING`, then the handler's removal, then on
    /// `REMOVED` the handler is unregistered and the thing dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::NotFound`] for an unknown thing.
    #[tracing::instrument(skip(self))]
    pub fn remove_thing(&self, uid: &ThingUID) -> Result<(), ThingError> {
        let handler = self
            .managed(uid)
            .ok_or_else(|| thing_not_found(uid))?
            .handler;
        self.apply_status(uid, ThingStatusInfo::of(ThingStatus::Removing));
        match handler {
            Some(handler) => handler.handle_removal(),
            None => self.apply_status(uid, ThingStatusInfo::of(ThingStatus::Removed)),
        }
        Ok(())
    }

    /// Apply configuration changes through the thing's handler (or directly
    /// when it has none).
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::NotFound`] for an unknown thing or
    /// [`ThingError::ConfigValidation`] when a parameter is invalid.
    #[tracing::instrument(skip(self, parameters))]
    pub fn update_configuration(
        &self,
        uid: &ThingUID,
        parameters: &Configuration,
    ) -> Result<(), ThingError> {
        let managed = self.managed(uid).ok_or_else(|| thing_not_found(uid))?;
        if let Some(handler) = managed.handler {
            return handler.handle_configuration_update(parameters);
        }

        self.validate(&managed.thing, parameters)?;
        let configuration = managed.thing.configuration().merged(parameters);
        if let Some(current) = lock(&self.things).get_mut(uid) {
            current.thing = current.thing.with_configuration(configuration);
        }
        self.publish(EventKind::ThingUpdated {
            thing_uid: uid.clone(),
        });
        self.register(uid);
        Ok(())
    }

    fn initialized_handler(
        &self,
        channel_uid: &ChannelUID,
    ) -> Result<Arc<dyn ThingHandler>, ThingError> {
        let uid = channel_uid.thing_uid();
        let managed = self.managed(uid).ok_or_else(|| thing_not_found(uid))?;
        if managed.thing.channel_by_uid(channel_uid).is_none() {
            return Err(NotFoundError {
                entity: "Channel",
                id: channel_uid.to_string(),
            }
            .into());
        }
        match managed.handler {
            Some(handler) if managed.thing.status().is_initialized() => Ok(handler),
            _ => Err(ThingError::IllegalState("thing is not initialized")),
        }
    }

    /// Deliver `command` to the handler of the channel's thing.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::NotFound`] for an unknown thing or channel and
    /// [`ThingError::IllegalState`] when the thing is not initialized.
    #[tracing::instrument(skip(self))]
    pub fn handle_command(&self, channel_uid: &ChannelUID, command: Command) -> Result<(), ThingError> {
        let handler = self.initialized_handler(channel_uid)?;
        handler.handle_command(channel_uid, command);
        Ok(())
    }

    /// Tell the handler a channel got linked.
    ///
    /// # Errors
    ///
    /// Same as [`handle_command`](Self::handle_command).
    pub fn link_channel(&self, channel_uid: &ChannelUID) -> Result<(), ThingError> {
        self.initialized_handler(channel_uid)?.channel_linked(channel_uid);
        Ok(())
    }

    /// Tell the handler a channel got unlinked.
    ///
    /// # Errors
    ///
    /// Same as [`handle_command`](Self::handle_command).
    pub fn unlink_channel(&self, channel_uid: &ChannelUID) -> Result<(), ThingError> {
        self.initialized_handler(channel_uid)?.channel_unlinked(channel_uid);
        Ok(())
    }

    #[must_use]
    pub fn thing(&self, uid: &ThingUID) -> Option<Thing> {
        self.managed(uid).map(|m| m.thing)
    }

    #[must_use]
    pub fn things(&self) -> Vec<Thing> {
        lock(&self.things).values().map(|m| m.thing.clone()).collect()
    }

    /// Things attached to the bridge `bridge_uid`.
    #[must_use]
    pub fn children_of(&self, bridge_uid: &ThingUID) -> Vec<Thing> {
        lock(&self.things)
            .values()
            .filter(|m| m.thing.bridge_uid() == Some(bridge_uid))
            .map(|m| m.thing.clone())
            .collect()
    }

    #[must_use]
    pub fn handler(&self, uid: &ThingUID) -> Option<Arc<dyn ThingHandler>> {
        self.managed(uid).and_then(|m| m.handler)
    }

    /// Configuration remarks of the thing's handler, if it can judge them.
    #[must_use]
    pub fn config_status(&self, uid: &ThingUID) -> Option<Vec<ConfigStatusMessage>> {
        let handler = self.handler(uid)?;
        handler
            .as_config_status_provider()
            .map(|provider| provider.config_status())
    }

    fn validate(&self, thing: &Thing, parameters: &Configuration) -> Result<(), ConfigValidationError> {
        let Some(uri) = self
            .thing_types
            .get(thing.thing_type_uid(), None)
            .and_then(|thing_type| thing_type.config_description_uri)
        else {
            return Ok(());
        };
        let Some(description) = self.config_descriptions.get(&uri, None) else {
            tracing::debug!(thing = %thing.uid(), %uri, "config description not found, nothing to validate");
            return Ok(());
        };
        description.validate(&thing.configuration().merged(parameters))
    }

    fn register(&self, uid: &ThingUID) {
        let Some(managed) = self.managed(uid) else {
            return;
        };
        if managed.handler.is_some() {
            return;
        }
        let thing = managed.thing;

        if let Some(bridge_uid) = thing.bridge_uid() {
            let bridge_ready = self
                .managed(bridge_uid)
                .is_some_and(|b| b.handler.is_some() && b.thing.status().is_initialized());
            if !bridge_ready {
                tracing::debug!(thing = %uid, bridge = %bridge_uid, "waiting for bridge");
                self.apply_status(
                    uid,
                    ThingStatusInfo::new(
                        ThingStatus::Uninitialized,
                        ThingStatusDetail::BridgeUninitialized,
                        None,
                    ),
                );
                return;
            }
        }

        let Some(factory) = self.factory_for(thing.thing_type_uid()) else {
            tracing::debug!(thing = %uid, "no handler factory supports this thing type");
            self.apply_status(
                uid,
                ThingStatusInfo::new(
                    ThingStatus::Uninitialized,
                    ThingStatusDetail::HandlerMissingError,
                    Some(format!("no handler for thing type '{}'", thing.thing_type_uid())),
                ),
            );
            return;
        };
        let Some(callback) = self.callback() else {
            return;
        };

        let initializing = ThingStatusInfo::of(ThingStatus::Initializing);
        self.apply_status(uid, initializing.clone());
        match factory.register_handler(thing.with_status_info(initializing), callback) {
            Ok(handler) => {
                let thing = {
                    let mut things = lock(&self.things);
                    match things.get_mut(uid) {
                        Some(managed) => {
                            managed.handler = Some(Arc::clone(&handler));
                            managed.factory = Some(Arc::clone(&factory));
                            Some(managed.thing.clone())
                        }
                        None => None,
                    }
                };
                let Some(thing) = thing else {
                    factory.unregister_handler(uid);
                    return;
                };
                tracing::debug!(thing = %uid, status = %thing.status_info(), "handler registered");
                if thing.status().is_initialized() {
                    if let Some(bridge_uid) = thing.bridge_uid() {
                        self.notify_child_initialized(bridge_uid, &handler, &thing);
                    }
                    if thing.is_bridge() {
                        self.register_waiting_children(uid);
                    }
                }
            }
            Err(err) => {
                tracing::error!(thing = %uid, %err, "handler registration failed");
                self.apply_status(
                    uid,
                    ThingStatusInfo::new(
                        ThingStatus::Uninitialized,
                        ThingStatusDetail::HandlerRegisteringError,
                        Some(err.to_string()),
                    ),
                );
            }
        }
    }

    fn unregister(&self, uid: &ThingUID) {
        let (handler, factory, thing) = {
            let mut things = lock(&self.things);
            let Some(managed) = things.get_mut(uid) else {
                return;
            };
            (
                managed.handler.take(),
                managed.factory.take(),
                managed.thing.clone(),
            )
        };
        if let (Some(handler), Some(factory)) = (handler, factory) {
            factory.unregister_handler(uid);
            if let Some(bridge_uid) = thing.bridge_uid() {
                self.notify_child_disposed(bridge_uid, &handler, &thing);
            }
        }
    }

    fn register_waiting_children(&self, bridge_uid: &ThingUID) {
        let waiting: Vec<ThingUID> = lock(&self.things)
            .values()
            .filter(|m| m.thing.bridge_uid() == Some(bridge_uid) && m.handler.is_none())
            .filter(|m| m.thing.status_info().detail == ThingStatusDetail::BridgeUninitialized)
            .map(|m| m.thing.uid().clone())
            .collect();
        for uid in waiting {
            self.register(&uid);
        }
    }

    fn detach_children(&self, bridge_uid: &ThingUID) {
        let attached: Vec<ThingUID> = lock(&self.things)
            .values()
            .filter(|m| m.thing.bridge_uid() == Some(bridge_uid) && m.handler.is_some())
            .map(|m| m.thing.uid().clone())
            .collect();
        for uid in attached {
            self.unregister(&uid);
            self.apply_status(
                &uid,
                ThingStatusInfo::new(
                    ThingStatus::Uninitialized,
                    ThingStatusDetail::BridgeUninitialized,
                    None,
                ),
            );
        }
    }

    fn bridge_handler_of(&self, bridge_uid: &ThingUID) -> Option<Arc<dyn ThingHandler>> {
        self.managed(bridge_uid).and_then(|m| m.handler)
    }

    fn notify_child_initialized(&self, bridge_uid: &ThingUID, child: &Arc<dyn ThingHandler>, thing: &Thing) {
        if let Some(bridge) = self.bridge_handler_of(bridge_uid)
            && let Some(bridge) = bridge.as_bridge_handler()
        {
            bridge.child_handler_initialized(child, thing);
        }
    }

    fn notify_child_disposed(&self, bridge_uid: &ThingUID, child: &Arc<dyn ThingHandler>, thing: &Thing) {
        if let Some(bridge) = self.bridge_handler_of(bridge_uid)
            && let Some(bridge) = bridge.as_bridge_handler()
        {
            bridge.child_handler_disposed(child, thing);
        }
    }

    fn apply_status(&self, uid: &ThingUID, info: ThingStatusInfo) {
        let (old, thing, handler) = {
            let mut things = lock(&self.things);
            let Some(managed) = things.get_mut(uid) else {
                tracing::debug!(thing = %uid, status = %info, "status for unmanaged thing ignored");
                return;
            };
            let old = managed.thing.status_info().clone();
            if info.status == ThingStatus::Removed && old.status != ThingStatus::Removing {
                let current = managed.thing.clone();
                let handler = managed.handler.clone();
                drop(things);
                tracing::warn!(thing = %uid, "REMOVED reported for a thing not being removed");
                // the handler already recorded REMOVED on its own snapshot
                if let Some(handler) = handler {
                    handler.base().set_thing(current);
                }
                return;
            }
            managed.thing = managed.thing.with_status_info(info.clone());
            (old, managed.thing.clone(), managed.handler.clone())
        };

        if old != info {
            tracing::debug!(thing = %uid, from = %old, to = %info, "status changed");
            self.publish(EventKind::ThingStatusInfoChanged {
                thing_uid: uid.clone(),
                old: old.clone(),
                new: info.clone(),
            });
        }
        if info.status == ThingStatus::Removed {
            self.finish_removal(uid);
            return;
        }

        let was_initialized = old.status.is_initialized();
        let is_initialized = info.status.is_initialized();
        if thing.is_bridge() {
            if is_initialized && old != info {
                self.propagate_bridge_status(uid, &info);
            }
            if is_initialized && !was_initialized && handler.is_some() {
                self.register_waiting_children(uid);
            }
            if was_initialized && !is_initialized {
                self.detach_children(uid);
            }
        }
        if is_initialized
            && !was_initialized
            && let (Some(bridge_uid), Some(handler)) = (thing.bridge_uid(), handler.as_ref())
        {
            self.notify_child_initialized(bridge_uid, handler, &thing);
        }
    }

    fn propagate_bridge_status(&self, bridge_uid: &ThingUID, info: &ThingStatusInfo) {
        let children: Vec<Arc<dyn ThingHandler>> = lock(&self.things)
            .values()
            .filter(|m| m.thing.bridge_uid() == Some(bridge_uid))
            .filter(|m| m.thing.status().is_initialized())
            .filter_map(|m| m.handler.clone())
            .collect();
        for child in children {
            child.bridge_status_changed(info);
        }
    }

    fn finish_removal(&self, uid: &ThingUID) {
        self.unregister(uid);
        if lock(&self.things).remove(uid).is_some() {
            tracing::info!(thing = %uid, "thing removed");
            self.publish(EventKind::ThingRemoved {
                thing_uid: uid.clone(),
            });
        }
    }
}

impl ThingHandlerCallback for ThingManager {
    fn state_updated(&self, channel_uid: &ChannelUID, state: State) {
        self.publish(EventKind::ChannelStateUpdated {
            channel_uid: channel_uid.clone(),
            state,
        });
    }

    fn post_command(&self, channel_uid: &ChannelUID, command: Command) {
        self.publish(EventKind::CommandPosted {
            channel_uid: channel_uid.clone(),
            command,
        });
    }

    fn channel_triggered(&self, _thing: &Thing, channel_uid: &ChannelUID, event: &str) {
        self.publish(EventKind::ChannelTriggered {
            channel_uid: channel_uid.clone(),
            event: event.to_string(),
        });
    }

    fn status_updated(&self, thing: &Thing, status: ThingStatusInfo) {
        self.apply_status(thing.uid(), status);
    }

    fn thing_updated(&self, thing: &Thing) -> Result<(), ThingError> {
        let uid = thing.uid();
        {
            let mut things = lock(&self.things);
            let managed = things.get_mut(uid).ok_or_else(|| thing_not_found(uid))?;
            if managed.thing.thing_type_uid() != thing.thing_type_uid() {
                return Err(ThingError::InvalidArgument(format!(
                    "thing '{uid}' cannot change its type"
                )));
            }
            managed.thing = thing.with_status_info(managed.thing.status_info().clone());
        }
        self.publish(EventKind::ThingUpdated {
            thing_uid: uid.clone(),
        });
        Ok(())
    }

    fn validate_configuration_parameters(
        &self,
        thing: &Thing,
        parameters: &Configuration,
    ) -> Result<(), ConfigValidationError> {
        self.validate(thing, parameters)
    }

    fn bridge(&self, bridge_uid: &ThingUID) -> Option<Thing> {
        self.thing(bridge_uid)
    }
}
