//! Thing handlers: the runtime objects driving a thing's behaviour.
//!
//! A handler is constructed by a [`ThingHandlerFactory`](crate::handler_factory::ThingHandlerFactory),
//! receives its callback, and is initialized. `initialize` and `dispose` must
//! return quickly; long work goes to the [`Scheduler`] and reports back
//! through the callback. Optional capabilities (bridging, configuration
//! status) are exposed through `as_*` accessors instead of a class hierarchy.

mod base;
mod scheduler;

pub use base::BaseThingHandler;
pub use scheduler::{ScheduledTask, Scheduler};

use std::sync::Arc;

use smarthome_domain::command::Command;
use smarthome_domain::config::Configuration;
use smarthome_domain::error::ThingError;
use smarthome_domain::thing::{Thing, ThingStatus, ThingStatusDetail, ThingStatusInfo};
use smarthome_domain::uid::ChannelUID;

use crate::ports::ThingHandlerCallback;

/// Drives one thing.
///
/// Implementors provide [`base`](Self::base), [`initialize`](Self::initialize)
/// and [`handle_command`](Self::handle_command); everything else has a
/// default built on [`BaseThingHandler`].
pub trait ThingHandler: Send + Sync {
    fn base(&self) -> &BaseThingHandler;

    /// Start working with the current thing; report a status through the
    /// callback (`UNKNOWN`, `ONLINE` or `OFFLINE`) now or later.
    fn initialize(&self);

    fn handle_command(&self, channel_uid: &ChannelUID, command: Command);

    /// Release resources. No commands or bridge notifications arrive after this.
    fn dispose(&self) {}

    fn thing(&self) -> Thing {
        self.base().thing()
    }

    fn set_callback(&self, callback: Option<Arc<dyn ThingHandlerCallback>>) {
        self.base().set_callback(callback);
    }

    /// Validate and apply configuration changes.
    ///
    /// Nothing is applied when validation fails. An initialized handler is
    /// disposed, reconfigured and initialized again; otherwise the new
    /// configuration is only stored.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::ConfigValidation`] naming every invalid
    /// parameter, [`ThingError::IllegalState`] without a callback, or the
    /// runtime's rejection of the new snapshot.
    fn handle_configuration_update(&self, parameters: &Configuration) -> Result<(), ThingError> {
        let base = self.base();
        let _updates = base.lock_updates();
        let (thing, callback) = base.registered()?;
        callback.validate_configuration_parameters(&thing, parameters)?;

        let configuration = thing.configuration().merged(parameters);
        if thing.status().is_initialized() {
            self.dispose();
            let applied = base.update_configuration(configuration);
            self.initialize();
            applied
        } else {
            base.update_configuration(configuration)
        }
    }

    /// The runtime replaced the thing: dispose, swap, initialize.
    fn thing_updated(&self, thing: Thing) {
        let base = self.base();
        let _updates = base.lock_updates();
        self.dispose();
        base.set_thing(thing);
        self.initialize();
    }

    /// A channel got linked: ask for its current value.
    fn channel_linked(&self, channel_uid: &ChannelUID) {
        self.handle_command(channel_uid, Command::Refresh);
    }

    fn channel_unlinked(&self, _channel_uid: &ChannelUID) {}

    /// The bridge's status changed.
    ///
    /// Bridge `ONLINE` brings a child that was `OFFLINE (BRIDGE_OFFLINE)`
    /// back `ONLINE`; bridge `OFFLINE` takes every child that is not already
    /// offline to `OFFLINE (BRIDGE_OFFLINE)`.
    fn bridge_status_changed(&self, bridge_status: &ThingStatusInfo) {
        let base = self.base();
        let current = base.thing().status_info().clone();
        let result = match bridge_status.status {
            ThingStatus::Online
                if current.status == ThingStatus::Offline
                    && current.detail == ThingStatusDetail::BridgeOffline =>
            {
                base.update_status(ThingStatus::Online)
            }
            ThingStatus::Offline if current.status != ThingStatus::Offline => {
                base.update_status_detail(ThingStatus::Offline, ThingStatusDetail::BridgeOffline, None)
            }
            _ => Ok(()),
        };
        if let Err(err) = result {
            tracing::debug!(thing = %base.thing().uid(), %err, "bridge status not propagated");
        }
    }

    /// The thing is being removed; must eventually report `REMOVED`.
    fn handle_removal(&self) {
        if let Err(err) = self.base().update_status(ThingStatus::Removed) {
            tracing::debug!(%err, "removal status not reported");
        }
    }

    fn as_bridge_handler(&self) -> Option<&dyn BridgeHandler> {
        None
    }

    fn as_config_status_provider(&self) -> Option<&dyn ConfigStatusProvider> {
        None
    }
}

/// Capability of handlers whose thing is a bridge.
pub trait BridgeHandler: Send + Sync {
    /// A child thing below this bridge became initialized.
    fn child_handler_initialized(&self, _child_handler: &Arc<dyn ThingHandler>, _child: &Thing) {}

    /// A child's handler was disposed.
    fn child_handler_disposed(&self, _child_handler: &Arc<dyn ThingHandler>, _child: &Thing) {}
}

/// Capability of handlers that can judge their own configuration.
pub trait ConfigStatusProvider: Send + Sync {
    fn config_status(&self) -> Vec<ConfigStatusMessage>;
}

/// Severity of a [`ConfigStatusMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigStatusKind {
    Information,
    Warning,
    Error,
    /// The value is accepted but not yet applied by the device.
    Pending,
}

/// One remark about a configuration parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStatusMessage {
    pub parameter: String,
    pub kind: ConfigStatusKind,
    pub message: String,
}

impl ConfigStatusMessage {
    #[must_use]
    pub fn new(parameter: impl Into<String>, kind: ConfigStatusKind, message: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            kind,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use smarthome_domain::command::State;
    use smarthome_domain::config::{
        ConfigDescription, ConfigDescriptionParameter, ConfigValue, ParameterType,
    };
    use smarthome_domain::error::ConfigValidationError;
    use smarthome_domain::uid::{ThingTypeUID, ThingUID};

    #[derive(Default)]
    struct RecordingCallback {
        states: Mutex<Vec<(ChannelUID, State)>>,
        statuses: Mutex<Vec<ThingStatusInfo>>,
        things: Mutex<Vec<Thing>>,
        description: Option<ConfigDescription>,
        reject_updates: bool,
    }

    impl ThingHandlerCallback for RecordingCallback {
        fn state_updated(&self, channel_uid: &ChannelUID, state: State) {
            self.states.lock().unwrap().push((channel_uid.clone(), state));
        }

        fn post_command(&self, _channel_uid: &ChannelUID, _command: Command) {}

        fn channel_triggered(&self, _thing: &Thing, _channel_uid: &ChannelUID, _event: &str) {}

        fn status_updated(&self, _thing: &Thing, status: ThingStatusInfo) {
            self.statuses.lock().unwrap().push(status);
        }

        fn thing_updated(&self, thing: &Thing) -> Result<(), ThingError> {
            if self.reject_updates {
                return Err(ThingError::InvalidArgument("rejected".to_string()));
            }
            self.things.lock().unwrap().push(thing.clone());
            Ok(())
        }

        fn validate_configuration_parameters(
            &self,
            thing: &Thing,
            parameters: &Configuration,
        ) -> Result<(), ConfigValidationError> {
            match &self.description {
                Some(description) => description.validate(&thing.configuration().merged(parameters)),
                None => Ok(()),
            }
        }

        fn bridge(&self, _bridge_uid: &ThingUID) -> Option<Thing> {
            None
        }
    }

    struct TestHandler {
        base: BaseThingHandler,
        initialized: AtomicUsize,
        disposed: AtomicUsize,
        commands: Mutex<Vec<(ChannelUID, Command)>>,
    }

    impl TestHandler {
        fn new(thing: Thing) -> Self {
            Self {
                base: BaseThingHandler::new(thing),
                initialized: AtomicUsize::new(0),
                disposed: AtomicUsize::new(0),
                commands: Mutex::new(Vec::new()),
            }
        }
    }

    impl ThingHandler for TestHandler {
        fn base(&self) -> &BaseThingHandler {
            &self.base
        }

        fn initialize(&self) {
            self.initialized.fetch_add(1, Ordering::SeqCst);
            self.base.update_status(ThingStatus::Online).unwrap();
        }

        fn handle_command(&self, channel_uid: &ChannelUID, command: Command) {
            self.commands.lock().unwrap().push((channel_uid.clone(), command));
        }

        fn dispose(&self) {
            self.disposed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn thing() -> Thing {
        let type_uid: ThingTypeUID = "acme:sensor".parse().unwrap();
        let uid = ThingUID::new(&type_uid, "dev1").unwrap();
        Thing::builder(type_uid, uid)
            .configuration(Configuration::new().with("refresh", 30_i64))
            .build()
    }

    fn description() -> ConfigDescription {
        ConfigDescription::builder("thing-type:acme:sensor")
            .parameter(
                ConfigDescriptionParameter::builder("refresh", ParameterType::Integer)
                    .min(1.0)
                    .build(),
            )
            .build()
    }

    fn attached(callback: RecordingCallback) -> (TestHandler, Arc<RecordingCallback>) {
        let handler = TestHandler::new(thing());
        let callback = Arc::new(callback);
        handler.set_callback(Some(callback.clone()));
        (handler, callback)
    }

    #[test]
    fn should_fail_update_state_without_callback() {
        let handler = TestHandler::new(thing());

        let result = handler.base().update_state("temp", State::Decimal(21.5));

        assert!(matches!(result, Err(ThingError::IllegalState(_))));
    }

    #[test]
    fn should_fail_every_emitter_once_callback_is_cleared() {
        let (handler, _callback) = attached(RecordingCallback::default());
        handler.set_callback(None);
        let base = handler.base();

        assert!(matches!(base.update_status(ThingStatus::Online), Err(ThingError::IllegalState(_))));
        assert!(matches!(base.post_command("temp", Command::Refresh), Err(ThingError::IllegalState(_))));
        assert!(matches!(base.trigger_channel("button", "PRESSED"), Err(ThingError::IllegalState(_))));
        assert!(matches!(base.update_thing(thing()), Err(ThingError::IllegalState(_))));
    }

    #[test]
    fn should_forward_state_with_full_channel_uid() {
        let (handler, callback) = attached(RecordingCallback::default());

        handler.base().update_state("temp", State::Decimal(21.5)).unwrap();

        let states = callback.states.lock().unwrap();
        assert_eq!(states[0].0.to_string(), "acme:sensor:dev1:temp");
        assert_eq!(states[0].1, State::Decimal(21.5));
    }

    #[test]
    fn should_reject_invalid_configuration_without_touching_thing() {
        let (handler, _callback) = attached(RecordingCallback {
            description: Some(description()),
            ..RecordingCallback::default()
        });
        handler.initialize();
        let before = handler.thing().configuration().clone();

        let result =
            handler.handle_configuration_update(&Configuration::new().with("refresh", "fast"));

        match result {
            Err(ThingError::ConfigValidation(err)) => assert!(err.contains("refresh")),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(handler.thing().configuration(), &before);
        assert_eq!(handler.initialized.load(Ordering::SeqCst), 1);
        assert_eq!(handler.disposed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn should_reinitialize_when_initialized_handler_is_reconfigured() {
        let (handler, callback) = attached(RecordingCallback {
            description: Some(description()),
            ..RecordingCallback::default()
        });
        handler.initialize();

        handler
            .handle_configuration_update(&Configuration::new().with("refresh", 10_i64))
            .unwrap();

        assert_eq!(handler.disposed.load(Ordering::SeqCst), 1);
        assert_eq!(handler.initialized.load(Ordering::SeqCst), 2);
        assert_eq!(
            handler.thing().configuration().get("refresh"),
            Some(&ConfigValue::Integer(10))
        );
        assert_eq!(callback.things.lock().unwrap().len(), 1);
    }

    #[test]
    fn should_only_store_configuration_when_not_initialized() {
        let (handler, callback) = attached(RecordingCallback::default());

        handler
            .handle_configuration_update(&Configuration::new().with("refresh", 10_i64))
            .unwrap();

        assert_eq!(handler.initialized.load(Ordering::SeqCst), 0);
        assert_eq!(handler.disposed.load(Ordering::SeqCst), 0);
        assert_eq!(callback.things.lock().unwrap().len(), 1);
    }

    #[test]
    fn should_restore_snapshot_when_runtime_rejects_update() {
        let (handler, _callback) = attached(RecordingCallback {
            reject_updates: true,
            ..RecordingCallback::default()
        });
        let mut properties = std::collections::BTreeMap::new();
        properties.insert("firmware".to_string(), "2.0".to_string());

        let result = handler.base().update_properties(&properties);

        assert!(result.is_err());
        assert!(handler.thing().properties().is_empty());
    }

    #[test]
    fn should_send_refresh_when_channel_linked() {
        let (handler, _callback) = attached(RecordingCallback::default());
        let channel_uid: ChannelUID = "acme:sensor:dev1:temp".parse().unwrap();

        handler.channel_linked(&channel_uid);

        let commands = handler.commands.lock().unwrap();
        assert_eq!(commands.as_slice(), &[(channel_uid, Command::Refresh)]);
    }

    #[test]
    fn should_follow_bridge_offline_and_back_online() {
        let (handler, _callback) = attached(RecordingCallback::default());
        handler.initialize();

        handler.bridge_status_changed(&ThingStatusInfo::new(
            ThingStatus::Offline,
            ThingStatusDetail::CommunicationError,
            None,
        ));
        let offline = handler.thing().status_info().clone();
        assert_eq!(offline.status, ThingStatus::Offline);
        assert_eq!(offline.detail, ThingStatusDetail::BridgeOffline);

        handler.bridge_status_changed(&ThingStatusInfo::of(ThingStatus::Online));
        assert_eq!(handler.thing().status_info(), &ThingStatusInfo::of(ThingStatus::Online));
    }

    #[test]
    fn should_keep_child_offline_for_its_own_reason() {
        let (handler, callback) = attached(RecordingCallback::default());
        handler
            .base()
            .update_status_detail(ThingStatus::Offline, ThingStatusDetail::CommunicationError, None)
            .unwrap();

        handler.bridge_status_changed(&ThingStatusInfo::of(ThingStatus::Offline));
        handler.bridge_status_changed(&ThingStatusInfo::of(ThingStatus::Online));

        assert_eq!(
            handler.thing().status_info().detail,
            ThingStatusDetail::CommunicationError
        );
        assert_eq!(callback.statuses.lock().unwrap().len(), 1);
    }

    #[test]
    fn should_report_removed_on_removal() {
        let (handler, callback) = attached(RecordingCallback::default());

        handler.handle_removal();

        assert_eq!(handler.thing().status(), ThingStatus::Removed);
        let statuses = callback.statuses.lock().unwrap();
        assert_eq!(statuses.last().map(|s| s.status), Some(ThingStatus::Removed));
    }

    #[test]
    fn should_dispose_and_initialize_on_thing_update() {
        let (handler, _callback) = attached(RecordingCallback::default());
        let replacement = thing().to_builder().label("Renamed").build();

        handler.thing_updated(replacement);

        assert_eq!(handler.disposed.load(Ordering::SeqCst), 1);
        assert_eq!(handler.initialized.load(Ordering::SeqCst), 1);
        assert_eq!(handler.thing().label(), Some("Renamed"));
    }
}
