//! Virtual hub: a bridge that "connects" in the background.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use smarthome_app::handler::{
    BaseThingHandler, BridgeHandler, ScheduledTask, Scheduler, ThingHandler,
};
use smarthome_domain::command::Command;
use smarthome_domain::config::ConfigValue;
use smarthome_domain::thing::{Thing, ThingStatus, ThingStatusDetail};
use smarthome_domain::uid::{ChannelUID, ThingUID};

use super::lock;

/// Configuration parameter deciding whether the simulated gateway answers.
pub const REACHABLE: &str = "reachable";

/// Bridge handler of `virtual:hub`.
///
/// Reports `UNKNOWN` right away, then `ONLINE` (or `OFFLINE
/// (COMMUNICATION_ERROR)` when `reachable` is false) from a background task.
pub struct HubHandler {
    base: Arc<BaseThingHandler>,
    scheduler: Scheduler,
    connecting: Mutex<Option<ScheduledTask>>,
    children: Mutex<BTreeSet<ThingUID>>,
}

impl HubHandler {
    #[must_use]
    pub fn new(thing: Thing, scheduler: Scheduler) -> Self {
        Self {
            base: Arc::new(BaseThingHandler::new(thing)),
            scheduler,
            connecting: Mutex::new(None),
            children: Mutex::new(BTreeSet::new()),
        }
    }

    /// Things whose handlers are initialized below this hub.
    #[must_use]
    pub fn children(&self) -> Vec<ThingUID> {
        lock(&self.children).iter().cloned().collect()
    }

    fn reachable(&self) -> bool {
        self.base
            .configuration()
            .get(REACHABLE)
            .and_then(ConfigValue::as_bool)
            .unwrap_or(true)
    }
}

impl ThingHandler for HubHandler {
    fn base(&self) -> &BaseThingHandler {
        &self.base
    }

    fn initialize(&self) {
        if let Err(err) = self.base.update_status(ThingStatus::Unknown) {
            tracing::debug!(%err, "hub status not reported");
            return;
        }
        let reachable = self.reachable();
        let base = Arc::clone(&self.base);
        let task = self.scheduler.spawn(async move {
            let result = if reachable {
                base.update_status(ThingStatus::Online)
            } else {
                base.update_status_detail(
                    ThingStatus::Offline,
                    ThingStatusDetail::CommunicationError,
                    Some("gateway does not answer".to_string()),
                )
            };
            match result {
                Ok(()) => tracing::debug!(thing = %base.thing().uid(), reachable, "hub connection settled"),
                Err(err) => tracing::debug!(%err, "hub connection result dropped"),
            }
        });
        if let Some(previous) = lock(&self.connecting).replace(task) {
            previous.cancel();
        }
    }

    fn handle_command(&self, channel_uid: &ChannelUID, command: Command) {
        tracing::debug!(channel = %channel_uid, ?command, "hub has no channels, command ignored");
    }

    fn dispose(&self) {
        if let Some(task) = lock(&self.connecting).take() {
            task.cancel();
        }
    }

    fn as_bridge_handler(&self) -> Option<&dyn BridgeHandler> {
        Some(self)
    }
}

impl BridgeHandler for HubHandler {
    fn child_handler_initialized(&self, _child_handler: &Arc<dyn ThingHandler>, child: &Thing) {
        tracing::debug!(hub = %self.base.thing().uid(), child = %child.uid(), "device attached");
        lock(&self.children).insert(child.uid().clone());
    }

    fn child_handler_disposed(&self, _child_handler: &Arc<dyn ThingHandler>, child: &Thing) {
        tracing::debug!(hub = %self.base.thing().uid(), child = %child.uid(), "device detached");
        lock(&self.children).remove(child.uid());
    }
}
