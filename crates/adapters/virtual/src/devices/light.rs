//! Virtual light: remembers whether it is on.

use std::sync::Mutex;

use smarthome_app::handler::{BaseThingHandler, ThingHandler};
use smarthome_domain::command::{Command, State};
use smarthome_domain::thing::Thing;
use smarthome_domain::uid::ChannelUID;

use super::{lock, report_attached_status};

/// Channel holding the on/off state.
pub const POWER: &str = "power";

/// Handler of `virtual:light`.
pub struct LightHandler {
    base: BaseThingHandler,
    power: Mutex<bool>,
}

impl LightHandler {
    #[must_use]
    pub fn new(thing: Thing) -> Self {
        Self {
            base: BaseThingHandler::new(thing),
            power: Mutex::new(false),
        }
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        *lock(&self.power)
    }

    fn report_power(&self, on: bool) {
        if let Err(err) = self.base.update_state(POWER, State::OnOff(on)) {
            tracing::debug!(%err, "power state not reported");
        }
    }
}

impl ThingHandler for LightHandler {
    fn base(&self) -> &BaseThingHandler {
        &self.base
    }

    fn initialize(&self) {
        if let Err(err) = report_attached_status(&self.base) {
            tracing::debug!(%err, "light status not reported");
        }
    }

    fn handle_command(&self, channel_uid: &ChannelUID, command: Command) {
        if channel_uid.id_without_group() != POWER {
            tracing::debug!(channel = %channel_uid, "unknown light channel");
            return;
        }
        match command {
            Command::OnOff(on) => {
                *lock(&self.power) = on;
                self.report_power(on);
            }
            Command::Refresh => self.report_power(self.is_on()),
            other => {
                tracing::warn!(channel = %channel_uid, command = ?other, "light only understands on/off");
            }
        }
    }
}
