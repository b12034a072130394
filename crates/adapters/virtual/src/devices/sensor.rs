//! Virtual sensor: periodic temperature and battery readings.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use smarthome_app::handler::{
    BaseThingHandler, ConfigStatusKind, ConfigStatusMessage, ConfigStatusProvider, ScheduledTask,
    Scheduler, ThingHandler,
};
use smarthome_domain::command::{Command, State};
use smarthome_domain::config::{ConfigValue, Configuration};
use smarthome_domain::thing::{Thing, ThingStatus};
use smarthome_domain::uid::ChannelUID;

use super::{lock, report_attached_status};

pub const TEMPERATURE: &str = "temperature";
pub const BATTERY: &str = "battery";
/// Seconds between readings.
pub const REFRESH: &str = "refresh";

const DEFAULT_REFRESH_SECS: u64 = 30;
const RECOMMENDED_MIN_REFRESH_SECS: i64 = 5;

/// One simulated measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub temperature: f64,
    pub battery: f64,
}

impl Reading {
    /// The `tick`-th reading: temperature cycles between 19 and 22.5 °C,
    /// the battery loses one percent every ten readings.
    #[must_use]
    pub fn at(tick: u32) -> Self {
        Self {
            temperature: 19.0 + f64::from(tick % 8) * 0.5,
            battery: f64::from(100 - (tick / 10).min(100)),
        }
    }
}

#[derive(Default)]
struct Readings {
    taken: AtomicU32,
}

impl Readings {
    fn next(&self) -> Reading {
        Reading::at(self.taken.fetch_add(1, Ordering::SeqCst))
    }

    fn latest(&self) -> Reading {
        Reading::at(self.taken.load(Ordering::SeqCst).saturating_sub(1))
    }
}

fn refresh_interval(configuration: &Configuration) -> Duration {
    let secs = configuration
        .get(REFRESH)
        .and_then(ConfigValue::as_i64)
        .and_then(|secs| u64::try_from(secs).ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_REFRESH_SECS);
    Duration::from_secs(secs)
}

fn publish(base: &BaseThingHandler, reading: Reading) {
    let result = base
        .update_state(TEMPERATURE, State::Decimal(reading.temperature))
        .and_then(|()| base.update_state(BATTERY, State::Decimal(reading.battery)));
    if let Err(err) = result {
        tracing::debug!(%err, "sensor reading not reported");
    }
}

/// Handler of `virtual:sensor`.
pub struct SensorHandler {
    base: Arc<BaseThingHandler>,
    scheduler: Scheduler,
    polling: Mutex<Option<ScheduledTask>>,
    readings: Arc<Readings>,
}

impl SensorHandler {
    #[must_use]
    pub fn new(thing: Thing, scheduler: Scheduler) -> Self {
        Self {
            base: Arc::new(BaseThingHandler::new(thing)),
            scheduler,
            polling: Mutex::new(None),
            readings: Arc::new(Readings::default()),
        }
    }

    /// Whether a polling task is currently scheduled.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        lock(&self.polling).is_some()
    }
}

impl ThingHandler for SensorHandler {
    fn base(&self) -> &BaseThingHandler {
        &self.base
    }

    fn initialize(&self) {
        if let Err(err) = report_attached_status(&self.base) {
            tracing::debug!(%err, "sensor status not reported");
            return;
        }
        let interval = refresh_interval(&self.base.configuration());
        let base = Arc::clone(&self.base);
        let readings = Arc::clone(&self.readings);
        let task = self
            .scheduler
            .schedule_with_fixed_delay(Duration::ZERO, interval, move || {
                let base = Arc::clone(&base);
                let readings = Arc::clone(&readings);
                async move {
                    // Offline sensors keep quiet.
                    if base.thing().status() == ThingStatus::Online {
                        publish(&base, readings.next());
                    }
                }
            });
        tracing::debug!(thing = %self.base.thing().uid(), ?interval, "sensor polling started");
        if let Some(previous) = lock(&self.polling).replace(task) {
            previous.cancel();
        }
    }

    fn handle_command(&self, channel_uid: &ChannelUID, command: Command) {
        match (channel_uid.id_without_group(), command) {
            (TEMPERATURE | BATTERY, Command::Refresh) => publish(&self.base, self.readings.latest()),
            (_, command) => {
                tracing::debug!(channel = %channel_uid, ?command, "sensor channels are read-only");
            }
        }
    }

    fn dispose(&self) {
        if let Some(task) = lock(&self.polling).take() {
            task.cancel();
        }
    }

    fn as_config_status_provider(&self) -> Option<&dyn ConfigStatusProvider> {
        Some(self)
    }
}

impl ConfigStatusProvider for SensorHandler {
    fn config_status(&self) -> Vec<ConfigStatusMessage> {
        let refresh = self.base.configuration().get(REFRESH).and_then(ConfigValue::as_i64);
        match refresh {
            Some(secs) if secs < RECOMMENDED_MIN_REFRESH_SECS => vec![ConfigStatusMessage::new(
                REFRESH,
                ConfigStatusKind::Warning,
                format!("refreshing every {secs}s drains the battery, {RECOMMENDED_MIN_REFRESH_SECS}s or more is recommended"),
            )],
            _ => Vec::new(),
        }
    }
}
