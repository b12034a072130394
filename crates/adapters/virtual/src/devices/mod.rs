//! Virtual device handlers: hub bridge, light, sensor.
//!
//! Every handler works without hardware: the hub pretends to connect in the
//! background, the light remembers its power state, the sensor produces a
//! deterministic series of readings.

mod hub;
mod light;
mod sensor;

pub use hub::HubHandler;
pub use light::LightHandler;
pub use sensor::{Reading, SensorHandler};

use std::sync::{Mutex, MutexGuard, PoisonError};

use smarthome_app::handler::BaseThingHandler;
use smarthome_domain::error::ThingError;
use smarthome_domain::thing::{ThingStatus, ThingStatusDetail};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Status of a device attached to a hub: `ONLINE` when the hub is, otherwise
/// `OFFLINE (BRIDGE_OFFLINE)` until the hub comes back.
fn report_attached_status(base: &BaseThingHandler) -> Result<(), ThingError> {
    let attached = base.thing().bridge_uid().is_some();
    let bridge_online = base
        .bridge()
        .is_some_and(|bridge| bridge.status() == ThingStatus::Online);
    if attached && !bridge_online {
        base.update_status_detail(ThingStatus::Offline, ThingStatusDetail::BridgeOffline, None)
    } else {
        base.update_status(ThingStatus::Online)
    }
}
