//! Framework-supplied ("system") channel types.
//!
//! Any binding can reference these from a descriptor with a `system.` prefixed
//! `typeId` (e.g. `system.battery-level` resolves to `system:battery-level`).

use super::{ChannelType, EventDescription, EventOption, StateDescription, StateOption};
use crate::uid::{ChannelTypeUID, SYSTEM_BINDING_ID};

fn uid(id: &'static str) -> ChannelTypeUID {
    ChannelTypeUID::from_static(SYSTEM_BINDING_ID, id)
}

fn read_only() -> StateDescription {
    StateDescription {
        read_only: true,
        ..StateDescription::default()
    }
}

fn ranged(min: f64, max: f64, step: Option<f64>, pattern: Option<&str>, read_only: bool) -> StateDescription {
    StateDescription {
        minimum: Some(min),
        maximum: Some(max),
        step,
        pattern: pattern.map(str::to_string),
        read_only,
        options: Vec::new(),
    }
}

fn events(values: &[&str]) -> EventDescription {
    EventDescription {
        options: values
            .iter()
            .map(|v| EventOption {
                value: (*v).to_string(),
                label: None,
            })
            .collect(),
    }
}

/// The full catalogue of system channel types.
#[must_use]
pub fn channel_types() -> Vec<ChannelType> {
    let signal_options = ["no signal", "weak", "average", "good", "excellent"]
        .iter()
        .enumerate()
        .map(|(value, label)| StateOption {
            value: value.to_string(),
            label: Some((*label).to_string()),
        })
        .collect();

    vec![
        ChannelType::state(uid("signal-strength"), "Number", "Signal Strength")
            .category("QualityOfService")
            .state_description(StateDescription {
                options: signal_options,
                ..ranged(0.0, 4.0, None, None, true)
            })
            .build(),
        ChannelType::state(uid("low-battery"), "Switch", "Low Battery")
            .category("Battery")
            .state_description(read_only())
            .build(),
        ChannelType::state(uid("battery-level"), "Number", "Battery Level")
            .category("Battery")
            .state_description(ranged(0.0, 100.0, Some(1.0), Some("%.0f %%"), true))
            .build(),
        ChannelType::trigger(uid("trigger"), "Trigger").build(),
        ChannelType::trigger(uid("rawbutton"), "Raw Button")
            .event_description(events(&["PRESSED", "RELEASED"]))
            .build(),
        ChannelType::trigger(uid("button"), "Button")
            .event_description(events(&["SHORT_PRESSED", "DOUBLE_PRESSED", "LONG_PRESSED"]))
            .build(),
        ChannelType::trigger(uid("rawrocker"), "Raw Rocker Button")
            .event_description(events(&[
                "DIR1_PRESSED",
                "DIR1_RELEASED",
                "DIR2_PRESSED",
                "DIR2_RELEASED",
            ]))
            .build(),
        ChannelType::state(uid("power"), "Switch", "Power")
            .description("Device is operable when channel has state ON")
            .build(),
        ChannelType::state(uid("location"), "Location", "Location")
            .description("Location in lat./lon./height coordinates")
            .build(),
        ChannelType::state(uid("motion"), "Switch", "Motion")
            .category("Motion")
            .state_description(read_only())
            .build(),
        ChannelType::state(uid("brightness"), "Dimmer", "Brightness")
            .category("DimmableLight")
            .tag("Lighting")
            .build(),
        ChannelType::state(uid("color"), "Color", "Color")
            .category("ColorLight")
            .tag("Lighting")
            .build(),
        ChannelType::state(uid("color-temperature"), "Dimmer", "Color Temperature")
            .category("ColorLight")
            .tag("Lighting")
            .state_description(ranged(0.0, 100.0, None, None, false))
            .build(),
        ChannelType::state(uid("volume"), "Dimmer", "Volume")
            .category("SoundVolume")
            .state_description(ranged(0.0, 100.0, Some(1.0), Some("%d %%"), false))
            .build(),
        ChannelType::state(uid("mute"), "Switch", "Mute")
            .category("SoundVolume")
            .build(),
        ChannelType::state(uid("media-control"), "Player", "Media Control")
            .category("MediaControl")
            .build(),
        ChannelType::state(uid("media-title"), "String", "Title")
            .state_description(read_only())
            .build(),
        ChannelType::state(uid("media-artist"), "String", "Artist")
            .state_description(read_only())
            .build(),
        ChannelType::state(uid("wind-direction"), "Number:Angle", "Wind Direction")
            .category("Wind")
            .state_description(ranged(0.0, 360.0, None, Some("%.0f %unit%"), true))
            .build(),
        ChannelType::state(uid("wind-speed"), "Number:Speed", "Wind Speed")
            .category("Wind")
            .state_description(read_only())
            .build(),
        ChannelType::state(uid("outdoor-temperature"), "Number:Temperature", "Outdoor Temperature")
            .category("Temperature")
            .state_description(read_only())
            .build(),
        ChannelType::state(uid("temperature"), "Number:Temperature", "Temperature")
            .category("Temperature")
            .state_description(read_only())
            .build(),
        ChannelType::state(uid("atmospheric-humidity"), "Number:Dimensionless", "Atmospheric Humidity")
            .category("Humidity")
            .state_description(read_only())
            .build(),
        ChannelType::state(uid("barometric-pressure"), "Number:Pressure", "Barometric Pressure")
            .category("Pressure")
            .state_description(read_only())
            .build(),
    ]
}
