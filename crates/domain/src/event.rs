//! Event: an immutable record of something that happened to a thing.
//!
//! Events are produced when things are added or removed, their status
//! changes, channel states update, commands are posted, or trigger channels
//! fire.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::command::{Command, State};
use crate::thing::ThingStatusInfo;
use crate::uid::{ChannelUID, ThingUID};

/// UTC instant an event was recorded at.
pub type Timestamp = DateTime<Utc>;

/// Unique identifier for an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(uuid::Uuid);

impl Default for EventId {
    fn default() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    ThingAdded {
        thing_uid: ThingUID,
    },
    ThingRemoved {
        thing_uid: ThingUID,
    },
    ThingUpdated {
        thing_uid: ThingUID,
    },
    ThingStatusInfoChanged {
        thing_uid: ThingUID,
        old: ThingStatusInfo,
        new: ThingStatusInfo,
    },
    ChannelStateUpdated {
        channel_uid: ChannelUID,
        state: State,
    },
    CommandPosted {
        channel_uid: ChannelUID,
        command: Command,
    },
    ChannelTriggered {
        channel_uid: ChannelUID,
        event: String,
    },
}

/// A timestamped [`EventKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub kind: EventKind,
    pub timestamp: Timestamp,
}

impl Event {
    /// Create a new event stamped with the current time.
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self {
            id: EventId::default(),
            kind,
            timestamp: Utc::now(),
        }
    }

    /// The thing this event concerns.
    #[must_use]
    pub fn thing_uid(&self) -> &ThingUID {
        match &self.kind {
            EventKind::ThingAdded { thing_uid }
            | EventKind::ThingRemoved { thing_uid }
            | EventKind::ThingUpdated { thing_uid }
            | EventKind::ThingStatusInfoChanged { thing_uid, .. } => thing_uid,
            EventKind::ChannelStateUpdated { channel_uid, .. }
            | EventKind::CommandPosted { channel_uid, .. }
            | EventKind::ChannelTriggered { channel_uid, .. } => channel_uid.thing_uid(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thing::ThingStatus;

    #[test]
    fn should_resolve_thing_uid_of_channel_event() {
        let channel_uid: ChannelUID = "acme:sensor:dev1:temp".parse().unwrap();
        let event = Event::new(EventKind::ChannelTriggered {
            channel_uid,
            event: "PRESSED".to_string(),
        });
        assert_eq!(event.thing_uid().to_string(), "acme:sensor:dev1");
    }

    #[test]
    fn should_serialize_with_type_tag() {
        let event = Event::new(EventKind::ThingStatusInfoChanged {
            thing_uid: "acme:sensor:dev1".parse().unwrap(),
            old: ThingStatusInfo::default(),
            new: ThingStatusInfo::of(ThingStatus::Online),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"]["type"], "thing_status_info_changed");
        assert_eq!(json["kind"]["new"]["status"], "ONLINE");
    }

    #[test]
    fn should_stamp_events_in_creation_order() {
        let kind = EventKind::ThingAdded {
            thing_uid: "acme:sensor:dev1".parse().unwrap(),
        };
        let first = Event::new(kind.clone());
        let second = Event::new(kind);
        assert!(first.timestamp <= second.timestamp);
    }

    #[test]
    fn should_generate_unique_event_ids() {
        let kind = EventKind::ThingAdded {
            thing_uid: "acme:sensor:dev1".parse().unwrap(),
        };
        assert_ne!(Event::new(kind.clone()).id, Event::new(kind).id);
    }
}
