//! Colon-delimited hierarchical identifiers (`bindingId:typeId[:instanceId…]`).
//!
//! All UID kinds are immutable value types compared and hashed by their full
//! segment sequence. They (de)serialize as their string form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UidError;

/// Binding id reserved for framework-supplied types.
pub const SYSTEM_BINDING_ID: &str = "system";

/// Prefix that marks a channel `typeId` as a reference to a system type.
pub const SYSTEM_TYPE_PREFIX: &str = "system.";

const SEPARATOR: char = ':';
const GROUP_SEPARATOR: char = '#';

fn is_segment_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Check a single UID segment.
///
/// # Errors
///
/// Returns [`UidError::InvalidSegment`] when the segment is empty or holds a
/// character outside `[A-Za-z0-9_-]`.
pub fn validate_segment(segment: &str) -> Result<(), UidError> {
    if segment.is_empty() || !segment.chars().all(is_segment_char) {
        return Err(UidError::InvalidSegment {
            segment: segment.to_string(),
        });
    }
    Ok(())
}

fn validate_channel_segment(segment: &str) -> Result<(), UidError> {
    match segment.split_once(GROUP_SEPARATOR) {
        Some((group, channel)) => {
            validate_segment(group)?;
            validate_segment(channel)
        }
        None => validate_segment(segment),
    }
}

macro_rules! define_type_uid {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name {
            binding_id: String,
            id: String,
        }

        impl $name {
            /// Build from a binding id and a type id.
            ///
            /// # Errors
            ///
            /// Returns [`UidError::InvalidSegment`] if either segment is invalid.
            pub fn new(binding_id: impl Into<String>, id: impl Into<String>) -> Result<Self, UidError> {
                let binding_id = binding_id.into();
                let id = id.into();
                validate_segment(&binding_id)?;
                validate_segment(&id)?;
                Ok(Self { binding_id, id })
            }

            /// Build from segments known to be valid (compile-time constants).
            #[allow(dead_code)]
            pub(crate) fn from_static(binding_id: &'static str, id: &'static str) -> Self {
                debug_assert!(validate_segment(binding_id).is_ok() && validate_segment(id).is_ok());
                Self {
                    binding_id: binding_id.to_string(),
                    id: id.to_string(),
                }
            }

            /// The owning binding id.
            #[must_use]
            pub fn binding_id(&self) -> &str {
                &self.binding_id
            }

            /// The type id within the binding.
            #[must_use]
            pub fn id(&self) -> &str {
                &self.id
            }

            /// Whether this UID lives in the reserved `system` namespace.
            #[must_use]
            pub fn is_system(&self) -> bool {
                self.binding_id == SYSTEM_BINDING_ID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{SEPARATOR}{}", self.binding_id, self.id)
            }
        }

        impl FromStr for $name {
            type Err = UidError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let segments: Vec<&str> = s.split(SEPARATOR).collect();
                match segments.as_slice() {
                    [binding_id, id] => Self::new(*binding_id, *id),
                    [_] => Err(UidError::TooFewSegments {
                        uid: s.to_string(),
                        expected: 2,
                    }),
                    _ => Err(UidError::TooManySegments {
                        uid: s.to_string(),
                        expected: 2,
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = UidError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.to_string()
            }
        }
    };
}

define_type_uid!(
    /// Identifies a [`ThingType`](crate::types::ThingType) (`binding:type`).
    ThingTypeUID
);

define_type_uid!(
    /// Identifies a [`ChannelType`](crate::types::ChannelType) (`binding:type`).
    ChannelTypeUID
);

define_type_uid!(
    /// Identifies a [`ChannelGroupType`](crate::types::ChannelGroupType) (`binding:type`).
    ChannelGroupTypeUID
);

/// Identifies a concrete [`Thing`](crate::thing::Thing):
/// `binding:type[:bridgeId…]:id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ThingUID {
    segments: Vec<String>,
}

impl ThingUID {
    /// Build `binding:type:id` for a thing of the given type.
    ///
    /// # Errors
    ///
    /// Returns [`UidError::InvalidSegment`] if `id` is not a valid segment.
    pub fn new(thing_type_uid: &ThingTypeUID, id: impl Into<String>) -> Result<Self, UidError> {
        let id = id.into();
        validate_segment(&id)?;
        Ok(Self {
            segments: vec![
                thing_type_uid.binding_id().to_string(),
                thing_type_uid.id().to_string(),
                id,
            ],
        })
    }

    /// Build `binding:type:bridgeId…:id` for a thing attached to `bridge_uid`.
    ///
    /// The bridge's own bridge segments come first, so a thing behind a
    /// nested bridge keeps the whole chain.
    ///
    /// # Errors
    ///
    /// Returns [`UidError::InvalidSegment`] if `id` is not a valid segment.
    pub fn with_bridge(
        thing_type_uid: &ThingTypeUID,
        bridge_uid: &ThingUID,
        id: impl Into<String>,
    ) -> Result<Self, UidError> {
        let id = id.into();
        validate_segment(&id)?;
        let mut segments = Self::type_segments(thing_type_uid);
        segments.extend(bridge_uid.bridge_path());
        segments.push(id);
        Ok(Self { segments })
    }

    /// Build a UID with a random instance id under the given type.
    #[must_use]
    pub fn random(thing_type_uid: &ThingTypeUID, bridge_uid: Option<&ThingUID>) -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let id = suffix[..12].to_string();
        let mut segments = Self::type_segments(thing_type_uid);
        if let Some(bridge) = bridge_uid {
            segments.extend(bridge.bridge_path());
        }
        segments.push(id);
        Self { segments }
    }

    fn type_segments(thing_type_uid: &ThingTypeUID) -> Vec<String> {
        vec![
            thing_type_uid.binding_id().to_string(),
            thing_type_uid.id().to_string(),
        ]
    }

    /// Segments a child of this bridge inserts: its bridge ids, then its id.
    fn bridge_path(&self) -> impl Iterator<Item = String> + '_ {
        self.bridge_ids()
            .iter()
            .cloned()
            .chain(std::iter::once(self.id().to_string()))
    }

    /// The owning binding id.
    #[must_use]
    pub fn binding_id(&self) -> &str {
        &self.segments[0]
    }

    /// The thing type id segment.
    #[must_use]
    pub fn thing_type_id(&self) -> &str {
        &self.segments[1]
    }

    /// The instance id (last segment).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Bridge id segments between the type and the instance id.
    #[must_use]
    pub fn bridge_ids(&self) -> &[String] {
        &self.segments[2..self.segments.len() - 1]
    }

    /// The [`ThingTypeUID`] encoded in the first two segments.
    #[must_use]
    pub fn thing_type_uid(&self) -> ThingTypeUID {
        ThingTypeUID {
            binding_id: self.segments[0].clone(),
            id: self.segments[1].clone(),
        }
    }

    /// All segments in order.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for ThingUID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join(":"))
    }
}

impl FromStr for ThingUID {
    type Err = UidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<String> = s.split(SEPARATOR).map(str::to_string).collect();
        if segments.len() < 3 {
            return Err(UidError::TooFewSegments {
                uid: s.to_string(),
                expected: 3,
            });
        }
        for segment in &segments {
            validate_segment(segment)?;
        }
        Ok(Self { segments })
    }
}

impl TryFrom<String> for ThingUID {
    type Error = UidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ThingUID> for String {
    fn from(value: ThingUID) -> Self {
        value.to_string()
    }
}

/// Identifies a [`Channel`](crate::thing::Channel): `<thingUID>:<channelId>`.
///
/// The channel id may carry a group prefix (`group#channel`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelUID {
    thing_uid: ThingUID,
    id: String,
}

impl ChannelUID {
    /// Build a channel UID below `thing_uid`.
    ///
    /// # Errors
    ///
    /// Returns [`UidError::InvalidSegment`] if `id` is not a valid channel id.
    pub fn new(thing_uid: &ThingUID, id: impl Into<String>) -> Result<Self, UidError> {
        let id = id.into();
        validate_channel_segment(&id)?;
        Ok(Self {
            thing_uid: thing_uid.clone(),
            id,
        })
    }

    /// Build a grouped channel UID (`group#channel`) below `thing_uid`.
    ///
    /// # Errors
    ///
    /// Returns [`UidError::InvalidSegment`] if either id is invalid.
    pub fn in_group(thing_uid: &ThingUID, group_id: &str, id: &str) -> Result<Self, UidError> {
        Self::new(thing_uid, format!("{group_id}{GROUP_SEPARATOR}{id}"))
    }

    /// The owning thing.
    #[must_use]
    pub fn thing_uid(&self) -> &ThingUID {
        &self.thing_uid
    }

    /// Binding id, derived from the owning thing.
    #[must_use]
    pub fn binding_id(&self) -> &str {
        self.thing_uid.binding_id()
    }

    /// The full channel id, including any group prefix.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The group id, if the channel belongs to a group.
    #[must_use]
    pub fn group_id(&self) -> Option<&str> {
        self.id.split_once(GROUP_SEPARATOR).map(|(group, _)| group)
    }

    /// The channel id without the group prefix.
    #[must_use]
    pub fn id_without_group(&self) -> &str {
        self.id
            .split_once(GROUP_SEPARATOR)
            .map_or(self.id.as_str(), |(_, id)| id)
    }
}

impl fmt::Display for ChannelUID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.thing_uid, self.id)
    }
}

impl FromStr for ChannelUID {
    type Err = UidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((thing, id)) = s.rsplit_once(SEPARATOR) else {
            return Err(UidError::TooFewSegments {
                uid: s.to_string(),
                expected: 4,
            });
        };
        let thing_uid: ThingUID = thing.parse().map_err(|err| match err {
            UidError::TooFewSegments { .. } => UidError::TooFewSegments {
                uid: s.to_string(),
                expected: 4,
            },
            other => other,
        })?;
        Self::new(&thing_uid, id)
    }
}

impl TryFrom<String> for ChannelUID {
    type Error = UidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChannelUID> for String {
    fn from(value: ChannelUID) -> Self {
        value.to_string()
    }
}
