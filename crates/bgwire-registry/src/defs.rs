//! Wire format constants.
//!
//! Every frame starts with a fixed 4-byte header:
//!
//! ```text
//! ┌──────────┬───────────────┬──────────┬────────────┬──────────────────┐
//! │ Type (1B)│ Min len (1B)  │ Class    │ Message id │ Payload          │
//! │ 0x20/0xA0│ payload bytes │ (1B)     │ (1B)       │ (>= min len)     │
//! └──────────┴───────────────┴──────────┴────────────┴──────────────────┘
//! ```

use serde::Serialize;

/// Header size shared by commands, responses and events.
pub const HEADER_SIZE: usize = 4;

/// Type tag carried by commands and by their responses.
pub const COMMAND_TAG: u8 = 0x20;

/// Type tag carried by responses (same value as commands).
pub const RESPONSE_TAG: u8 = COMMAND_TAG;

/// Type tag carried by events.
pub const EVENT_TAG: u8 = 0xA0;

/// Largest length a one-byte length prefix can describe.
pub const MAX_VARIABLE_FIELD_LEN: usize = u8::MAX as usize;

/// Message class identifiers.
pub mod class {
    pub const SYSTEM: u8 = 0x01;
    pub const LE_GAP: u8 = 0x03;
    pub const LE_CONNECTION: u8 = 0x08;
    pub const GATT_SERVER: u8 = 0x0a;
    pub const FLASH_PS: u8 = 0x0d;
    pub const MESH_NODE: u8 = 0x14;
    pub const MESH_HEALTH_SERVER: u8 = 0x1b;
    pub const MESH_GENERIC_CLIENT: u8 = 0x1e;
    pub const MESH_GENERIC_SERVER: u8 = 0x1f;
}

/// Name prefixes mapped to their class, in match order.
pub const PREFIX_TO_CLASS: &[(&str, u8)] = &[
    ("system", class::SYSTEM),
    ("le_gap", class::LE_GAP),
    ("le_connection", class::LE_CONNECTION),
    ("flash_ps", class::FLASH_PS),
    ("mesh_node", class::MESH_NODE),
    ("mesh_health_server", class::MESH_HEALTH_SERVER),
    ("mesh_generic_client", class::MESH_GENERIC_CLIENT),
    ("mesh_generic_server", class::MESH_GENERIC_SERVER),
    ("gatt_server", class::GATT_SERVER),
];

/// Direction of an incoming frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Response,
    Event,
}

impl MessageKind {
    /// Classify a stream-head byte. Returns `None` for anything that cannot start a frame.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            RESPONSE_TAG => Some(Self::Response),
            EVENT_TAG => Some(Self::Event),
            _ => None,
        }
    }

    /// The type tag carried in byte 0.
    pub fn tag(self) -> u8 {
        match self {
            Self::Response => RESPONSE_TAG,
            Self::Event => EVENT_TAG,
        }
    }

    /// Prefix attached to decoded message names.
    pub fn name_prefix(self) -> &'static str {
        match self {
            Self::Response => "rsp_",
            Self::Event => "evt_",
        }
    }
}

/// Returns true if `byte` can start an incoming frame.
pub fn is_frame_start(byte: u8) -> bool {
    MessageKind::from_tag(byte).is_some()
}

/// Guess the class of a message from its name. First matching prefix wins.
pub fn class_for_name(name: &str) -> Option<u8> {
    PREFIX_TO_CLASS
        .iter()
        .find(|(prefix, _)| name.starts_with(prefix))
        .map(|(_, class_id)| *class_id)
}

/// Returns a human-readable name for a class id.
pub fn class_name(class_id: u8) -> &'static str {
    PREFIX_TO_CLASS
        .iter()
        .find(|(_, id)| *id == class_id)
        .map(|(prefix, _)| *prefix)
        .unwrap_or("unknown")
}
