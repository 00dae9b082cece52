use bytes::BytesMut;

use crate::args::Args;
use crate::error::{EncodeError, FieldError};
use crate::value::Fields;

/// What a payload decoding routine made of the bytes it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadDecode {
    /// Fixed-layout payload; consumes the descriptor's declared minimum.
    Fixed(Fields),
    /// The routine measured the payload itself (variable trailing fields).
    /// A measurement below the frame's minimum payload is widened to it.
    Sized { eaten: usize, fields: Fields },
    /// A variable-length field is incomplete.
    NeedsMore(usize),
}

/// Decodes a response or event payload (header excluded).
pub type DecodeFn = fn(&[u8]) -> Result<PayloadDecode, FieldError>;

/// Encodes command arguments into a payload (header excluded).
pub type EncodeFn = fn(&Args<'_>, &mut BytesMut) -> Result<(), EncodeError>;

/// Static description of one response or event.
#[derive(Debug, Clone, Copy)]
pub struct MessageDescriptor {
    /// Name without the `rsp_`/`evt_` prefix.
    pub name: &'static str,
    pub min_payload_len: u8,
    pub decode: Option<DecodeFn>,
}

impl MessageDescriptor {
    pub const fn new(name: &'static str, min_payload_len: u8, decode: DecodeFn) -> Self {
        Self {
            name,
            min_payload_len,
            decode: Some(decode),
        }
    }

    /// A message the registry knows by name but cannot decode.
    pub const fn opaque(name: &'static str, min_payload_len: u8) -> Self {
        Self {
            name,
            min_payload_len,
            decode: None,
        }
    }
}

/// Static description of one outgoing command.
#[derive(Debug, Clone, Copy)]
pub struct CommandDescriptor {
    /// Name without the `cmd_` prefix.
    pub name: &'static str,
    pub id: u8,
    /// Explicit class; `None` derives it from the name prefix.
    pub class_id: Option<u8>,
    pub min_payload_len: u8,
    pub encode: Option<EncodeFn>,
}

impl CommandDescriptor {
    /// A command without payload.
    pub const fn bare(name: &'static str, id: u8) -> Self {
        Self {
            name,
            id,
            class_id: None,
            min_payload_len: 0,
            encode: None,
        }
    }

    pub const fn with_payload(
        name: &'static str,
        id: u8,
        min_payload_len: u8,
        encode: EncodeFn,
    ) -> Self {
        Self {
            name,
            id,
            class_id: None,
            min_payload_len,
            encode: Some(encode),
        }
    }

    pub const fn in_class(mut self, class_id: u8) -> Self {
        self.class_id = Some(class_id);
        self
    }
}
