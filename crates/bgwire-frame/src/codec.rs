use bgwire_registry::{
    Arg, Args, EncodeError, Fields, MessageKind, PayloadDecode, Registry, Value, COMMAND_TAG,
    HEADER_SIZE,
};
use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{FrameError, Result};

/// Default bound on the residual receive buffer.
///
/// The longest legitimate frame is a 4-byte header, a 255-byte declared
/// payload and one 255-byte variable field.
pub const DEFAULT_MAX_RESIDUAL: usize = 4096;

/// Default number of bytes pulled from a transport per read.
pub const DEFAULT_READ_CHUNK: usize = 512;

/// The fixed 4-byte frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameHeader {
    pub tag: u8,
    /// Declared minimum payload length (precheck only).
    pub min_payload_len: u8,
    pub class_id: u8,
    pub message_id: u8,
}

impl FrameHeader {
    /// Parse the header at the start of `buf`, if all four bytes are present.
    pub fn parse(buf: &[u8]) -> Option<Self> {
        match buf {
            [tag, min_payload_len, class_id, message_id, ..] => Some(Self {
                tag: *tag,
                min_payload_len: *min_payload_len,
                class_id: *class_id,
                message_id: *message_id,
            }),
            _ => None,
        }
    }

    /// Header plus declared payload.
    pub fn declared_frame_len(&self) -> usize {
        HEADER_SIZE + usize::from(self.min_payload_len)
    }
}

/// One successfully decoded response or event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedFrame {
    pub kind: MessageKind,
    pub class_id: u8,
    pub message_id: u8,
    /// Message name prefixed with `rsp_` or `evt_`.
    pub name: String,
    pub fields: Fields,
    /// Bytes consumed from the stream, header included.
    pub wire_len: usize,
}

impl DecodedFrame {
    /// Shorthand for `self.fields.get(name)`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Outcome of decoding the frame at the head of a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// A registered message was decoded from the first `eaten` bytes.
    Decoded { eaten: usize, frame: DecodedFrame },
    /// A well-formed header with no registry entry; skip `eaten` bytes.
    Unregistered { eaten: usize, header: FrameHeader },
    /// At least this many more bytes are needed. Nothing was consumed.
    NeedsMore(usize),
}

/// Configuration for parsers and readers.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Residual buffer size beyond which the buffer is discarded. Default: 4 KiB.
    pub max_residual_len: usize,
    /// Bytes requested from the transport per read. Default: 512.
    pub read_chunk_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_residual_len: DEFAULT_MAX_RESIDUAL,
            read_chunk_size: DEFAULT_READ_CHUNK,
        }
    }
}

/// Encode a command into a fresh frame.
///
/// Wire format:
/// ```text
/// ┌──────┬──────────┬───────┬────┬───────────────────────────┐
/// │ 0x20 │ min len  │ class │ id │ payload from the registry │
/// └──────┴──────────┴───────┴────┴───────────────────────────┘
/// ```
pub fn encode_command(
    registry: &Registry,
    name: &str,
    args: &[Arg],
) -> std::result::Result<Bytes, EncodeError> {
    let mut dst = BytesMut::new();
    encode_command_into(registry, name, args, &mut dst)?;
    Ok(dst.freeze())
}

/// Append an encoded command to `dst`. On error `dst` is left untouched.
pub fn encode_command_into(
    registry: &Registry,
    name: &str,
    args: &[Arg],
    dst: &mut BytesMut,
) -> std::result::Result<(), EncodeError> {
    let descriptor = registry
        .lookup_command(name)
        .ok_or_else(|| EncodeError::UnknownCommand(name.to_string()))?;
    let class_id = registry.command_class(descriptor)?;

    let start = dst.len();
    dst.reserve(HEADER_SIZE + usize::from(descriptor.min_payload_len));
    dst.put_u8(COMMAND_TAG);
    dst.put_u8(descriptor.min_payload_len);
    dst.put_u8(class_id);
    dst.put_u8(descriptor.id);

    if let Some(encode) = descriptor.encode {
        if let Err(err) = encode(&Args::new(descriptor.name, args), dst) {
            dst.truncate(start);
            return Err(err);
        }
    }

    debug!(
        command = descriptor.name,
        len = dst.len() - start,
        "encoded command"
    );
    Ok(())
}

/// Decode the frame at the head of `buf`, choosing the direction from byte 0.
///
/// A head byte that cannot start a frame yields
/// [`FrameError::Desynchronized`]; the stream parser never passes one.
pub fn decode_frame(registry: &Registry, buf: &[u8]) -> Result<DecodeOutcome> {
    let Some(&tag) = buf.first() else {
        return Ok(DecodeOutcome::NeedsMore(HEADER_SIZE));
    };
    match MessageKind::from_tag(tag) {
        Some(kind) => decode_message(registry, kind, buf),
        None => Err(FrameError::Desynchronized { byte: tag }),
    }
}

/// Decode a response frame at the head of `buf`.
pub fn decode_response(registry: &Registry, buf: &[u8]) -> Result<DecodeOutcome> {
    decode_message(registry, MessageKind::Response, buf)
}

/// Decode an event frame at the head of `buf`.
pub fn decode_event(registry: &Registry, buf: &[u8]) -> Result<DecodeOutcome> {
    decode_message(registry, MessageKind::Event, buf)
}

fn decode_message(registry: &Registry, kind: MessageKind, buf: &[u8]) -> Result<DecodeOutcome> {
    let Some(header) = FrameHeader::parse(buf) else {
        return Ok(DecodeOutcome::NeedsMore(HEADER_SIZE - buf.len()));
    };
    if header.tag != kind.tag() {
        return Err(FrameError::UnexpectedTypeTag {
            expected: kind.tag(),
            found: header.tag,
        });
    }

    // Cheap precheck on the header before any per-message logic.
    if buf.len() < header.declared_frame_len() {
        return Ok(DecodeOutcome::NeedsMore(header.declared_frame_len() - buf.len()));
    }

    let Some(descriptor) = registry.lookup(kind, header.class_id, header.message_id) else {
        warn!(
            kind = ?kind,
            class_id = header.class_id,
            message_id = header.message_id,
            skipped = header.declared_frame_len(),
            "no decoder for message, skipping declared length"
        );
        return Ok(DecodeOutcome::Unregistered {
            eaten: header.declared_frame_len(),
            header,
        });
    };

    let min_payload = usize::from(header.min_payload_len.max(descriptor.min_payload_len));
    if buf.len() < HEADER_SIZE + min_payload {
        return Ok(DecodeOutcome::NeedsMore(HEADER_SIZE + min_payload - buf.len()));
    }

    let name = format!("{}{}", kind.name_prefix(), descriptor.name);
    let payload = &buf[HEADER_SIZE..];

    let (payload_len, fields) = match descriptor.decode {
        None => {
            debug!(message = %name, "no decoding routine, emitting bare record");
            (min_payload, Fields::new())
        }
        Some(decode) => match decode(payload).map_err(|source| FrameError::Malformed {
            message: name.clone(),
            source,
        })? {
            PayloadDecode::Fixed(fields) => (min_payload, fields),
            PayloadDecode::Sized { eaten, fields } => {
                if eaten > payload.len() {
                    return Err(FrameError::DecodingFailure {
                        reason: format!(
                            "{name} claims {eaten} payload bytes but only {} are buffered",
                            payload.len()
                        ),
                    });
                }
                (eaten.max(min_payload), fields)
            }
            PayloadDecode::NeedsMore(0) => {
                return Err(FrameError::DecodingFailure {
                    reason: format!("{name} requested zero additional bytes"),
                });
            }
            PayloadDecode::NeedsMore(missing) => return Ok(DecodeOutcome::NeedsMore(missing)),
        },
    };

    let eaten = HEADER_SIZE + payload_len;
    Ok(DecodeOutcome::Decoded {
        eaten,
        frame: DecodedFrame {
            kind,
            class_id: header.class_id,
            message_id: header.message_id,
            name,
            fields,
            wire_len: eaten,
        },
    })
}
