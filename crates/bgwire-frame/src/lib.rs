//! Frame encoding, decoding and stream resynchronization for the BGAPI serial protocol.
//!
//! Every frame starts with a 4-byte header:
//! - a type tag (`0x20` command/response, `0xA0` event)
//! - the declared minimum payload length
//! - the class id and the message id
//!
//! [`StreamParser`] turns an arbitrary, possibly fragmented or corrupted byte
//! stream into decoded frames; [`FrameReader`] and [`CommandWriter`] wrap it
//! for blocking transports, and `BgapiCodec` (feature `async`) for tokio.

#[cfg(feature = "async")]
pub mod async_codec;
pub mod codec;
pub mod error;
pub mod parser;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub use async_codec::{BgapiCodec, OutgoingCommand};
pub use codec::{
    decode_event, decode_frame, decode_response, encode_command, encode_command_into,
    DecodeOutcome, DecodedFrame, FrameConfig, FrameHeader, DEFAULT_MAX_RESIDUAL,
    DEFAULT_READ_CHUNK,
};
pub use error::{FrameError, Result};
pub use parser::{IngestBatch, ParseEvent, StreamParser};
pub use reader::FrameReader;
pub use writer::CommandWriter;
