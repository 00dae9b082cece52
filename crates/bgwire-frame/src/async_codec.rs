use std::collections::VecDeque;
use std::sync::Arc;

use bgwire_registry::{Arg, Registry};
use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{encode_command_into, DecodedFrame, FrameConfig};
use crate::error::FrameError;
use crate::parser::StreamParser;

/// A command to encode on a framed sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingCommand {
    pub name: String,
    pub args: Vec<Arg>,
}

impl OutgoingCommand {
    pub fn new(name: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// `tokio_util` codec: decodes responses/events, encodes commands.
///
/// Incoming bytes are moved into an internal [`StreamParser`], so
/// resynchronization and partial-frame handling match the blocking reader.
#[derive(Debug)]
pub struct BgapiCodec {
    parser: StreamParser,
    frames: VecDeque<DecodedFrame>,
    pending_error: Option<FrameError>,
}

impl BgapiCodec {
    pub fn new() -> Self {
        Self::with_parser(StreamParser::new())
    }

    pub fn with_config(registry: Arc<Registry>, config: FrameConfig) -> Self {
        Self::with_parser(StreamParser::with_config(registry, config))
    }

    pub fn with_parser(parser: StreamParser) -> Self {
        Self {
            parser,
            frames: VecDeque::new(),
            pending_error: None,
        }
    }

    pub fn parser(&self) -> &StreamParser {
        &self.parser
    }

    fn next_item(&mut self) -> Result<Option<DecodedFrame>, FrameError> {
        if let Some(frame) = self.frames.pop_front() {
            return Ok(Some(frame));
        }
        match self.pending_error.take() {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }
}

impl Default for BgapiCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for BgapiCodec {
    type Item = DecodedFrame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if !src.is_empty() {
            let chunk = src.split();
            if let Some(err) = self.parser.feed(&chunk, &mut self.frames) {
                self.pending_error = Some(err);
            }
        }
        self.next_item()
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if self.parser.residual().is_empty() {
            Ok(None)
        } else {
            self.parser.reset();
            Err(FrameError::ConnectionClosed)
        }
    }
}

impl Encoder<OutgoingCommand> for BgapiCodec {
    type Error = FrameError;

    fn encode(&mut self, item: OutgoingCommand, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_command_into(self.parser.registry(), &item.name, &item.args, dst)?;
        Ok(())
    }
}
