use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::Arc;

use bgwire_registry::{defs::is_frame_start, Registry};
use bytes::{Buf, BytesMut};
use tracing::{debug, error, trace, warn};

use crate::codec::{decode_frame, DecodeOutcome, DecodedFrame, FrameConfig};
use crate::error::FrameError;

/// One notification of the per-frame ingestion mode.
#[derive(Debug)]
pub enum ParseEvent {
    /// A complete frame was decoded and removed from the buffer.
    Frame(DecodedFrame),
    /// A desynchronized byte was dropped, or the buffer was discarded.
    Error(FrameError),
    /// The loop stopped on a partial frame; at least this many bytes are missing.
    NeedsMoreBytes(usize),
}

/// What one batch-mode ingestion call produced.
#[derive(Debug)]
pub enum IngestBatch {
    /// Frames decoded during the call, in stream order. Errors seen in the
    /// same call are not reported.
    Frames(Vec<DecodedFrame>),
    /// Nothing decoded; the first error encountered.
    Error(FrameError),
    /// Nothing decoded and nothing failed. Zero when the buffer is empty.
    NeedsMoreBytes(usize),
}

impl IngestBatch {
    /// Decoded frames, or an empty vector for the other outcomes.
    pub fn into_frames(self) -> Vec<DecodedFrame> {
        match self {
            Self::Frames(frames) => frames,
            Self::Error(_) | Self::NeedsMoreBytes(_) => Vec::new(),
        }
    }
}

/// Incremental, resynchronizing parser over one byte stream.
///
/// Bytes handed to [`ingest`](Self::ingest) or
/// [`ingest_iterate`](Self::ingest_iterate) are appended to a residual
/// buffer. Complete frames are cut from its head; bytes that cannot start a
/// frame are dropped one at a time; a partial frame stays buffered until the
/// next call. One parser serves one stream.
pub struct StreamParser {
    registry: Arc<Registry>,
    buf: BytesMut,
    config: FrameConfig,
}

impl StreamParser {
    /// Create a parser over the built-in registry.
    pub fn new() -> Self {
        Self::with_registry(Registry::builtin())
    }

    pub fn with_registry(registry: Arc<Registry>) -> Self {
        Self::with_config(registry, FrameConfig::default())
    }

    pub fn with_config(registry: Arc<Registry>, config: FrameConfig) -> Self {
        Self {
            registry,
            buf: BytesMut::new(),
            config,
        }
    }

    /// Per-frame mode.
    ///
    /// `on_event` runs once per decoded frame and once per error, in stream
    /// order, plus a final [`ParseEvent::NeedsMoreBytes`] when the loop stops
    /// on a partial frame. The buffer is advanced before each call, so an
    /// error returned by `on_event` stops the loop and is passed through
    /// without losing or replaying bytes.
    pub fn ingest_iterate<F, E>(&mut self, bytes: &[u8], mut on_event: F) -> Result<(), E>
    where
        F: FnMut(ParseEvent) -> Result<(), E>,
    {
        self.buf.extend_from_slice(bytes);
        trace!(residual = self.buf.len(), "ingesting {} bytes", bytes.len());

        while let Some(&head) = self.buf.first() {
            if !is_frame_start(head) {
                warn!(byte = head, "dropping byte that cannot start a frame");
                self.buf.advance(1);
                on_event(ParseEvent::Error(FrameError::Desynchronized { byte: head }))?;
                continue;
            }

            match decode_frame(&self.registry, &self.buf) {
                Ok(DecodeOutcome::NeedsMore(missing)) => {
                    if self.buf.len() > self.config.max_residual_len {
                        return on_event(ParseEvent::Error(self.discard(format!(
                            "residual buffer of {} bytes exceeds {} bytes",
                            self.buf.len(),
                            self.config.max_residual_len
                        ))));
                    }
                    trace!(residual = self.buf.len(), missing, "awaiting more bytes");
                    return on_event(ParseEvent::NeedsMoreBytes(missing));
                }
                Ok(DecodeOutcome::Decoded { eaten, frame }) => {
                    debug!(message = %frame.name, eaten, "decoded frame");
                    self.buf.advance(eaten);
                    on_event(ParseEvent::Frame(frame))?;
                }
                Ok(DecodeOutcome::Unregistered { eaten, .. }) => {
                    self.buf.advance(eaten);
                }
                Err(err) => {
                    error!(error = %err, discarded = self.buf.len(), "discarding receive buffer");
                    self.buf.clear();
                    return on_event(ParseEvent::Error(err));
                }
            }
        }
        Ok(())
    }

    /// Batch mode: `on_batch` runs exactly once with the outcome of this call.
    pub fn ingest<F, E>(&mut self, bytes: &[u8], on_batch: F) -> Result<(), E>
    where
        F: FnOnce(IngestBatch) -> Result<(), E>,
    {
        on_batch(self.collect(bytes))
    }

    /// Batch mode without a callback.
    pub fn collect(&mut self, bytes: &[u8]) -> IngestBatch {
        let mut frames = Vec::new();
        let mut first_error = None;
        let mut needs_more = 0;

        let outcome = self.ingest_iterate(bytes, |event| -> Result<(), Infallible> {
            match event {
                ParseEvent::Frame(frame) => frames.push(frame),
                ParseEvent::Error(err) => {
                    first_error.get_or_insert(err);
                }
                ParseEvent::NeedsMoreBytes(missing) => needs_more = missing,
            }
            Ok(())
        });
        if let Err(never) = outcome {
            match never {}
        }

        if !frames.is_empty() {
            IngestBatch::Frames(frames)
        } else if let Some(err) = first_error {
            IngestBatch::Error(err)
        } else {
            IngestBatch::NeedsMoreBytes(needs_more)
        }
    }

    /// Feed a transport chunk, queueing decoded frames.
    ///
    /// Desynchronized bytes are only logged. Returns the error that discarded
    /// the buffer, if any.
    pub(crate) fn feed(
        &mut self,
        bytes: &[u8],
        frames: &mut VecDeque<DecodedFrame>,
    ) -> Option<FrameError> {
        let mut fatal = None;
        let outcome = self.ingest_iterate(bytes, |event| -> Result<(), Infallible> {
            match event {
                ParseEvent::Frame(frame) => frames.push_back(frame),
                ParseEvent::Error(FrameError::Desynchronized { .. }) => {}
                ParseEvent::Error(err) => fatal = Some(err),
                ParseEvent::NeedsMoreBytes(_) => {}
            }
            Ok(())
        });
        if let Err(never) = outcome {
            match never {}
        }
        fatal
    }

    /// Drop any buffered partial frame.
    pub fn reset(&mut self) {
        if !self.buf.is_empty() {
            debug!(discarded = self.buf.len(), "parser reset");
        }
        self.buf.clear();
    }

    /// Bytes carried over to the next call.
    pub fn residual(&self) -> &[u8] {
        &self.buf
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    fn discard(&mut self, reason: String) -> FrameError {
        error!(discarded = self.buf.len(), %reason, "discarding receive buffer");
        self.buf.clear();
        FrameError::DecodingFailure { reason }
    }
}

impl Default for StreamParser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StreamParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamParser")
            .field("residual", &self.buf.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use bgwire_registry::{Arg, MessageDescriptor, PayloadDecode, Value};

    use super::*;
    use crate::codec::encode_command;

    const BOOT_FRAME: [u8; 22] = [
        0xA0, 0x12, 0x01, 0x00, 0x02, 0x00, 0x0C, 0x00, 0x00, 0x00, 0xFE, 0xFF, 0x00, 0x00, 0x00,
        0x00, 0x01, 0x00, 0xE0, 0x7F, 0x2C, 0xE4,
    ];

    const BT_ADDRESS_RESPONSE: [u8; 10] =
        [0x20, 0x06, 0x01, 0x03, 0x06, 0x05, 0xA4, 0x03, 0x02, 0x01];

    fn events_of(parser: &mut StreamParser, bytes: &[u8]) -> Vec<ParseEvent> {
        let mut events = Vec::new();
        parser
            .ingest_iterate(bytes, |event| -> Result<(), Infallible> {
                events.push(event);
                Ok(())
            })
            .unwrap();
        events
    }

    #[test]
    fn garbage_is_dropped_one_byte_at_a_time() {
        let mut parser = StreamParser::new();
        let events = events_of(&mut parser, &[0x77, 0x07, 0x14, 0x00, 0x00]);

        let dropped: Vec<u8> = events
            .iter()
            .map(|event| match event {
                ParseEvent::Error(FrameError::Desynchronized { byte }) => *byte,
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(dropped, vec![0x77, 0x07, 0x14, 0x00, 0x00]);
        assert!(parser.residual().is_empty());
    }

    #[test]
    fn lone_tag_needs_three_more_bytes() {
        let mut parser = StreamParser::new();
        match parser.collect(&[0x20]) {
            IngestBatch::NeedsMoreBytes(missing) => assert_eq!(missing, 3),
            other => panic!("unexpected batch {other:?}"),
        }
        assert_eq!(parser.residual(), &[0x20]);
    }

    #[test]
    fn decodes_result_name() {
        let mut parser = StreamParser::new();
        let frames = parser
            .collect(&[0x20, 0x02, 0x1F, 0x04, 0x80, 0x01])
            .into_frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].name, "rsp_mesh_generic_server_init");
        assert_eq!(
            frames[0].get("result").and_then(Value::as_str),
            Some("invalid_param")
        );
        assert_eq!(frames[0].get("result_code"), Some(&Value::U16(0x0180)));
    }

    #[test]
    fn concatenated_frames_decode_in_order() {
        let mut parser = StreamParser::new();
        let wire: Vec<u8> = BOOT_FRAME.iter().copied().cycle().take(3 * 22).collect();

        let frames = parser.collect(&wire).into_frames();
        assert_eq!(frames.len(), 3);
        for frame in &frames {
            assert_eq!(frame.name, "evt_system_boot");
            assert_eq!(frame.get("hash"), Some(&Value::U32(3_828_121_568)));
        }
        assert!(parser.residual().is_empty());
    }

    #[test]
    fn longer_announced_payload_is_consumed_whole() {
        let mut parser = StreamParser::new();
        let mut wire = BOOT_FRAME.to_vec();
        // Newer firmware announces two more bytes than the table knows.
        wire[1] = 0x14;
        wire.extend_from_slice(&[0x20, 0x00]);
        wire.extend_from_slice(&BOOT_FRAME);

        let events = events_of(&mut parser, &wire);
        let frames: Vec<&DecodedFrame> = events
            .iter()
            .map(|event| match event {
                ParseEvent::Frame(frame) => frame,
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].wire_len, 24);
        assert_eq!(frames[1].wire_len, 22);
        assert_eq!(frames[1].get("hash"), Some(&Value::U32(3_828_121_568)));
        assert!(parser.residual().is_empty());
    }

    #[test]
    fn chunked_delivery_reassembles() {
        let mut parser = StreamParser::new();

        match parser.collect(&BOOT_FRAME[..3]) {
            IngestBatch::NeedsMoreBytes(missing) => assert_eq!(missing, 1),
            other => panic!("unexpected batch {other:?}"),
        }
        match parser.collect(&BOOT_FRAME[3..15]) {
            IngestBatch::NeedsMoreBytes(missing) => assert_eq!(missing, 7),
            other => panic!("unexpected batch {other:?}"),
        }
        let frames = parser.collect(&BOOT_FRAME[15..]).into_frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].get("build"), Some(&Value::U16(65534)));
        assert!(parser.residual().is_empty());
    }

    #[test]
    fn batch_suppresses_errors_when_a_frame_decodes() {
        let mut parser = StreamParser::new();
        let mut wire = vec![0x00];
        wire.extend_from_slice(&BT_ADDRESS_RESPONSE);

        let frames = parser.collect(&wire).into_frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].name, "rsp_system_get_bt_address");
        assert_eq!(
            frames[0].get("bd_addr").and_then(Value::as_str),
            Some("01:02:03:a4:05:06")
        );
    }

    #[test]
    fn per_frame_mode_interleaves_errors_and_frames() {
        let mut parser = StreamParser::new();
        let mut wire = vec![0x00];
        wire.extend_from_slice(&BT_ADDRESS_RESPONSE);
        wire.push(0x20);

        let events = events_of(&mut parser, &wire);
        assert_eq!(events.len(), 3);
        assert!(matches!(
            events[0],
            ParseEvent::Error(FrameError::Desynchronized { byte: 0x00 })
        ));
        assert!(matches!(
            events[1],
            ParseEvent::Frame(ref f) if f.name == "rsp_system_get_bt_address"
        ));
        assert!(matches!(events[2], ParseEvent::NeedsMoreBytes(3)));
    }

    #[test]
    fn batch_reports_first_error_without_frames() {
        let mut parser = StreamParser::new();
        match parser.collect(&[0x42, 0x43]) {
            IngestBatch::Error(FrameError::Desynchronized { byte }) => assert_eq!(byte, 0x42),
            other => panic!("unexpected batch {other:?}"),
        }
    }

    #[test]
    fn batch_callback_runs_once() {
        let mut parser = StreamParser::new();
        let mut calls = 0;
        parser
            .ingest(&BOOT_FRAME, |batch| -> Result<(), Infallible> {
                calls += 1;
                assert_eq!(batch.into_frames().len(), 1);
                Ok(())
            })
            .unwrap();
        parser
            .ingest(&[], |batch| -> Result<(), Infallible> {
                calls += 1;
                assert!(matches!(batch, IngestBatch::NeedsMoreBytes(0)));
                Ok(())
            })
            .unwrap();
        assert_eq!(calls, 2);
    }

    #[test]
    fn reset_discards_partial_frame() {
        let mut parser = StreamParser::new();
        parser.collect(&BOOT_FRAME[..10]);
        assert_eq!(parser.residual().len(), 10);

        parser.reset();
        assert!(parser.residual().is_empty());

        // The tail of the old frame is now garbage.
        match parser.collect(&BOOT_FRAME[10..]) {
            IngestBatch::Error(FrameError::Desynchronized { byte }) => assert_eq!(byte, 0xFE),
            other => panic!("unexpected batch {other:?}"),
        }
    }

    #[test]
    fn callback_error_keeps_committed_state() {
        let mut parser = StreamParser::new();
        let mut wire = BOOT_FRAME.to_vec();
        wire.extend_from_slice(&BT_ADDRESS_RESPONSE);

        let mut seen = 0;
        let result = parser.ingest_iterate(&wire, |event| {
            seen += 1;
            match event {
                ParseEvent::Frame(_) => Err("consumer failed"),
                _ => Ok(()),
            }
        });
        assert_eq!(result, Err("consumer failed"));
        assert_eq!(seen, 1);
        // The boot frame was consumed, the second frame is still buffered.
        assert_eq!(parser.residual(), &BT_ADDRESS_RESPONSE);

        let frames = parser.collect(&[]).into_frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].name, "rsp_system_get_bt_address");
    }

    #[test]
    fn unregistered_frames_are_skipped_silently() {
        let mut parser = StreamParser::new();
        let mut wire = vec![0xA0, 0x02, 0x77, 0x01, 0xAA, 0xBB];
        wire.extend_from_slice(&BOOT_FRAME);

        let events = events_of(&mut parser, &wire);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ParseEvent::Frame(ref f) if f.name == "evt_system_boot"));
    }

    #[test]
    fn malformed_frame_discards_whole_buffer() {
        fn overrun(payload: &[u8]) -> Result<PayloadDecode, bgwire_registry::FieldError> {
            let value = bgwire_registry::field::read_u32_le(payload, 64)?;
            Ok(PayloadDecode::Fixed(bgwire_registry::Fields::new().with("value", value)))
        }

        let mut registry = Registry::new();
        registry.register_event(0x70, 0x01, MessageDescriptor::new("vendor_counter", 1, overrun));
        let mut parser = StreamParser::with_registry(Arc::new(registry));

        let mut wire = vec![0xA0, 0x01, 0x70, 0x01, 0x05];
        wire.extend_from_slice(&BOOT_FRAME);

        match parser.collect(&wire) {
            IngestBatch::Error(err) => assert!(err.discards_buffer()),
            other => panic!("unexpected batch {other:?}"),
        }
        assert!(parser.residual().is_empty());
    }

    #[test]
    fn oversized_residual_is_discarded() {
        fn endless(_: &[u8]) -> Result<PayloadDecode, bgwire_registry::FieldError> {
            Ok(PayloadDecode::NeedsMore(1024))
        }

        let mut registry = Registry::new();
        registry.register_event(0x70, 0x02, MessageDescriptor::new("vendor_stream", 0, endless));
        let config = FrameConfig {
            max_residual_len: 16,
            ..FrameConfig::default()
        };
        let mut parser = StreamParser::with_config(Arc::new(registry), config);

        let mut wire = vec![0xA0, 0x00, 0x70, 0x02];
        wire.extend_from_slice(&[0u8; 8]);
        assert!(matches!(parser.collect(&wire), IngestBatch::NeedsMoreBytes(1024)));

        match parser.collect(&[0u8; 8]) {
            IngestBatch::Error(FrameError::DecodingFailure { .. }) => {}
            other => panic!("unexpected batch {other:?}"),
        }
        assert!(parser.residual().is_empty());
    }

    #[test]
    fn variable_length_event_spans_chunks() {
        let mut parser = StreamParser::new();
        let wire = [
            0xA0, 0x07, 0x0A, 0x00, 0x01, 0x0B, 0x00, 0x12, 0x00, 0x00, 0x03, 0x61, 0x62, 0x63,
        ];

        match parser.collect(&wire[..12]) {
            IngestBatch::NeedsMoreBytes(missing) => assert_eq!(missing, 2),
            other => panic!("unexpected batch {other:?}"),
        }
        let frames = parser.collect(&wire[12..]).into_frames();
        assert_eq!(frames[0].get("value"), Some(&Value::Bytes(b"abc".to_vec())));
        assert_eq!(frames[0].wire_len, 14);
    }

    #[test]
    fn written_value_comes_back_in_attribute_event() {
        let registry = Registry::builtin();
        let command = encode_command(
            &registry,
            "gatt_server_write_attribute_value",
            &[Arg::from(11u16), Arg::from(0u16), Arg::from("fake node")],
        )
        .unwrap();
        // Payload after attribute + offset: length byte then the value.
        let written = &command[8..];

        let mut event = vec![0xA0, 0x07, 0x0A, 0x00, 0x01, 0x0B, 0x00, 0x12, 0x00, 0x00];
        event.extend_from_slice(written);

        let mut parser = StreamParser::with_registry(registry);
        let frames = parser.collect(&event).into_frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].get("attribute"), Some(&Value::U16(11)));
        assert_eq!(
            frames[0].get("value").and_then(Value::as_bytes),
            Some(&b"fake node"[..])
        );
    }
}
