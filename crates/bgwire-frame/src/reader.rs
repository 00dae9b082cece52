use std::collections::VecDeque;
use std::io::{ErrorKind, Read};
use std::sync::Arc;

use bgwire_registry::Registry;

use crate::codec::{DecodedFrame, FrameConfig};
use crate::error::{FrameError, Result};
use crate::parser::StreamParser;

/// Reads decoded responses and events from any `Read` stream.
///
/// Handles partial reads and line noise internally. Callers get one complete
/// frame per call.
pub struct FrameReader<T> {
    inner: T,
    parser: StreamParser,
    frames: VecDeque<DecodedFrame>,
    pending_error: Option<FrameError>,
}

impl<T: Read> FrameReader<T> {
    /// Create a reader over the built-in registry.
    pub fn new(inner: T) -> Self {
        Self::with_parser(inner, StreamParser::new())
    }

    /// Create a reader decoding against `registry`.
    pub fn with_config(inner: T, registry: Arc<Registry>, config: FrameConfig) -> Self {
        Self::with_parser(inner, StreamParser::with_config(registry, config))
    }

    /// Create a reader around an existing parser, keeping its residual bytes.
    pub fn with_parser(inner: T, parser: StreamParser) -> Self {
        Self {
            inner,
            parser,
            frames: VecDeque::new(),
            pending_error: None,
        }
    }

    /// Read the next decoded frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached. A
    /// decoding failure is returned once, after the frames decoded ahead of
    /// it; reading may continue afterwards.
    pub fn read_frame(&mut self) -> Result<DecodedFrame> {
        let mut chunk = vec![0u8; self.parser.config().read_chunk_size.max(1)];
        loop {
            if let Some(frame) = self.frames.pop_front() {
                return Ok(frame);
            }
            if let Some(err) = self.pending_error.take() {
                return Err(err);
            }

            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.pending_error = self.parser.feed(&chunk[..read], &mut self.frames);
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    pub fn parser(&self) -> &StreamParser {
        &self.parser
    }

    /// Drop buffered bytes and queued frames, e.g. after a reconnect.
    pub fn reset(&mut self) {
        self.parser.reset();
        self.frames.clear();
        self.pending_error = None;
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bgwire_registry::Value;

    use super::*;

    const BOOT_FRAME: [u8; 22] = [
        0xA0, 0x12, 0x01, 0x00, 0x02, 0x00, 0x0C, 0x00, 0x00, 0x00, 0xFE, 0xFF, 0x00, 0x00, 0x00,
        0x00, 0x01, 0x00, 0xE0, 0x7F, 0x2C, 0xE4,
    ];

    const HELLO_RESPONSE: [u8; 6] = [0x20, 0x02, 0x01, 0x00, 0x00, 0x00];

    #[test]
    fn read_single_frame() {
        let mut reader = FrameReader::new(Cursor::new(BOOT_FRAME.to_vec()));
        let frame = reader.read_frame().unwrap();

        assert_eq!(frame.name, "evt_system_boot");
        assert_eq!(frame.get("major"), Some(&Value::U16(2)));
    }

    #[test]
    fn read_multiple_frames_from_one_chunk() {
        let mut wire = HELLO_RESPONSE.to_vec();
        wire.extend_from_slice(&BOOT_FRAME);
        wire.extend_from_slice(&HELLO_RESPONSE);

        let mut reader = FrameReader::new(Cursor::new(wire));
        let names: Vec<String> = (0..3).map(|_| reader.read_frame().unwrap().name).collect();

        assert_eq!(
            names,
            ["rsp_system_hello", "evt_system_boot", "rsp_system_hello"]
        );
        assert!(matches!(reader.read_frame(), Err(FrameError::ConnectionClosed)));
    }

    #[test]
    fn partial_read_handling() {
        let byte_reader = ByteByByteReader {
            bytes: BOOT_FRAME.to_vec(),
            pos: 0,
        };
        let mut reader = FrameReader::new(byte_reader);

        let frame = reader.read_frame().unwrap();
        assert_eq!(frame.get("hash"), Some(&Value::U32(3_828_121_568)));
        assert!(reader.parser().residual().is_empty());
    }

    #[test]
    fn line_noise_is_skipped() {
        let mut wire = vec![0x00, 0xFF, 0x13];
        wire.extend_from_slice(&HELLO_RESPONSE);

        let mut reader = FrameReader::new(Cursor::new(wire));
        let frame = reader.read_frame().unwrap();
        assert_eq!(frame.get("result").and_then(Value::as_str), Some("success"));
    }

    #[test]
    fn connection_closed_cleanly() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_frame() {
        let mut reader = FrameReader::new(Cursor::new(BOOT_FRAME[..12].to_vec()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
        assert_eq!(reader.parser().residual().len(), 12);

        reader.reset();
        assert!(reader.parser().residual().is_empty());
    }

    #[test]
    fn small_chunks_reassemble() {
        let config = FrameConfig {
            read_chunk_size: 5,
            ..FrameConfig::default()
        };
        let mut wire = BOOT_FRAME.to_vec();
        wire.extend_from_slice(&HELLO_RESPONSE);

        let mut reader = FrameReader::with_config(Cursor::new(wire), Registry::builtin(), config);
        assert_eq!(reader.read_frame().unwrap().name, "evt_system_boot");
        assert_eq!(reader.read_frame().unwrap().name, "rsp_system_hello");
    }

    #[test]
    fn accessors_and_into_inner() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut reader = FrameReader::new(cursor);

        let _ = reader.get_ref();
        let _ = reader.get_mut();
        let _inner = reader.into_inner();
    }

    #[test]
    fn read_would_block_propagates_io_error() {
        let reader = WouldBlockThenData {
            state: 0,
            bytes: HELLO_RESPONSE.to_vec(),
        };
        let mut framed = FrameReader::new(reader);
        let err = framed.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::WouldBlock));
    }

    #[test]
    fn interrupted_read_retries() {
        let reader = InterruptedThenData {
            state: 0,
            bytes: HELLO_RESPONSE.to_vec(),
            pos: 0,
        };
        let mut framed = FrameReader::new(reader);
        let frame = framed.read_frame().unwrap();
        assert_eq!(frame.name, "rsp_system_hello");
    }

    #[test]
    #[cfg(unix)]
    fn roundtrip_over_socket_pair() {
        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut reader = FrameReader::new(right);

        std::thread::spawn(move || {
            use std::io::Write;
            let mut left = left;
            for chunk in BOOT_FRAME.chunks(7) {
                left.write_all(chunk).unwrap();
            }
        });

        let frame = reader.read_frame().unwrap();
        assert_eq!(frame.name, "evt_system_boot");
    }

    #[derive(Debug)]
    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct WouldBlockThenData {
        state: u8,
        bytes: Vec<u8>,
    }

    impl Read for WouldBlockThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.state == 0 {
                self.state = 1;
                return Err(std::io::Error::from(ErrorKind::WouldBlock));
            }
            let n = self.bytes.len().min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[..n]);
            self.bytes.drain(..n);
            Ok(n)
        }
    }

    struct InterruptedThenData {
        state: u8,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.state == 0 {
                self.state = 1;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            let remaining = self.bytes.len() - self.pos;
            let n = remaining.min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }
}
