use std::io::{ErrorKind, Write};
use std::sync::Arc;

use bgwire_registry::{Arg, Registry};
use bytes::BytesMut;
use tracing::trace;

use crate::codec::encode_command_into;
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 64;

/// Encodes commands and writes them to any `Write` stream.
pub struct CommandWriter<T> {
    inner: T,
    registry: Arc<Registry>,
    buf: BytesMut,
}

impl<T: Write> CommandWriter<T> {
    /// Create a writer over the built-in registry.
    pub fn new(inner: T) -> Self {
        Self::with_registry(inner, Registry::builtin())
    }

    /// Create a writer encoding against `registry`.
    pub fn with_registry(inner: T, registry: Arc<Registry>) -> Self {
        Self {
            inner,
            registry,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Encode a command by name and write the whole frame (blocking).
    ///
    /// Nothing is written when encoding fails.
    pub fn send(&mut self, command: &str, args: &[Arg]) -> Result<()> {
        self.buf.clear();
        encode_command_into(&self.registry, command, args, &mut self.buf)?;

        let frame = self.buf.split().freeze();
        trace!(command, len = frame.len(), "writing command frame");
        self.write_frame(&frame)
    }

    /// Write an already-encoded frame (blocking).
    pub fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < frame.len() {
            match self.inner.write(&frame[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
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

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}
