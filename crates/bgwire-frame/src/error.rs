use bgwire_registry::{EncodeError, FieldError};

/// Errors that can occur while framing, decoding or transporting messages.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The byte at the stream head cannot start a frame. It has been dropped.
    #[error("desynchronized buffer: 0x{byte:02x} cannot start a frame")]
    Desynchronized { byte: u8 },

    /// A message routine ran past its payload. Frame boundaries are lost.
    #[error("malformed {message}: {source}")]
    Malformed {
        message: String,
        #[source]
        source: FieldError,
    },

    /// Decoding broke an internal invariant; the buffer was discarded.
    #[error("buffer decoding failure: {reason}")]
    DecodingFailure { reason: String },

    /// A direction-specific decoder was handed the wrong kind of frame.
    #[error("unexpected type tag 0x{found:02x} (expected 0x{expected:02x})")]
    UnexpectedTypeTag { expected: u8, found: u8 },

    /// The command could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream was closed before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

impl FrameError {
    /// True for errors after which the parser discarded its whole buffer.
    pub fn discards_buffer(&self) -> bool {
        matches!(self, Self::Malformed { .. } | Self::DecodingFailure { .. })
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
