/// Errors raised by the field codec primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// A read or write of `width` bytes at `offset` runs past the buffer.
    #[error("field access out of bounds ({width} bytes at offset {offset}, buffer is {len} bytes)")]
    OutOfBounds {
        offset: usize,
        width: usize,
        len: usize,
    },
}

/// Errors raised while building an outgoing command frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// No command with this name is registered.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// The command has no explicit class and no name prefix matched.
    #[error("undefined class for command: {0}")]
    UndefinedClass(String),

    /// A variable-length field does not fit its one-byte length prefix.
    #[error("{field} is {len} bytes long (max {max})")]
    PayloadTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// A positional argument is missing, of the wrong kind or out of range.
    #[error("invalid argument #{index} for {command}: {reason}")]
    InvalidArgument {
        command: &'static str,
        index: usize,
        reason: String,
    },

    /// A field primitive failed while assembling the payload.
    #[error(transparent)]
    Field(#[from] FieldError),
}

pub type Result<T> = std::result::Result<T, FieldError>;
