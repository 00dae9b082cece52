use crate::error::EncodeError;

/// One positional command argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Int(u64),
    Bytes(Vec<u8>),
}

impl From<u8> for Arg {
    fn from(value: u8) -> Self {
        Self::Int(u64::from(value))
    }
}

impl From<u16> for Arg {
    fn from(value: u16) -> Self {
        Self::Int(u64::from(value))
    }
}

impl From<u32> for Arg {
    fn from(value: u32) -> Self {
        Self::Int(u64::from(value))
    }
}

impl From<u64> for Arg {
    fn from(value: u64) -> Self {
        Self::Int(value)
    }
}

impl From<&[u8]> for Arg {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl From<Vec<u8>> for Arg {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

/// Strings are sent as their UTF-8 bytes.
impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Bytes(value.as_bytes().to_vec())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Self::Bytes(value.into_bytes())
    }
}

/// Typed positional access to the arguments of one command.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    command: &'static str,
    values: &'a [Arg],
}

impl<'a> Args<'a> {
    pub fn new(command: &'static str, values: &'a [Arg]) -> Self {
        Self { command, values }
    }

    pub fn command(&self) -> &'static str {
        self.command
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn u8(&self, index: usize) -> Result<u8, EncodeError> {
        self.int(index, u64::from(u8::MAX)).map(|value| value as u8)
    }

    pub fn u16(&self, index: usize) -> Result<u16, EncodeError> {
        self.int(index, u64::from(u16::MAX))
            .map(|value| value as u16)
    }

    pub fn u32(&self, index: usize) -> Result<u32, EncodeError> {
        self.int(index, u64::from(u32::MAX))
            .map(|value| value as u32)
    }

    /// Byte-array argument. Integers are not silently widened into bytes.
    pub fn bytes(&self, index: usize) -> Result<&'a [u8], EncodeError> {
        match self.get(index)? {
            Arg::Bytes(bytes) => Ok(bytes),
            Arg::Int(value) => Err(self.invalid(
                index,
                format!("expected a byte array, got integer {value}"),
            )),
        }
    }

    /// Build an `InvalidArgument` error for argument `index`.
    pub fn invalid(&self, index: usize, reason: impl Into<String>) -> EncodeError {
        EncodeError::InvalidArgument {
            command: self.command,
            index,
            reason: reason.into(),
        }
    }

    fn get(&self, index: usize) -> Result<&'a Arg, EncodeError> {
        self.values
            .get(index)
            .ok_or_else(|| self.invalid(index, "missing argument"))
    }

    fn int(&self, index: usize, max: u64) -> Result<u64, EncodeError> {
        match self.get(index)? {
            Arg::Int(value) if *value <= max => Ok(*value),
            Arg::Int(value) => Err(self.invalid(index, format!("{value} exceeds {max}"))),
            Arg::Bytes(_) => Err(self.invalid(index, "expected an integer, got a byte array")),
        }
    }
}
