//! Byte transport for `listen` and `send`: a Unix socket, a serial device or a capture file.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::Duration;

#[cfg(unix)]
use std::os::unix::net::UnixStream;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::debug;

pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Serial read timeout when no deadline is requested. Reads that hit it
/// return `TimedOut` and the caller decides whether to keep waiting.
pub const SERIAL_IDLE_TIMEOUT: Duration = Duration::from_millis(500);

pub enum Port {
    #[cfg(unix)]
    Socket(UnixStream),
    Serial(Box<dyn SerialPort>),
    /// Regular file holding a recorded byte stream. Opened read-only.
    Capture(File),
}

impl Port {
    /// Open `path`: connect to a Unix socket, read a regular file, or open
    /// anything else as a serial device at `baud_rate` (8N1, no flow control).
    pub fn open(path: &Path, baud_rate: u32) -> io::Result<Self> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => return File::open(path).map(Self::Capture),
            #[cfg(unix)]
            Ok(meta) if is_socket(&meta) => return UnixStream::connect(path).map(Self::Socket),
            #[cfg(unix)]
            Err(err) => return Err(err),
            _ => {}
        }
        open_serial(path, baud_rate).map(Self::Serial)
    }

    pub fn is_capture(&self) -> bool {
        matches!(self, Self::Capture(_))
    }

    /// Bound blocking reads. Capture files never block, so they ignore it.
    pub fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        match self {
            #[cfg(unix)]
            Self::Socket(stream) => stream.set_read_timeout(Some(timeout)),
            Self::Serial(port) => port.set_timeout(timeout).map_err(io::Error::from),
            Self::Capture(_) => Ok(()),
        }
    }

    pub fn try_clone(&self) -> io::Result<Self> {
        match self {
            #[cfg(unix)]
            Self::Socket(stream) => stream.try_clone().map(Self::Socket),
            Self::Serial(port) => port.try_clone().map(Self::Serial).map_err(io::Error::from),
            Self::Capture(file) => file.try_clone().map(Self::Capture),
        }
    }
}

fn open_serial(path: &Path, baud_rate: u32) -> io::Result<Box<dyn SerialPort>> {
    let name = path.to_str().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("serial device path is not valid UTF-8: {}", path.display()),
        )
    })?;
    let port = serialport::new(name, baud_rate)
        .data_bits(DataBits::Eight)
        .stop_bits(StopBits::One)
        .parity(Parity::None)
        .flow_control(FlowControl::None)
        .timeout(SERIAL_IDLE_TIMEOUT)
        .open()
        .map_err(io::Error::from)?;
    debug!(device = name, baud_rate, "serial device opened");
    Ok(port)
}

#[cfg(unix)]
fn is_socket(meta: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::FileTypeExt;
    meta.file_type().is_socket()
}

/// True for read errors that only mean nothing arrived before the timeout.
pub fn is_idle(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}

impl Read for Port {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            #[cfg(unix)]
            Self::Socket(stream) => stream.read(buf),
            Self::Serial(port) => port.read(buf),
            Self::Capture(file) => file.read(buf),
        }
    }
}

impl Write for Port {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            #[cfg(unix)]
            Self::Socket(stream) => stream.write(buf),
            Self::Serial(port) => port.write(buf),
            Self::Capture(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            #[cfg(unix)]
            Self::Socket(stream) => stream.flush(),
            Self::Serial(port) => port.flush(),
            Self::Capture(file) => file.flush(),
        }
    }
}
