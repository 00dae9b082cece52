use std::io::{self, Read};
use std::time::{Duration, Instant};

use bgwire_frame::{
    encode_command, CommandWriter, DecodedFrame, FrameError, FrameHeader, FrameReader,
};
use bgwire_registry::{MessageKind, Registry};
use tracing::{debug, info};

use crate::cmd::{parse_args, SendArgs};
use crate::exit::{
    encode_error, frame_error, io_error, CliError, CliResult, INTERNAL, SUCCESS, USAGE,
};
use crate::output::{print_frame, OutputFormat};
use crate::port::Port;

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let wait_timeout = parse_duration(&args.wait_timeout)?;
    let values = parse_args(&args.args)?;

    let registry = Registry::builtin();
    let frame = encode_command(&registry, &args.command, &values)
        .map_err(|err| encode_error("encode failed", err))?;
    let header = FrameHeader::parse(&frame)
        .ok_or_else(|| CliError::new(INTERNAL, "encoded frame is shorter than a header"))?;

    let mut port = Port::open(&args.path, args.baud)
        .map_err(|err| io_error(&format!("failed opening {}", args.path.display()), err))?;
    if port.is_capture() {
        return Err(CliError::new(
            USAGE,
            format!(
                "{} is a capture file; send needs a socket or serial device",
                args.path.display()
            ),
        ));
    }
    let reader_port = if args.wait {
        port.set_read_timeout(wait_timeout)
            .map_err(|err| io_error("failed setting read timeout", err))?;
        Some(port.try_clone().map_err(|err| io_error("failed cloning port", err))?)
    } else {
        None
    };

    let mut writer = CommandWriter::with_registry(port, registry.clone());
    writer
        .write_frame(&frame)
        .map_err(|err| frame_error("send failed", err))?;
    debug!(command = %args.command, len = frame.len(), "command sent");

    if let Some(reader_port) = reader_port {
        let mut reader = FrameReader::new(reader_port);
        let response = wait_for_response(&mut reader, &header, wait_timeout)
            .map_err(|err| frame_error("receive failed", err))?;
        print_frame(&response, format);
    }

    Ok(SUCCESS)
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

trait FrameSource {
    fn next_frame(&mut self) -> Result<DecodedFrame, FrameError>;
}

impl<T: Read> FrameSource for FrameReader<T> {
    fn next_frame(&mut self) -> Result<DecodedFrame, FrameError> {
        self.read_frame()
    }
}

/// Read until the response to `command` arrives, skipping events and
/// unrelated responses.
fn wait_for_response<S: FrameSource>(
    source: &mut S,
    command: &FrameHeader,
    timeout: Duration,
) -> Result<DecodedFrame, FrameError> {
    let deadline = Instant::now() + timeout;
    loop {
        if Instant::now() >= deadline {
            return Err(FrameError::Io(io::Error::from(io::ErrorKind::TimedOut)));
        }
        let frame = source.next_frame()?;
        if frame.kind == MessageKind::Response
            && frame.class_id == command.class_id
            && frame.message_id == command.message_id
        {
            return Ok(frame);
        }
        info!(message = %frame.name, "skipping frame while awaiting response");
    }
}
