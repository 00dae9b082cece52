use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bgwire_frame::{FrameError, FrameReader};
use tracing::warn;

use crate::cmd::ListenArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};
use crate::port::{is_idle, Port};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let port = Port::open(&args.path, args.baud)
        .map_err(|err| io_error(&format!("failed opening {}", args.path.display()), err))?;
    let mut reader = FrameReader::new(port);

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let frame = match reader.read_frame() {
            Ok(frame) => frame,
            Err(FrameError::ConnectionClosed) => break,
            // Serial reads time out while the line is idle.
            Err(FrameError::Io(err)) if is_idle(&err) => continue,
            Err(err) if err.discards_buffer() => {
                warn!(error = %err, "receive buffer discarded, continuing");
                continue;
            }
            Err(err) => return Err(frame_error("receive failed", err)),
        };

        print_frame(&frame, format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                return Ok(SUCCESS);
            }
        }
    }

    if !reader.parser().residual().is_empty() {
        warn!(
            residual = reader.parser().residual().len(),
            "stream ended inside a partial frame"
        );
    }

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
