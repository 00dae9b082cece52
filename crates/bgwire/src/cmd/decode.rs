use std::convert::Infallible;

use bgwire_frame::StreamParser;

use crate::cmd::{decode_hex, DecodeArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_batch, print_event, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let chunks = args
        .chunks
        .iter()
        .map(|chunk| decode_hex(chunk))
        .collect::<CliResult<Vec<_>>>()?;

    let mut parser = StreamParser::new();
    for chunk in &chunks {
        let outcome = if args.batch {
            parser.ingest(chunk, |batch| -> Result<(), Infallible> {
                print_batch(&batch, format);
                Ok(())
            })
        } else {
            parser.ingest_iterate(chunk, |event| -> Result<(), Infallible> {
                print_event(&event, format);
                Ok(())
            })
        };
        if let Err(never) = outcome {
            match never {}
        }
    }

    if !parser.residual().is_empty() {
        tracing::info!(
            residual = parser.residual().len(),
            "input ended inside a partial frame"
        );
    }

    Ok(SUCCESS)
}
