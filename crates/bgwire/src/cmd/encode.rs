use bgwire_frame::encode_command;
use bgwire_registry::Registry;
use serde::Serialize;

use crate::cmd::{parse_args, EncodeArgs};
use crate::exit::{encode_error, CliResult, SUCCESS};
use crate::output::{print_json, print_raw, print_table, OutputFormat};

#[derive(Serialize)]
struct EncodedOutput<'a> {
    command: &'a str,
    len: usize,
    frame: String,
}

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let values = parse_args(&args.args)?;
    let registry = Registry::builtin();
    let frame = encode_command(&registry, &args.command, &values)
        .map_err(|err| encode_error("encode failed", err))?;

    match format {
        OutputFormat::Json => print_json(&EncodedOutput {
            command: &args.command,
            len: frame.len(),
            frame: hex::encode(&frame),
        }),
        OutputFormat::Table => print_table(
            vec!["COMMAND", "LEN", "FRAME"],
            vec![vec![
                args.command.clone(),
                frame.len().to_string(),
                hex::encode(&frame),
            ]],
        ),
        OutputFormat::Pretty => println!(
            "{} ({} bytes): {}",
            args.command,
            frame.len(),
            hex::encode(&frame)
        ),
        OutputFormat::Raw => print_raw(&frame),
    }

    Ok(SUCCESS)
}
