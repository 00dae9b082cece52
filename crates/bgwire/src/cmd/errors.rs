use bgwire_registry::result_codes::{known_codes, lookup_error_name};
use serde::Serialize;

use crate::cmd::{parse_int, ErrorsArgs};
use crate::exit::{CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_json, print_table, OutputFormat};

#[derive(Serialize)]
struct ErrorCodeOutput {
    code: u16,
    hex: String,
    name: &'static str,
}

impl ErrorCodeOutput {
    fn new(code: u16, name: &'static str) -> Self {
        Self {
            code,
            hex: format!("0x{code:04x}"),
            name,
        }
    }
}

pub fn run(args: ErrorsArgs, format: OutputFormat) -> CliResult<i32> {
    let entries: Vec<ErrorCodeOutput> = match &args.code {
        Some(input) => {
            let code = parse_int(input)
                .and_then(|value| u16::try_from(value).ok())
                .ok_or_else(|| CliError::new(USAGE, format!("invalid result code: {input}")))?;
            let name = lookup_error_name(code).ok_or_else(|| {
                CliError::new(DATA_INVALID, format!("unknown result code 0x{code:04x}"))
            })?;
            vec![ErrorCodeOutput::new(code, name)]
        }
        None => known_codes()
            .map(|(code, name)| ErrorCodeOutput::new(code, name))
            .collect(),
    };

    match format {
        OutputFormat::Json => {
            if let [single] = entries.as_slice() {
                print_json(single);
            } else {
                print_json(&entries);
            }
        }
        OutputFormat::Table => print_table(
            vec!["CODE", "NAME"],
            entries
                .iter()
                .map(|entry| vec![entry.hex.clone(), entry.name.to_string()])
                .collect(),
        ),
        OutputFormat::Pretty | OutputFormat::Raw => {
            for entry in &entries {
                println!("{} {}", entry.hex, entry.name);
            }
        }
    }

    Ok(SUCCESS)
}
