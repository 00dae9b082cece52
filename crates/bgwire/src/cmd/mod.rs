use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use bgwire_registry::Arg;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;
use crate::port::DEFAULT_BAUD_RATE;

pub mod decode;
pub mod encode;
pub mod errors;
pub mod listen;
pub mod registry;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode a command frame.
    Encode(EncodeArgs),
    /// Decode hex-encoded bytes, one ingestion call per argument.
    Decode(DecodeArgs),
    /// Read from a socket, device or capture file and print decoded frames.
    Listen(ListenArgs),
    /// Encode and write a command, optionally waiting for its response.
    Send(SendArgs),
    /// Look up result code names.
    Errors(ErrorsArgs),
    /// List the built-in message tables.
    Registry(RegistryArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Errors(args) => errors::run(args, format),
        Command::Registry(args) => registry::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Command name, e.g. system_reset.
    pub command: String,
    /// Positional arguments: integers (decimal or 0x-prefixed), hex:<bytes>, or text.
    pub args: Vec<String>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Hex-encoded input chunks (whitespace and ':' separators allowed).
    #[arg(required = true)]
    pub chunks: Vec<String>,
    /// Report one aggregated result per chunk instead of every event.
    #[arg(long)]
    pub batch: bool,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Unix socket, serial device or capture file to read from.
    pub path: PathBuf,
    /// Exit after receiving N frames.
    #[arg(long)]
    pub count: Option<usize>,
    /// Line speed when PATH is a serial device.
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Unix socket or serial device to write to.
    pub path: PathBuf,
    /// Command name, e.g. system_hello.
    pub command: String,
    /// Positional arguments: integers (decimal or 0x-prefixed), hex:<bytes>, or text.
    pub args: Vec<String>,
    /// Wait for the matching response and print it.
    #[arg(long)]
    pub wait: bool,
    /// Maximum time to wait for the response when --wait is set (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub wait_timeout: String,
    /// Line speed when PATH is a serial device.
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
}

#[derive(Args, Debug)]
pub struct ErrorsArgs {
    /// Result code (decimal or 0x-prefixed). Lists every known code when omitted.
    pub code: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum RegistryTable {
    Commands,
    Responses,
    Events,
}

#[derive(Args, Debug)]
pub struct RegistryArgs {
    /// Restrict the listing to one table.
    #[arg(long, value_name = "TABLE")]
    pub table: Option<RegistryTable>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse an unsigned integer in decimal or `0x` hex.
pub fn parse_int(input: &str) -> Option<u64> {
    match input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => input.parse().ok(),
    }
}

/// Turn a command-line token into a command argument.
pub fn parse_arg(token: &str) -> CliResult<Arg> {
    if let Some(hex) = token.strip_prefix("hex:") {
        return decode_hex(hex).map(Arg::Bytes);
    }
    Ok(match parse_int(token) {
        Some(value) => Arg::Int(value),
        None => Arg::from(token),
    })
}

pub fn parse_args(tokens: &[String]) -> CliResult<Vec<Arg>> {
    tokens.iter().map(|token| parse_arg(token)).collect()
}

/// Decode hex, ignoring whitespace and `:` separators.
pub fn decode_hex(input: &str) -> CliResult<Vec<u8>> {
    let digits: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&digits)
        .map_err(|err| CliError::new(USAGE, format!("invalid hex {input:?}: {err}")))
}
