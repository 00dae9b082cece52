use std::io::{IsTerminal, Write};

use bgwire_frame::{DecodedFrame, FrameError, IngestBatch, ParseEvent};
use bgwire_registry::defs::class_name;
use bgwire_registry::{Fields, MessageKind};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    event: &'static str,
    kind: MessageKind,
    name: &'a str,
    class_id: u8,
    class_name: &'static str,
    message_id: u8,
    wire_len: usize,
    fields: &'a Fields,
}

impl<'a> From<&'a DecodedFrame> for FrameOutput<'a> {
    fn from(frame: &'a DecodedFrame) -> Self {
        Self {
            event: "frame",
            kind: frame.kind,
            name: &frame.name,
            class_id: frame.class_id,
            class_name: class_name(frame.class_id),
            message_id: frame.message_id,
            wire_len: frame.wire_len,
            fields: &frame.fields,
        }
    }
}

#[derive(Serialize)]
struct NoticeOutput {
    event: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    needs_more_bytes: Option<usize>,
}

pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_frame(frame: &DecodedFrame, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&FrameOutput::from(frame)),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["MESSAGE", "CLASS", "ID", "LEN", "FIELDS"])
                .add_row(vec![
                    frame.name.clone(),
                    format!("{} (0x{:02x})", class_name(frame.class_id), frame.class_id),
                    format!("0x{:02x}", frame.message_id),
                    frame.wire_len.to_string(),
                    fields_summary(&frame.fields, "\n"),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{} class={} (0x{:02x}) id=0x{:02x} len={} {}",
                frame.name,
                class_name(frame.class_id),
                frame.class_id,
                frame.message_id,
                frame.wire_len,
                fields_summary(&frame.fields, " ")
            );
        }
        OutputFormat::Raw => {
            println!("{}\t{}", frame.name, fields_summary(&frame.fields, "\t"));
        }
    }
}

pub fn print_error(err: &FrameError, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&NoticeOutput {
            event: "error",
            message: Some(err.to_string()),
            needs_more_bytes: None,
        }),
        OutputFormat::Table | OutputFormat::Pretty => println!("error: {err}"),
        OutputFormat::Raw => {}
    }
}

pub fn print_needs_more(count: usize, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&NoticeOutput {
            event: "needs_more_bytes",
            message: None,
            needs_more_bytes: Some(count),
        }),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("awaiting {count} more byte(s)")
        }
        OutputFormat::Raw => {}
    }
}

pub fn print_event(event: &ParseEvent, format: OutputFormat) {
    match event {
        ParseEvent::Frame(frame) => print_frame(frame, format),
        ParseEvent::Error(err) => print_error(err, format),
        ParseEvent::NeedsMoreBytes(count) => print_needs_more(*count, format),
    }
}

pub fn print_batch(batch: &IngestBatch, format: OutputFormat) {
    match batch {
        IngestBatch::Frames(frames) => match format {
            OutputFormat::Json => {
                let out: Vec<FrameOutput<'_>> = frames.iter().map(FrameOutput::from).collect();
                print_json(&out);
            }
            OutputFormat::Table => {
                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(vec!["MESSAGE", "LEN", "FIELDS"]);
                for frame in frames {
                    table.add_row(vec![
                        frame.name.clone(),
                        frame.wire_len.to_string(),
                        fields_summary(&frame.fields, "\n"),
                    ]);
                }
                println!("{table}");
            }
            OutputFormat::Pretty | OutputFormat::Raw => {
                for frame in frames {
                    print_frame(frame, format);
                }
            }
        },
        IngestBatch::Error(err) => print_error(err, format),
        IngestBatch::NeedsMoreBytes(count) => print_needs_more(*count, format),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Render a table with a header row; JSON callers serialize their own rows.
pub fn print_table(header: Vec<&str>, rows: Vec<Vec<String>>) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    for row in rows {
        table.add_row(row);
    }
    println!("{table}");
}

fn fields_summary(fields: &Fields, separator: &str) -> String {
    fields
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join(separator)
}
