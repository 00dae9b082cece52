use bgwire_registry::defs::class_name;
use bgwire_registry::{MessageKind, Registry};
use serde::Serialize;

use crate::cmd::{RegistryArgs, RegistryTable};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_json, print_table, OutputFormat};

#[derive(Serialize)]
struct EntryOutput {
    table: &'static str,
    name: String,
    class_id: Option<u8>,
    class_name: &'static str,
    message_id: u8,
    min_payload_len: u8,
    has_codec: bool,
}

pub fn run(args: RegistryArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = Registry::builtin();
    let entries = collect_entries(&registry, args.table);

    match format {
        OutputFormat::Json => print_json(&entries),
        OutputFormat::Table => print_table(
            vec!["TABLE", "NAME", "CLASS", "ID", "MIN LEN", "CODEC"],
            entries
                .iter()
                .map(|entry| {
                    vec![
                        entry.table.to_string(),
                        entry.name.clone(),
                        match entry.class_id {
                            Some(id) => format!("{} (0x{id:02x})", entry.class_name),
                            None => entry.class_name.to_string(),
                        },
                        format!("0x{:02x}", entry.message_id),
                        entry.min_payload_len.to_string(),
                        if entry.has_codec { "yes" } else { "no" }.to_string(),
                    ]
                })
                .collect(),
        ),
        OutputFormat::Pretty | OutputFormat::Raw => {
            for entry in &entries {
                println!(
                    "{} {} class={} id=0x{:02x} min={}",
                    entry.table,
                    entry.name,
                    entry.class_name,
                    entry.message_id,
                    entry.min_payload_len
                );
            }
        }
    }

    Ok(SUCCESS)
}

fn collect_entries(registry: &Registry, only: Option<RegistryTable>) -> Vec<EntryOutput> {
    let wants = |table: RegistryTable| only.is_none_or(|selected| selected == table);
    let mut entries = Vec::new();

    if wants(RegistryTable::Commands) {
        for command in registry.commands() {
            let class_id = registry.command_class(command).ok();
            entries.push(EntryOutput {
                table: "command",
                name: format!("cmd_{}", command.name),
                class_id,
                class_name: class_id.map_or("undefined", class_name),
                message_id: command.id,
                min_payload_len: command.min_payload_len,
                has_codec: command.encode.is_some(),
            });
        }
    }

    for (table, kind) in [
        (RegistryTable::Responses, MessageKind::Response),
        (RegistryTable::Events, MessageKind::Event),
    ] {
        if !wants(table) {
            continue;
        }
        for ((class_id, message_id), descriptor) in registry.messages(kind) {
            entries.push(EntryOutput {
                table: match kind {
                    MessageKind::Response => "response",
                    MessageKind::Event => "event",
                },
                name: format!("{}{}", kind.name_prefix(), descriptor.name),
                class_id: Some(class_id),
                class_name: class_name(class_id),
                message_id,
                min_payload_len: descriptor.min_payload_len,
                has_codec: descriptor.decode.is_some(),
            });
        }
    }

    entries
}
