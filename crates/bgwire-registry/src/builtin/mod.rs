//! Built-in message tables: a representative subset of the Blue Gecko BGAPI.

mod commands;
mod events;
mod responses;

use crate::registry::Registry;

pub(crate) fn registry() -> Registry {
    let mut registry = Registry::new();
    for descriptor in commands::COMMANDS {
        registry.register_command(*descriptor);
    }
    for (class_id, message_id, descriptor) in responses::RESPONSES {
        registry.register_response(*class_id, *message_id, *descriptor);
    }
    for (class_id, message_id, descriptor) in events::EVENTS {
        registry.register_event(*class_id, *message_id, *descriptor);
    }
    registry
}
