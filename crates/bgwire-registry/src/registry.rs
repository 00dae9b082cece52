use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use crate::defs::{class_for_name, MessageKind};
use crate::descriptor::{CommandDescriptor, MessageDescriptor};
use crate::error::EncodeError;

static BUILTIN: LazyLock<Arc<Registry>> = LazyLock::new(|| Arc::new(crate::builtin::registry()));

/// `(class_id, message_id)` key of a response or event.
pub type MessageKey = (u8, u8);

/// Lookup tables for commands, responses and events.
///
/// A registry is reference data: build it once, then share it read-only.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    commands: HashMap<&'static str, CommandDescriptor>,
    responses: HashMap<MessageKey, MessageDescriptor>,
    events: HashMap<MessageKey, MessageDescriptor>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared instance of the built-in message tables.
    pub fn builtin() -> Arc<Registry> {
        Arc::clone(&BUILTIN)
    }

    /// Register an outgoing command, keyed by its name.
    pub fn register_command(&mut self, descriptor: CommandDescriptor) -> &mut Self {
        if let Some(previous) = self.commands.insert(descriptor.name, descriptor) {
            tracing::debug!(command = previous.name, "replaced command descriptor");
        }
        self
    }

    pub fn register_response(
        &mut self,
        class_id: u8,
        message_id: u8,
        descriptor: MessageDescriptor,
    ) -> &mut Self {
        if let Some(previous) = self.responses.insert((class_id, message_id), descriptor) {
            tracing::debug!(
                response = previous.name,
                class_id,
                message_id,
                "replaced response descriptor"
            );
        }
        self
    }

    pub fn register_event(
        &mut self,
        class_id: u8,
        message_id: u8,
        descriptor: MessageDescriptor,
    ) -> &mut Self {
        if let Some(previous) = self.events.insert((class_id, message_id), descriptor) {
            tracing::debug!(
                event = previous.name,
                class_id,
                message_id,
                "replaced event descriptor"
            );
        }
        self
    }

    pub fn lookup_command(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.get(name)
    }

    pub fn lookup_response(&self, class_id: u8, message_id: u8) -> Option<&MessageDescriptor> {
        self.responses.get(&(class_id, message_id))
    }

    pub fn lookup_event(&self, class_id: u8, message_id: u8) -> Option<&MessageDescriptor> {
        self.events.get(&(class_id, message_id))
    }

    /// Lookup by direction.
    pub fn lookup(
        &self,
        kind: MessageKind,
        class_id: u8,
        message_id: u8,
    ) -> Option<&MessageDescriptor> {
        match kind {
            MessageKind::Response => self.lookup_response(class_id, message_id),
            MessageKind::Event => self.lookup_event(class_id, message_id),
        }
    }

    /// Resolve the class byte of a command: explicit class first, then name prefix.
    pub fn command_class(&self, descriptor: &CommandDescriptor) -> Result<u8, EncodeError> {
        descriptor
            .class_id
            .or_else(|| class_for_name(descriptor.name))
            .ok_or_else(|| EncodeError::UndefinedClass(descriptor.name.to_string()))
    }

    /// Registered commands sorted by name.
    pub fn commands(&self) -> Vec<&CommandDescriptor> {
        let mut commands: Vec<&CommandDescriptor> = self.commands.values().collect();
        commands.sort_unstable_by_key(|descriptor| descriptor.name);
        commands
    }

    /// Registered messages of one direction sorted by key.
    pub fn messages(&self, kind: MessageKind) -> Vec<(MessageKey, &MessageDescriptor)> {
        let table = match kind {
            MessageKind::Response => &self.responses,
            MessageKind::Event => &self.events,
        };
        let mut messages: Vec<(MessageKey, &MessageDescriptor)> =
            table.iter().map(|(key, descriptor)| (*key, descriptor)).collect();
        messages.sort_unstable_by_key(|(key, _)| *key);
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::class;

    #[test]
    fn builtin_registry_is_shared() {
        let first = Registry::builtin();
        let second = Registry::builtin();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn lookups_distinguish_direction() {
        let registry = Registry::builtin();

        let response = registry.lookup_response(class::SYSTEM, 0x03).unwrap();
        assert_eq!(response.name, "system_get_bt_address");
        assert_eq!(response.min_payload_len, 6);

        let event = registry.lookup_event(class::SYSTEM, 0x00).unwrap();
        assert_eq!(event.name, "system_boot");
        assert_eq!(
            registry
                .lookup(MessageKind::Response, class::SYSTEM, 0x00)
                .unwrap()
                .name,
            "system_hello"
        );
    }

    #[test]
    fn gaps_are_not_found() {
        let registry = Registry::builtin();
        assert!(registry.lookup_response(0x77, 0x00).is_none());
        assert!(registry.lookup_event(class::SYSTEM, 0x7f).is_none());
        assert!(registry.lookup_command("system_self_destruct").is_none());
    }

    #[test]
    fn command_class_prefers_explicit_value() {
        let registry = Registry::new();
        let derived = CommandDescriptor::bare("flash_ps_erase_all", 0x01);
        assert_eq!(registry.command_class(&derived).unwrap(), class::FLASH_PS);

        let explicit = CommandDescriptor::bare("flash_ps_erase_all", 0x01).in_class(0x42);
        assert_eq!(registry.command_class(&explicit).unwrap(), 0x42);

        let orphan = CommandDescriptor::bare("vendor_ping", 0x00);
        assert_eq!(
            registry.command_class(&orphan),
            Err(EncodeError::UndefinedClass("vendor_ping".to_string()))
        );
    }

    #[test]
    fn registering_twice_keeps_the_latest() {
        let mut registry = Registry::new();
        registry
            .register_event(0x70, 0x00, MessageDescriptor::opaque("vendor_old", 0))
            .register_event(0x70, 0x00, MessageDescriptor::opaque("vendor_new", 2));

        let event = registry.lookup_event(0x70, 0x00).unwrap();
        assert_eq!(event.name, "vendor_new");
        assert_eq!(event.min_payload_len, 2);
    }

    #[test]
    fn custom_tables_can_be_authored() {
        let mut registry = Registry::new();
        registry
            .register_command(CommandDescriptor::bare("vendor_ping", 0x07).in_class(0x70))
            .register_event(0x70, 0x01, MessageDescriptor::opaque("vendor_pong", 2));

        assert_eq!(registry.commands().len(), 1);
        assert_eq!(registry.messages(MessageKind::Event)[0].0, (0x70, 0x01));
        assert!(registry.messages(MessageKind::Response).is_empty());
    }
}
