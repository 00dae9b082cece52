use crate::defs::class;
use crate::descriptor::{MessageDescriptor, PayloadDecode};
use crate::error::FieldError;
use crate::field::{
    format_address, len_prefixed_shortfall, len_prefixed_size, read_len_prefixed, read_u16_le,
};
use crate::result_codes::result_name;
use crate::value::Fields;

pub(super) static RESPONSES: &[(u8, u8, MessageDescriptor)] = &[
    (class::SYSTEM, 0x00, MessageDescriptor::new("system_hello", 2, result_code)),
    (
        class::SYSTEM,
        0x03,
        MessageDescriptor::new("system_get_bt_address", 6, system_get_bt_address),
    ),
    (
        class::LE_CONNECTION,
        0x04,
        MessageDescriptor::new("le_connection_close", 2, result_code),
    ),
    (
        class::GATT_SERVER,
        0x00,
        MessageDescriptor::new(
            "gatt_server_read_attribute_value",
            3,
            gatt_server_read_attribute_value,
        ),
    ),
    (
        class::GATT_SERVER,
        0x02,
        MessageDescriptor::new("gatt_server_write_attribute_value", 2, result_code),
    ),
    (class::FLASH_PS, 0x01, MessageDescriptor::new("flash_ps_erase_all", 2, result_code)),
    (class::MESH_NODE, 0x00, MessageDescriptor::new("mesh_node_init", 2, result_code)),
    (
        class::MESH_NODE,
        0x01,
        MessageDescriptor::new("mesh_node_start_unprov_beaconing", 2, result_code),
    ),
    (
        class::MESH_NODE,
        0x08,
        MessageDescriptor::new("mesh_node_set_adv_event_filter", 2, result_code),
    ),
    (
        class::MESH_GENERIC_CLIENT,
        0x04,
        MessageDescriptor::new("mesh_generic_client_init", 2, result_code),
    ),
    (
        class::MESH_GENERIC_SERVER,
        0x04,
        MessageDescriptor::new("mesh_generic_server_init", 2, result_code),
    ),
];

/// Insert `result` (symbolic) and `result_code` (raw) for the code at `offset`.
fn insert_result(
    fields: &mut Fields,
    payload: &[u8],
    offset: usize,
) -> Result<(), FieldError> {
    let code = read_u16_le(payload, offset)?;
    fields.insert("result", result_name(code));
    fields.insert("result_code", code);
    Ok(())
}

/// Shared routine for responses carrying nothing but a 16-bit result code.
fn result_code(payload: &[u8]) -> Result<PayloadDecode, FieldError> {
    let mut fields = Fields::new();
    insert_result(&mut fields, payload, 0)?;
    Ok(PayloadDecode::Fixed(fields))
}

fn system_get_bt_address(payload: &[u8]) -> Result<PayloadDecode, FieldError> {
    Ok(PayloadDecode::Fixed(Fields::new().with("bd_addr", format_address(payload, 0)?)))
}

/// `result: u16, value: uint8array`
fn gatt_server_read_attribute_value(payload: &[u8]) -> Result<PayloadDecode, FieldError> {
    let shortfall = len_prefixed_shortfall(payload, 2)?;
    if shortfall > 0 {
        return Ok(PayloadDecode::NeedsMore(shortfall));
    }
    let mut fields = Fields::new().with("value", read_len_prefixed(payload, 2)?);
    insert_result(&mut fields, payload, 0)?;
    Ok(PayloadDecode::Sized {
        eaten: 2 + len_prefixed_size(payload, 2)?,
        fields,
    })
}
