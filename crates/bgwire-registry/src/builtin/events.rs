use crate::defs::class;
use crate::descriptor::{MessageDescriptor, PayloadDecode};
use crate::error::FieldError;
use crate::field::{
    format_address, len_prefixed_shortfall, len_prefixed_size, read_len_prefixed, read_u16_le,
    read_u32_le, read_u8, ADDRESS_LEN,
};
use crate::result_codes::result_name;
use crate::value::Fields;

pub(super) static EVENTS: &[(u8, u8, MessageDescriptor)] = &[
    (class::SYSTEM, 0x00, MessageDescriptor::new("system_boot", 18, system_boot)),
    (
        class::LE_CONNECTION,
        0x00,
        MessageDescriptor::new("le_connection_opened", 11, le_connection_opened),
    ),
    (
        class::LE_CONNECTION,
        0x01,
        MessageDescriptor::new("le_connection_closed", 3, le_connection_closed),
    ),
    (
        class::GATT_SERVER,
        0x00,
        MessageDescriptor::new("gatt_server_attribute_value", 7, gatt_server_attribute_value),
    ),
    (
        class::MESH_NODE,
        0x00,
        MessageDescriptor::new("mesh_node_initialized", 7, mesh_node_initialized),
    ),
    (
        class::MESH_NODE,
        0x01,
        MessageDescriptor::new("mesh_node_provisioned", 6, mesh_node_provisioned),
    ),
];

fn system_boot(payload: &[u8]) -> Result<PayloadDecode, FieldError> {
    let fields = Fields::new()
        .with("major", read_u16_le(payload, 0)?)
        .with("minor", read_u16_le(payload, 2)?)
        .with("patch", read_u16_le(payload, 4)?)
        .with("build", read_u16_le(payload, 6)?)
        .with("bootloader", read_u32_le(payload, 8)?)
        .with("hw", read_u16_le(payload, 12)?)
        .with("hash", read_u32_le(payload, 14)?);
    Ok(PayloadDecode::Fixed(fields))
}

fn le_connection_opened(payload: &[u8]) -> Result<PayloadDecode, FieldError> {
    let fields = Fields::new()
        .with("address", format_address(payload, 0)?)
        .with("address_type", read_u8(payload, ADDRESS_LEN)?)
        .with("master", read_u8(payload, ADDRESS_LEN + 1)?)
        .with("connection", read_u8(payload, ADDRESS_LEN + 2)?)
        .with("bonding", read_u8(payload, ADDRESS_LEN + 3)?)
        .with("advertiser", read_u8(payload, ADDRESS_LEN + 4)?);
    Ok(PayloadDecode::Fixed(fields))
}

fn le_connection_closed(payload: &[u8]) -> Result<PayloadDecode, FieldError> {
    let reason = read_u16_le(payload, 0)?;
    let fields = Fields::new()
        .with("reason", result_name(reason))
        .with("reason_code", reason)
        .with("connection", read_u8(payload, 2)?);
    Ok(PayloadDecode::Fixed(fields))
}

/// `connection: u8, attribute: u16, att_opcode: u8, offset: u16, value: uint8array`
fn gatt_server_attribute_value(payload: &[u8]) -> Result<PayloadDecode, FieldError> {
    const VALUE_OFFSET: usize = 6;

    let shortfall = len_prefixed_shortfall(payload, VALUE_OFFSET)?;
    if shortfall > 0 {
        return Ok(PayloadDecode::NeedsMore(shortfall));
    }
    let fields = Fields::new()
        .with("connection", read_u8(payload, 0)?)
        .with("attribute", read_u16_le(payload, 1)?)
        .with("att_opcode", read_u8(payload, 3)?)
        .with("offset", read_u16_le(payload, 4)?)
        .with("value", read_len_prefixed(payload, VALUE_OFFSET)?);
    Ok(PayloadDecode::Sized {
        eaten: VALUE_OFFSET + len_prefixed_size(payload, VALUE_OFFSET)?,
        fields,
    })
}

fn mesh_node_initialized(payload: &[u8]) -> Result<PayloadDecode, FieldError> {
    let fields = Fields::new()
        // Non-zero means provisioned. Earlier decoders tested `== 0` and reported the flag inverted.
        .with("provisioned", read_u8(payload, 0)? != 0)
        .with("address", read_u16_le(payload, 1)?)
        .with("ivi", read_u32_le(payload, 3)?);
    Ok(PayloadDecode::Fixed(fields))
}

fn mesh_node_provisioned(payload: &[u8]) -> Result<PayloadDecode, FieldError> {
    let fields = Fields::new()
        .with("iv_index", read_u32_le(payload, 0)?)
        .with("address", read_u16_le(payload, 4)?);
    Ok(PayloadDecode::Fixed(fields))
}
