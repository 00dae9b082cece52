use bytes::{BufMut, BytesMut};

use crate::args::Args;
use crate::descriptor::CommandDescriptor;
use crate::error::EncodeError;
use crate::field::{put_len_prefixed, write_u16_le};

/// Highest accepted `dfu` argument of `system_reset` (0 normal, 1 UART DFU, 2 OTA DFU).
const MAX_DFU_MODE: u8 = 2;

pub(super) static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor::bare("system_hello", 0x00),
    CommandDescriptor::with_payload("system_reset", 0x01, 1, system_reset),
    CommandDescriptor::bare("system_get_bt_address", 0x03),
    CommandDescriptor::with_payload("le_connection_close", 0x04, 1, single_u8),
    CommandDescriptor::with_payload(
        "gatt_server_read_attribute_value",
        0x00,
        4,
        gatt_server_read_attribute_value,
    ),
    CommandDescriptor::with_payload(
        "gatt_server_write_attribute_value",
        0x02,
        5,
        gatt_server_write_attribute_value,
    ),
    CommandDescriptor::bare("flash_ps_erase_all", 0x01),
    CommandDescriptor::bare("mesh_node_init", 0x00),
    CommandDescriptor::with_payload("mesh_node_start_unprov_beaconing", 0x01, 1, single_u8),
    CommandDescriptor::with_payload(
        "mesh_node_set_adv_event_filter",
        0x08,
        3,
        mesh_node_set_adv_event_filter,
    ),
    CommandDescriptor::bare("mesh_generic_client_init", 0x04),
    CommandDescriptor::bare("mesh_generic_server_init", 0x04),
];

fn system_reset(args: &Args<'_>, dst: &mut BytesMut) -> Result<(), EncodeError> {
    let dfu = args.u8(0)?;
    if dfu > MAX_DFU_MODE {
        return Err(args.invalid(0, format!("dfu mode {dfu} is not 0, 1 or 2")));
    }
    dst.put_u8(dfu);
    Ok(())
}

/// Commands whose only argument is one byte (connection handle, bearer mask).
fn single_u8(args: &Args<'_>, dst: &mut BytesMut) -> Result<(), EncodeError> {
    dst.put_u8(args.u8(0)?);
    Ok(())
}

fn gatt_server_read_attribute_value(
    args: &Args<'_>,
    dst: &mut BytesMut,
) -> Result<(), EncodeError> {
    dst.put_u16_le(args.u16(0)?);
    dst.put_u16_le(args.u16(1)?);
    Ok(())
}

/// `attribute: u16, offset: u16, value: uint8array`
fn gatt_server_write_attribute_value(
    args: &Args<'_>,
    dst: &mut BytesMut,
) -> Result<(), EncodeError> {
    let mut head = [0u8; 4];
    write_u16_le(&mut head, 0, args.u16(0)?)?;
    write_u16_le(&mut head, 2, args.u16(1)?)?;
    dst.put_slice(&head);
    put_len_prefixed(dst, "value", args.bytes(2)?)
}

/// `mask: u16, gap_data_type: uint8array`
fn mesh_node_set_adv_event_filter(args: &Args<'_>, dst: &mut BytesMut) -> Result<(), EncodeError> {
    dst.put_u16_le(args.u16(0)?);
    put_len_prefixed(dst, "gap_data_type", args.bytes(1)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Arg;

    fn encode(descriptor_name: &str, values: &[Arg]) -> Result<Vec<u8>, EncodeError> {
        let descriptor = COMMANDS
            .iter()
            .find(|d| d.name == descriptor_name)
            .expect("command should be in the table");
        let mut dst = BytesMut::new();
        let encode = descriptor.encode.expect("command should carry a payload");
        encode(&Args::new(descriptor.name, values), &mut dst)?;
        Ok(dst.to_vec())
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<&str> = COMMANDS.iter().map(|d| d.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), COMMANDS.len());
    }

    #[test]
    fn system_reset_validates_dfu_mode() {
        assert_eq!(
            encode("system_reset", &[Arg::from(2u8)]).unwrap(),
            vec![0x02]
        );
        assert!(matches!(
            encode("system_reset", &[Arg::from(3u8)]),
            Err(EncodeError::InvalidArgument { index: 0, .. })
        ));
    }

    #[test]
    fn write_attribute_value_layout() {
        let payload = encode(
            "gatt_server_write_attribute_value",
            &[Arg::from(11u16), Arg::from(0u16), Arg::from("fake node")],
        )
        .unwrap();
        assert_eq!(
            payload,
            vec![0x0B, 0x00, 0x00, 0x00, 0x09, 0x66, 0x61, 0x6B, 0x65, 0x20, 0x6E, 0x6F, 0x64, 0x65]
        );
    }

    #[test]
    fn adv_event_filter_layout() {
        let payload = encode(
            "mesh_node_set_adv_event_filter",
            &[Arg::from(0x0102u16), Arg::from(vec![0x2A, 0x2B])],
        )
        .unwrap();
        assert_eq!(payload, vec![0x02, 0x01, 0x02, 0x2A, 0x2B]);
    }

    #[test]
    fn oversized_value_is_rejected() {
        let err = encode(
            "gatt_server_write_attribute_value",
            &[Arg::from(1u16), Arg::from(0u16), Arg::from(vec![0u8; 300])],
        )
        .unwrap_err();
        assert_eq!(
            err,
            EncodeError::PayloadTooLong {
                field: "value",
                len: 300,
                max: 255
            }
        );
    }
}
