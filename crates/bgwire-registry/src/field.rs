//! Fixed-width little-endian field access and variable-length field helpers.
//!
//! Every accessor is bounds-checked and fails with [`FieldError::OutOfBounds`]
//! instead of panicking. Decoders still rely on the registry's minimum payload
//! length so that fixed fields never fail in practice.

use bytes::{BufMut, BytesMut};

use crate::defs::MAX_VARIABLE_FIELD_LEN;
use crate::error::{EncodeError, FieldError, Result};

/// Size of a hardware (Bluetooth device) address.
pub const ADDRESS_LEN: usize = 6;

fn window(buf: &[u8], offset: usize, width: usize) -> Result<&[u8]> {
    offset
        .checked_add(width)
        .and_then(|end| buf.get(offset..end))
        .ok_or(FieldError::OutOfBounds {
            offset,
            width,
            len: buf.len(),
        })
}

fn window_mut(buf: &mut [u8], offset: usize, width: usize) -> Result<&mut [u8]> {
    let len = buf.len();
    match offset.checked_add(width) {
        Some(end) if end <= len => Ok(&mut buf[offset..end]),
        _ => Err(FieldError::OutOfBounds { offset, width, len }),
    }
}

pub fn read_u8(buf: &[u8], offset: usize) -> Result<u8> {
    Ok(window(buf, offset, 1)?[0])
}

pub fn read_u16_le(buf: &[u8], offset: usize) -> Result<u16> {
    let bytes = window(buf, offset, 2)?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

pub fn read_u32_le(buf: &[u8], offset: usize) -> Result<u32> {
    let bytes = window(buf, offset, 4)?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

pub fn write_u8(buf: &mut [u8], offset: usize, value: u8) -> Result<()> {
    window_mut(buf, offset, 1)?[0] = value;
    Ok(())
}

pub fn write_u16_le(buf: &mut [u8], offset: usize, value: u16) -> Result<()> {
    window_mut(buf, offset, 2)?.copy_from_slice(&value.to_le_bytes());
    Ok(())
}

pub fn write_u32_le(buf: &mut [u8], offset: usize, value: u32) -> Result<()> {
    window_mut(buf, offset, 4)?.copy_from_slice(&value.to_le_bytes());
    Ok(())
}

/// Slice the variable-length field whose length byte sits at `offset`.
///
/// The returned slice starts at `offset + 1` and is exactly as long as the
/// length byte says.
pub fn read_len_prefixed(buf: &[u8], offset: usize) -> Result<&[u8]> {
    let len = usize::from(read_u8(buf, offset)?);
    window(buf, offset + 1, len)
}

/// Number of bytes still missing before the variable-length field at
/// `offset` is complete. Zero when the field is fully present.
pub fn len_prefixed_shortfall(buf: &[u8], offset: usize) -> Result<usize> {
    let len = usize::from(read_u8(buf, offset)?);
    let end = offset + 1 + len;
    Ok(end.saturating_sub(buf.len()))
}

/// Total size (length byte included) of the variable-length field at `offset`.
pub fn len_prefixed_size(buf: &[u8], offset: usize) -> Result<usize> {
    Ok(1 + usize::from(read_u8(buf, offset)?))
}

/// Append `value` preceded by its one-byte length.
pub fn put_len_prefixed(
    dst: &mut BytesMut,
    field: &'static str,
    value: &[u8],
) -> std::result::Result<(), EncodeError> {
    if value.len() > MAX_VARIABLE_FIELD_LEN {
        return Err(EncodeError::PayloadTooLong {
            field,
            len: value.len(),
            max: MAX_VARIABLE_FIELD_LEN,
        });
    }
    dst.reserve(1 + value.len());
    dst.put_u8(value.len() as u8);
    dst.put_slice(value);
    Ok(())
}

/// Format the 6-byte address at `offset` as `aa:bb:cc:dd:ee:ff`.
///
/// The wire carries the least significant byte first; the rendering puts the
/// most significant byte first.
pub fn format_address(buf: &[u8], offset: usize) -> Result<String> {
    let bytes = window(buf, offset, ADDRESS_LEN)?;
    let rendered: Vec<String> = bytes.iter().rev().map(|b| format!("{b:02x}")).collect();
    Ok(rendered.join(":"))
}
