//! Big-endian length field codec
//!
//! All accessors are bounds-checked against the slice they are given and
//! return `SmuggleError::Bounds` instead of panicking.

use crate::error::{Result, SmuggleError};
use super::constants::{U16_MAX, U24_MAX};

fn field<'a>(buf: &'a [u8], offset: usize, width: usize) -> Result<&'a [u8]> {
    offset
        .checked_add(width)
        .and_then(|end| buf.get(offset..end))
        .ok_or(SmuggleError::Bounds { offset, width, len: buf.len() })
}

fn field_mut<'a>(buf: &'a mut [u8], offset: usize, width: usize) -> Result<&'a mut [u8]> {
    let len = buf.len();
    offset
        .checked_add(width)
        .and_then(|end| buf.get_mut(offset..end))
        .ok_or(SmuggleError::Bounds { offset, width, len })
}

pub fn read_u8(buf: &[u8], offset: usize) -> Result<u8> {
    Ok(field(buf, offset, 1)?[0])
}

pub fn read_u16(buf: &[u8], offset: usize) -> Result<u16> {
    let b = field(buf, offset, 2)?;
    Ok(u16::from_be_bytes([b[0], b[1]]))
}

pub fn read_u24(buf: &[u8], offset: usize) -> Result<u32> {
    let b = field(buf, offset, 3)?;
    Ok(u32::from_be_bytes([0, b[0], b[1], b[2]]))
}

pub fn write_u16(buf: &mut [u8], offset: usize, value: u16) -> Result<()> {
    field_mut(buf, offset, 2)?.copy_from_slice(&value.to_be_bytes());
    Ok(())
}

/// Store the low 24 bits of `value`. Values above `0xFFFFFF` are rejected.
pub fn write_u24(buf: &mut [u8], offset: usize, value: u32) -> Result<()> {
    if value as usize > U24_MAX {
        return Err(SmuggleError::FieldOverflow {
            field: "u24",
            current: value as usize,
            delta: 0,
            max: U24_MAX,
        });
    }
    field_mut(buf, offset, 3)?.copy_from_slice(&value.to_be_bytes()[1..4]);
    Ok(())
}

/// `current + delta` as a u16 length field named `field`
pub fn add_u16(field: &'static str, current: u16, delta: usize) -> Result<u16> {
    (current as usize)
        .checked_add(delta)
        .filter(|&v| v <= U16_MAX)
        .map(|v| v as u16)
        .ok_or(SmuggleError::FieldOverflow {
            field,
            current: current as usize,
            delta,
            max: U16_MAX,
        })
}

/// `current + delta` as a u24 length field named `field`
pub fn add_u24(field: &'static str, current: u32, delta: usize) -> Result<u32> {
    (current as usize)
        .checked_add(delta)
        .filter(|&v| v <= U24_MAX)
        .map(|v| v as u32)
        .ok_or(SmuggleError::FieldOverflow {
            field,
            current: current as usize,
            delta,
            max: U24_MAX,
        })
}
