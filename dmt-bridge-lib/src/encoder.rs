//! Stateless builders for frames sent to the panel.
//!
//! Every frame is `[0x5A, 0xA5, LEN, CMD, ...payload]` where `LEN` counts the
//! command byte plus the payload. All multi-byte fields are big-endian.

use crate::frame::{Command, HEADER_1, HEADER_2};

/// Longest text payload that still fits the one-byte length field together
/// with the command byte and the two address bytes.
pub const MAX_TEXT_LEN: usize = 252;

fn build(command: Command, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.push(HEADER_1);
    frame.push(HEADER_2);
    frame.push((payload.len() + 1) as u8);
    frame.push(command.into());
    frame.extend_from_slice(payload);
    frame
}

/// Write a two-byte value to a display register.
pub fn write_register(reg: u8, data_high: u8, data_low: u8) -> Vec<u8> {
    build(Command::WriteRegister, &[reg, data_high, data_low])
}

/// Request `count` bytes from a display register.
pub fn read_register(reg: u8, count: u8) -> Vec<u8> {
    build(Command::ReadRtc, &[reg, count])
}

/// Write a raw 16-bit value to a variable-pointer address.
pub fn write_variable(addr: u16, value: u16) -> Vec<u8> {
    let a = addr.to_be_bytes();
    let v = value.to_be_bytes();
    build(Command::WriteVariable, &[a[0], a[1], v[0], v[1]])
}

/// Write a volume percentage to a variable-pointer address.
///
/// The input is clamped into `[0, 100]` and packed into the high byte of the
/// 16-bit field; the low byte is always zero.
pub fn write_volume(addr: u16, volume: i32) -> Vec<u8> {
    let level = volume.clamp(0, 100) as u16;
    write_variable(addr, level << 8)
}

/// Write ASCII text to a variable-pointer address, one byte per character,
/// no terminator. Text longer than [`MAX_TEXT_LEN`] is truncated.
pub fn write_text(addr: u16, text: &str) -> Vec<u8> {
    let text = text.as_bytes();
    let text = &text[..text.len().min(MAX_TEXT_LEN)];
    let a = addr.to_be_bytes();
    let mut payload = Vec::with_capacity(2 + text.len());
    payload.extend_from_slice(&a);
    payload.extend_from_slice(text);
    build(Command::WriteVariable, &payload)
}

/// Request `words` 16-bit values starting at a variable-pointer address.
pub fn read_variable(addr: u16, words: u8) -> Vec<u8> {
    let a = addr.to_be_bytes();
    build(Command::ReadVariable, &[a[0], a[1], words])
}
