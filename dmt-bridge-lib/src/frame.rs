use crate::error::BridgeError;
use bytes::Bytes;
use num_enum::{FromPrimitive, IntoPrimitive};
use strum_macros::Display;

/// First byte of the frame header.
pub const HEADER_1: u8 = 0x5A;

/// Second byte of the frame header.
pub const HEADER_2: u8 = 0xA5;

/// Maximum size of a complete frame on the wire, including the header.
pub const MAX_FRAME_SIZE: usize = 64;

/// Minimum size of a complete frame (header + length byte + command byte).
pub const MIN_FRAME_SIZE: usize = 4;

/// Command byte of a DMT frame.
///
/// The panel only ever speaks these four commands. Unknown command bytes are
/// still carried through decoding so callers can log them; dispatch treats
/// them as a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum Command {
    WriteRegister = 0x80,
    ReadRtc = 0x81,
    WriteVariable = 0x82,
    ReadVariable = 0x83,

    #[num_enum(catch_all)]
    Unknown(u8),
}

/// Variable-pointer address and 16-bit value carried by a `ReadVariable`
/// report or a `WriteVariable` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableReport {
    pub addr: u16,
    pub value: u16,
}

/// One complete frame received from the panel.
///
/// Frames are produced by [`crate::decoder::FrameDecoder`] and are only valid
/// for the duration of one dispatch; the decoder never queues them.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    command: Command,
    payload: Bytes,
}

impl Frame {
    pub fn command(&self) -> Command {
        self.command
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Parse the payload as `[addrHigh, addrLow, dataHigh, dataLow]`.
    ///
    /// Returns `None` unless this is a `ReadVariable` or `WriteVariable`
    /// frame with at least four payload bytes.
    pub fn variable_report(&self) -> Option<VariableReport> {
        if !matches!(self.command, Command::ReadVariable | Command::WriteVariable) {
            return None;
        }
        if self.payload.len() < 4 {
            return None;
        }
        Some(VariableReport {
            addr: u16::from_be_bytes([self.payload[0], self.payload[1]]),
            value: u16::from_be_bytes([self.payload[2], self.payload[3]]),
        })
    }

    /// Raw RTC bytes of a `ReadRtc` report.
    pub fn rtc_data(&self) -> Option<&[u8]> {
        match self.command {
            Command::ReadRtc => Some(&self.payload),
            _ => None,
        }
    }
}

impl TryFrom<Bytes> for Frame {
    type Error = BridgeError;

    fn try_from(bytes: Bytes) -> Result<Self, Self::Error> {
        if bytes.len() < MIN_FRAME_SIZE {
            return Err(BridgeError::TruncatedFrame {
                expected: MIN_FRAME_SIZE,
                actual: bytes.len(),
            });
        }
        if bytes[0] != HEADER_1 || bytes[1] != HEADER_2 {
            return Err(BridgeError::InvalidFrame(format!(
                "bad header {:#04x} {:#04x}",
                bytes[0], bytes[1]
            )));
        }
        // Length byte counts everything after itself (command included).
        let declared = bytes[2] as usize + 3;
        if declared != bytes.len() {
            return Err(BridgeError::InvalidFrame(format!(
                "length byte declares {} bytes, frame has {}",
                declared,
                bytes.len()
            )));
        }
        let command = Command::from_primitive(bytes[3]);
        let payload = bytes.slice(MIN_FRAME_SIZE..);
        Ok(Frame { command, payload })
    }
}
