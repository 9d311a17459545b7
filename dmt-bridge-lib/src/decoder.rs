use crate::frame::{Frame, HEADER_1, HEADER_2, MAX_FRAME_SIZE};
use bytes::Bytes;
use tracing::{trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    Idle,
    HeaderSeen,
    Collecting,
}

/// Streaming reassembler for the panel's framed serial protocol.
///
/// Feed it one byte at a time; it returns a [`Frame`] when the byte completes
/// one. There is no internal queue: callers must process each emitted frame
/// before feeding further bytes if ordering matters.
///
/// Garbage outside a frame is silently discarded, a wrong second header byte
/// resynchronizes to idle, and a length byte that would exceed the 64-byte
/// receive buffer drops the frame without surfacing an error. A stalled frame
/// simply waits in the collecting state until more bytes arrive; the wire is
/// point-to-point, so there is no timeout.
#[derive(Debug)]
pub struct FrameDecoder {
    state: DecodeState,
    buf: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            state: DecodeState::Idle,
            buf: Vec::with_capacity(MAX_FRAME_SIZE),
        }
    }

    /// Consume one byte from the wire, returning a completed frame if this
    /// byte finished one.
    pub fn feed(&mut self, byte: u8) -> Option<Frame> {
        match self.state {
            DecodeState::Idle => {
                if byte == HEADER_1 {
                    self.buf.clear();
                    self.buf.push(byte);
                    self.state = DecodeState::HeaderSeen;
                } else {
                    trace!(byte = format_args!("{byte:#04x}"), "stray byte outside frame");
                }
                None
            }
            DecodeState::HeaderSeen => {
                if byte == HEADER_2 {
                    self.buf.push(byte);
                    self.state = DecodeState::Collecting;
                } else {
                    trace!(byte = format_args!("{byte:#04x}"), "header resync");
                    self.reset();
                }
                None
            }
            DecodeState::Collecting => {
                if self.buf.len() >= MAX_FRAME_SIZE {
                    warn!("receive buffer overflow, dropping frame");
                    self.reset();
                    return None;
                }
                self.buf.push(byte);

                if self.buf.len() < 3 {
                    return None;
                }
                // Length byte counts everything after itself; the full frame
                // additionally carries the two header bytes and the length
                // byte itself.
                let expected = self.buf[2] as usize + 3;
                if expected > MAX_FRAME_SIZE {
                    warn!(expected, "frame longer than buffer, dropping");
                    self.reset();
                    return None;
                }
                if self.buf.len() < expected {
                    return None;
                }

                let raw = Bytes::copy_from_slice(&self.buf);
                self.reset();
                match Frame::try_from(raw) {
                    Ok(frame) => Some(frame),
                    Err(err) => {
                        warn!(error = %err, "discarding malformed frame");
                        None
                    }
                }
            }
        }
    }

    fn reset(&mut self) {
        self.buf.clear();
        self.state = DecodeState::Idle;
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}
