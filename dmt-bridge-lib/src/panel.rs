//! Typed helpers for everything the bridge paints on the panel.
//!
//! The panel reserves fixed variable addresses for status widgets; sliders
//! live at per-zone addresses carried in the zone table.

use crate::encoder;
use crate::error::BridgeError;
use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Connectivity icon (0 = off, 1 = on).
pub const WIFI_ICON_VP: u16 = 0x2000;

/// Boot message text field.
pub const BOOT_TEXT_VP: u16 = 0x3100;

/// General status text field.
pub const STATUS_TEXT_VP: u16 = 0x3200;

/// Link status text field.
pub const LINK_TEXT_VP: u16 = 0x3300;

/// Error / signal-strength text field.
pub const ERROR_TEXT_VP: u16 = 0x3400;

/// Transmit side of the panel link.
///
/// A test double can implement this to capture frames; production code wraps
/// the serial port's write half in [`WriterSink`].
#[async_trait]
pub trait FrameSink: Send {
    async fn send(&mut self, frame: &[u8]) -> Result<(), BridgeError>;
}

/// [`FrameSink`] over any async writer.
pub struct WriterSink<W>(pub W);

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> FrameSink for WriterSink<W> {
    async fn send(&mut self, frame: &[u8]) -> Result<(), BridgeError> {
        self.0.write_all(frame).await?;
        self.0.flush().await?;
        Ok(())
    }
}

pub struct Panel<S> {
    sink: S,
}

impl<S: FrameSink> Panel<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_inner(self) -> S {
        self.sink
    }

    /// Paint a 0-100 volume level on a slider.
    pub async fn show_volume(&mut self, vp_addr: u16, level: u8) -> Result<(), BridgeError> {
        self.sink
            .send(&encoder::write_volume(vp_addr, level as i32))
            .await
    }

    /// Write a raw 16-bit value to a variable address.
    pub async fn write_variable(&mut self, vp_addr: u16, value: u16) -> Result<(), BridgeError> {
        self.sink.send(&encoder::write_variable(vp_addr, value)).await
    }

    /// Ask the panel to report the value at a variable address.
    pub async fn request_variable(&mut self, vp_addr: u16) -> Result<(), BridgeError> {
        self.sink.send(&encoder::read_variable(vp_addr, 1)).await
    }

    pub async fn show_wifi_icon(&mut self, connected: bool) -> Result<(), BridgeError> {
        self.write_variable(WIFI_ICON_VP, connected as u16).await
    }

    pub async fn show_boot_message(&mut self, message: &str) -> Result<(), BridgeError> {
        self.sink.send(&encoder::write_text(BOOT_TEXT_VP, message)).await
    }

    pub async fn show_status(&mut self, message: &str) -> Result<(), BridgeError> {
        self.sink
            .send(&encoder::write_text(STATUS_TEXT_VP, message))
            .await
    }

    pub async fn show_link_status(&mut self, message: &str) -> Result<(), BridgeError> {
        self.sink
            .send(&encoder::write_text(LINK_TEXT_VP, message))
            .await
    }

    pub async fn show_error(&mut self, message: &str) -> Result<(), BridgeError> {
        self.sink
            .send(&encoder::write_text(ERROR_TEXT_VP, message))
            .await
    }

    /// Blank a text field by overwriting it with spaces.
    pub async fn clear_text(&mut self, vp_addr: u16, chars: usize) -> Result<(), BridgeError> {
        let spaces = " ".repeat(chars);
        self.sink.send(&encoder::write_text(vp_addr, &spaces)).await
    }

    pub async fn show_rssi(&mut self, rssi: i32) -> Result<(), BridgeError> {
        let message = format!("RSSI={rssi}");
        self.sink
            .send(&encoder::write_text(ERROR_TEXT_VP, &message))
            .await
    }
}
