//! Orchestration between decoded panel frames and the amplifier.
//!
//! On a slider change the bridge resolves the zone, converts the packed value
//! to a gain, pushes it to the amplifier, and arms a single deferred readback
//! that later re-reads the authoritative gain and repaints the slider. The
//! device may clamp or round the requested gain, so the panel is always
//! corrected from what the device reports, never from what was sent. A second
//! slider change before the readback fires overwrites the pending target:
//! the display is eventually consistent for the most recent change only. A
//! periodic full-zone refresh repairs anything a dropped readback missed.

use crate::error::BridgeError;
use crate::frame::{Command, Frame};
use crate::mezzo::MezzoClient;
use crate::panel::{FrameSink, Panel, ERROR_TEXT_VP};
use crate::volume;
use crate::zones::ZoneTable;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

/// Receiver of decoded frames. The run loop feeds every completed frame
/// through this seam, which keeps the bridge substitutable in tests.
#[async_trait]
pub trait FrameObserver {
    async fn on_frame(&mut self, frame: Frame);
}

/// Notified when a remote call fails at the transport level, so the host can
/// kick whatever connectivity recovery it has. The bridge itself only ever
/// skips the failed cycle.
pub trait ConnectivityObserver {
    fn on_remote_failure(&mut self);
}

/// Default observer: log and move on.
pub struct LogConnectivity;

impl ConnectivityObserver for LogConnectivity {
    fn on_remote_failure(&mut self) {
        debug!("remote call failed, leaving recovery to the host");
    }
}

/// Timing knobs for the bridge.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Delay between pushing a gain and re-reading the authoritative value.
    pub readback_delay: Duration,
    /// Interval of the periodic full-zone refresh.
    pub refresh_interval: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            readback_delay: Duration::from_millis(1500),
            refresh_interval: Duration::from_secs(12),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingReadback {
    vp_addr: u16,
    due: Instant,
}

/// Text shown on the panel while the amplifier is unreachable.
const OFFLINE_TEXT: &str = "Amp offline";

pub struct Bridge<S, C> {
    zones: ZoneTable,
    mezzo: MezzoClient,
    panel: Panel<S>,
    connectivity: C,
    config: BridgeConfig,
    pending: Option<PendingReadback>,
    remote_ok: bool,
}

impl<S, C> Bridge<S, C>
where
    S: FrameSink,
    C: ConnectivityObserver + Send,
{
    pub fn new(
        zones: ZoneTable,
        mezzo: MezzoClient,
        panel: Panel<S>,
        connectivity: C,
        config: BridgeConfig,
    ) -> Self {
        Self {
            zones,
            mezzo,
            panel,
            connectivity,
            config,
            pending: None,
            remote_ok: true,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn panel(&self) -> &Panel<S> {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut Panel<S> {
        &mut self.panel
    }

    /// Deadline of the armed readback, if one is pending.
    pub fn pending_deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.due)
    }

    /// Variable address the armed readback targets, if one is pending.
    pub fn pending_target(&self) -> Option<u16> {
        self.pending.map(|p| p.vp_addr)
    }

    /// Ask the panel to report every zone's current slider value, so the
    /// amplifier is brought in line with the panel right after boot.
    pub async fn request_zone_levels(&mut self) -> Result<(), BridgeError> {
        for zone in self.zones.entries().to_vec() {
            self.panel.request_variable(zone.vp_addr).await?;
        }
        Ok(())
    }

    /// Paint the offline state on the first failure of a run of failures.
    /// Repeated failures only notify the observer; the panel is already
    /// showing the outage.
    async fn note_remote_failure(&mut self) {
        self.connectivity.on_remote_failure();
        if !self.remote_ok {
            return;
        }
        self.remote_ok = false;
        if let Err(err) = self.panel.show_wifi_icon(false).await {
            warn!(error = %err, "failed to paint offline icon");
        }
        if let Err(err) = self.panel.show_error(OFFLINE_TEXT).await {
            warn!(error = %err, "failed to paint offline text");
        }
    }

    /// Clear the offline state once a remote call succeeds again.
    async fn note_remote_success(&mut self) {
        if self.remote_ok {
            return;
        }
        self.remote_ok = true;
        if let Err(err) = self.panel.show_wifi_icon(true).await {
            warn!(error = %err, "failed to paint online icon");
        }
        if let Err(err) = self.panel.clear_text(ERROR_TEXT_VP, OFFLINE_TEXT.len()).await {
            warn!(error = %err, "failed to clear offline text");
        }
    }

    async fn handle_variable_report(&mut self, vp_addr: u16, value: u16) {
        let Some(zone) = self.zones.resolve(vp_addr).cloned() else {
            warn!(
                vp_addr = format_args!("{vp_addr:#06x}"),
                "variable report for unknown zone address, dropping"
            );
            return;
        };

        let level = volume::packed_to_level(value);
        let gain = volume::level_to_gain(level);
        info!(zone = %zone.name, level, gain, "panel volume change");

        match self.mezzo.set_gain(&zone, gain).await {
            Ok(()) => {
                self.note_remote_success().await;
                // Overwrites any previously armed readback: only the most
                // recent change is reconciled.
                self.pending = Some(PendingReadback {
                    vp_addr,
                    due: Instant::now() + self.config.readback_delay,
                });
            }
            Err(err) => {
                warn!(zone = %zone.name, error = %err, "failed to push gain");
                self.note_remote_failure().await;
            }
        }
    }

    /// Fire the armed readback if its deadline has passed: re-read the
    /// authoritative gain and repaint the slider from it.
    pub async fn fire_due_readback(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        if Instant::now() < pending.due {
            self.pending = Some(pending);
            return;
        }
        let Some(zone) = self.zones.resolve(pending.vp_addr).cloned() else {
            return;
        };

        match self.mezzo.read_gain(&zone).await {
            Some(gain) => {
                self.note_remote_success().await;
                let level = volume::gain_to_level(gain);
                debug!(zone = %zone.name, gain, level, "readback, repainting slider");
                if let Err(err) = self.panel.show_volume(zone.vp_addr, level).await {
                    warn!(zone = %zone.name, error = %err, "slider repaint failed");
                }
            }
            None => {
                // Skip this cycle; the periodic refresh converges later.
                self.note_remote_failure().await;
            }
        }
    }

    /// Re-read every zone's gain and repaint its slider.
    pub async fn refresh_all_zones(&mut self) {
        for zone in self.zones.entries().to_vec() {
            match self.mezzo.read_gain(&zone).await {
                Some(gain) => {
                    self.note_remote_success().await;
                    let level = volume::gain_to_level(gain);
                    trace!(zone = %zone.name, gain, level, "refresh");
                    if let Err(err) = self.panel.show_volume(zone.vp_addr, level).await {
                        warn!(zone = %zone.name, error = %err, "slider repaint failed");
                    }
                }
                None => self.note_remote_failure().await,
            }
        }
    }
}

#[async_trait]
impl<S, C> FrameObserver for Bridge<S, C>
where
    S: FrameSink,
    C: ConnectivityObserver + Send,
{
    async fn on_frame(&mut self, frame: Frame) {
        match frame.command() {
            Command::ReadVariable => match frame.variable_report() {
                Some(report) => self.handle_variable_report(report.addr, report.value).await,
                None => warn!("short ReadVariable payload, dropping"),
            },
            Command::ReadRtc => debug!(payload = ?frame.rtc_data(), "rtc report"),
            Command::WriteVariable | Command::WriteRegister => {
                trace!(command = %frame.command(), "write echo from panel")
            }
            Command::Unknown(code) => {
                debug!(code = format_args!("{code:#04x}"), "unknown command, ignoring")
            }
        }
    }
}
