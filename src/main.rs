use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use tokio::io::{split, AsyncReadExt};
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tokio_serial::SerialPortBuilderExt;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dmt_bridge_lib::bridge::{Bridge, BridgeConfig, LogConnectivity};
use dmt_bridge_lib::mezzo::{MezzoClient, MezzoConfig};
use dmt_bridge_lib::panel::{Panel, WriterSink};
use dmt_bridge_lib::zones::{ZoneEntry, ZoneTable};
use dmt_bridge_lib::{FrameDecoder, FrameObserver};

/// Bridges a DWIN DMT touch panel to a Powersoft Mezzo amplifier.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Serial device connected to the panel.
    #[arg(short, long, default_value = "/dev/ttyUSB0")]
    port: String,
    /// Baud rate of the panel link.
    #[arg(short, long, default_value_t = 115200)]
    baud: u32,
    /// Base URL of the amplifier.
    #[arg(short, long, default_value = "http://192.168.101.30")]
    amp: String,
    /// Delay before re-reading the authoritative gain after a change (ms).
    #[arg(long, default_value_t = 1500)]
    readback_delay_ms: u64,
    /// Interval of the periodic full-zone refresh (seconds).
    #[arg(long, default_value_t = 12)]
    refresh_secs: u64,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

fn setup_logging(verbosity: &Verbosity<InfoLevel>) {
    let filter = EnvFilter::builder()
        .with_default_directive(verbosity.tracing_level_filter().into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

/// Slider-to-zone wiring of the installation.
fn zone_table() -> Result<ZoneTable> {
    ZoneTable::new(vec![
        ZoneEntry {
            vp_addr: 0x1000,
            zone_id: 101,
            ordinal: 5,
            name: "Bar".to_string(),
        },
        ZoneEntry {
            vp_addr: 0x1010,
            zone_id: 102,
            ordinal: 6,
            name: "Lounge".to_string(),
        },
        ZoneEntry {
            vp_addr: 0x1020,
            zone_id: 103,
            ordinal: 7,
            name: "Terrace".to_string(),
        },
        ZoneEntry {
            vp_addr: 0x1030,
            zone_id: 104,
            ordinal: 8,
            name: "Dining".to_string(),
        },
    ])
    .context("invalid zone table")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.verbose);
    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    let port = tokio_serial::new(&cli.port, cli.baud)
        .open_native_async()
        .with_context(|| format!("failed to open serial port {}", cli.port))?;
    let (mut reader, writer) = split(port);

    let zones = zone_table()?;
    let mezzo = MezzoClient::new(MezzoConfig {
        base_url: cli.amp.clone(),
        ..MezzoConfig::default()
    })?;
    let config = BridgeConfig {
        readback_delay: Duration::from_millis(cli.readback_delay_ms),
        refresh_interval: Duration::from_secs(cli.refresh_secs),
    };
    let mut bridge = Bridge::new(
        zones,
        mezzo,
        Panel::new(WriterSink(writer)),
        LogConnectivity,
        config,
    );

    bridge.panel_mut().show_boot_message("System Ready").await?;
    bridge.panel_mut().show_wifi_icon(true).await?;
    bridge.panel_mut().show_status("Bridge ready").await?;
    bridge
        .panel_mut()
        .show_link_status(&format!("Amp {}", cli.amp))
        .await?;
    // Poll the panel's sliders once so the amplifier starts from what the
    // panel is showing.
    bridge.request_zone_levels().await?;

    let mut decoder = FrameDecoder::new();
    // The first tick completes immediately and paints the initial state.
    let mut refresh = interval(bridge.config().refresh_interval);
    refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut buf = [0u8; 64];

    info!(port = %cli.port, baud = cli.baud, amp = %cli.amp, "bridge running");
    loop {
        let readback_due = bridge.pending_deadline();
        tokio::select! {
            read = reader.read(&mut buf) => {
                let n = read.context("serial read failed")?;
                if n == 0 {
                    bail!("serial port {} closed", cli.port);
                }
                for &byte in &buf[..n] {
                    if let Some(frame) = decoder.feed(byte) {
                        bridge.on_frame(frame).await;
                    }
                }
            }
            _ = refresh.tick() => {
                bridge.refresh_all_zones().await;
            }
            _ = sleep_until(readback_due.unwrap_or_else(Instant::now)), if readback_due.is_some() => {
                bridge.fire_due_readback().await;
            }
        }
    }
}
