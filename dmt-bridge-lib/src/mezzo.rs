//! HTTP client for the amplifier's zone-control API.
//!
//! The bridge needs exactly two operations per zone: push a gain and read the
//! authoritative gain back. Both go to
//! `/iv/views/web/<view>/zone-controls/<ordinal>`. Reads tolerate the two
//! response shapes the device is known to produce, and every failure mode
//! (transport, HTTP status, nonzero result code, malformed JSON) degrades to
//! "no value" rather than an error the caller has to handle.

use crate::error::BridgeError;
use crate::zones::ZoneEntry;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Connection settings for one amplifier.
#[derive(Debug, Clone)]
pub struct MezzoConfig {
    /// Base URL, e.g. `http://192.168.101.30`.
    pub base_url: String,
    /// View identifier baked into the web control URL space.
    pub view_id: String,
    /// Value of the `Installation-Client-Id` header the web API expects.
    pub client_id: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for MezzoConfig {
    fn default() -> Self {
        Self {
            base_url: "http://192.168.101.30".to_string(),
            view_id: "730665316".to_string(),
            client_id: "0add066f-0458-4a61-9f57-c3a82fbb63f9".to_string(),
            timeout: Duration::from_secs(2),
        }
    }
}

#[derive(Serialize)]
struct ZoneGain {
    #[serde(rename = "Id")]
    id: u32,
    #[serde(rename = "Gain")]
    gain: f64,
}

#[derive(Serialize)]
struct ZoneCommand {
    #[serde(rename = "Zones")]
    zones: [ZoneGain; 1],
}

pub struct MezzoClient {
    http: reqwest::Client,
    config: MezzoConfig,
}

impl MezzoClient {
    pub fn new(config: MezzoConfig) -> Result<Self, BridgeError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, config })
    }

    fn zone_url(&self, zone: &ZoneEntry) -> String {
        format!(
            "{}/iv/views/web/{}/zone-controls/{}",
            self.config.base_url, self.config.view_id, zone.ordinal
        )
    }

    // The web API rejects zone-control calls without the browser headers it
    // was built against.
    fn referer(&self) -> String {
        format!("{}/webapp/views/{}", self.config.base_url, self.config.view_id)
    }

    /// Push a gain to one zone.
    pub async fn set_gain(&self, zone: &ZoneEntry, gain: f64) -> Result<(), BridgeError> {
        let body = ZoneCommand {
            zones: [ZoneGain {
                id: zone.zone_id,
                gain,
            }],
        };
        let request = self
            .http
            .put(self.zone_url(zone))
            .header("Installation-Client-Id", &self.config.client_id)
            .header("Origin", &self.config.base_url)
            .header("Referer", self.referer())
            .json(&body)
            .send();
        let response = timeout(self.config.timeout, request).await??;
        response.error_for_status()?;
        debug!(zone = %zone.name, gain, "gain pushed");
        Ok(())
    }

    /// Read the gain the device actually applied to one zone.
    ///
    /// Any failure is logged and collapsed to `None`; the caller skips the
    /// cycle and relies on the next periodic refresh.
    pub async fn read_gain(&self, zone: &ZoneEntry) -> Option<f64> {
        match self.fetch_gain(zone).await {
            Ok(gain) => Some(gain),
            Err(err) => {
                warn!(zone = %zone.name, error = %err, "gain read failed");
                None
            }
        }
    }

    async fn fetch_gain(&self, zone: &ZoneEntry) -> Result<f64, BridgeError> {
        let request = self
            .http
            .get(self.zone_url(zone))
            .header("Accept", "application/json, text/plain, */*")
            .header("Installation-Client-Id", &self.config.client_id)
            .header("Origin", &self.config.base_url)
            .header("Referer", self.referer())
            .send();
        let response = timeout(self.config.timeout, request)
            .await??
            .error_for_status()?;
        let body: Value = timeout(self.config.timeout, response.json()).await??;

        let code = body.get("Code").and_then(Value::as_i64).unwrap_or(-1);
        if code != 0 {
            return Err(BridgeError::RemoteCode(code));
        }
        parse_gain(&body).ok_or(BridgeError::ResponseShape)
    }
}

/// Pull the gain out of either documented response shape:
/// `Result.Gain.Value` or `Result.Zones[0].Gain`.
pub(crate) fn parse_gain(body: &Value) -> Option<f64> {
    let result = body.get("Result")?;
    if let Some(gain) = result
        .get("Gain")
        .and_then(|g| g.get("Value"))
        .and_then(Value::as_f64)
    {
        return Some(gain);
    }
    result
        .get("Zones")?
        .as_array()?
        .first()?
        .get("Gain")?
        .as_f64()
}
