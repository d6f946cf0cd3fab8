// Model of the data sampled in each refresh cycle

use core::fmt::{self, Write};
use std::net::Ipv4Addr;

use heapless::String as FixedString;

/// Dotted-quad IPv4 literal, at most 15 characters.
pub type IpString = FixedString<16>;

pub fn ip_string(addr: Ipv4Addr) -> IpString {
    let mut buffer = IpString::new();
    let _ = write!(buffer, "{}", addr);
    buffer
}

/// Result of the wireless query. Both fields are absent on any failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WirelessInfo {
    pub ssid: Option<String>,
    pub signal_dbm: Option<i32>,
}

/// Quantities extracted from a speed test report, each found independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerformanceReport {
    pub ping_ms: Option<String>,
    pub download_mbps: Option<String>,
    pub upload_mbps: Option<String>,
    pub jitter_ms: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Ssid,
    SignalStrength,
    Ping,
    Download,
    Upload,
    Jitter,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Ssid => "ssid",
            Field::SignalStrength => "signal strength",
            Field::Ping => "ping",
            Field::Download => "download",
            Field::Upload => "upload",
            Field::Jitter => "jitter",
        };
        f.write_str(name)
    }
}

/// One cycle's complete set of measurements.
///
/// There is no way to build a snapshot with a missing field, so anything
/// holding a `Snapshot` can be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub ip_address: IpString,
    pub ssid: String,
    pub signal_dbm: i32,
    pub ping_ms: String,
    pub download_mbps: String,
    pub upload_mbps: String,
    pub jitter_ms: String,
}

impl Snapshot {
    /// Completeness gate: returns every missing field if any is absent.
    pub fn assemble(
        ip_address: IpString,
        wireless: WirelessInfo,
        performance: PerformanceReport,
    ) -> Result<Self, Vec<Field>> {
        match (
            wireless.ssid,
            wireless.signal_dbm,
            performance.ping_ms,
            performance.download_mbps,
            performance.upload_mbps,
            performance.jitter_ms,
        ) {
            (Some(ssid), Some(signal_dbm), Some(ping_ms), Some(download_mbps), Some(upload_mbps), Some(jitter_ms)) => {
                Ok(Self {
                    ip_address,
                    ssid,
                    signal_dbm,
                    ping_ms,
                    download_mbps,
                    upload_mbps,
                    jitter_ms,
                })
            }
            (ssid, signal, ping, download, upload, jitter) => {
                let presence = [
                    (Field::Ssid, ssid.is_some()),
                    (Field::SignalStrength, signal.is_some()),
                    (Field::Ping, ping.is_some()),
                    (Field::Download, download.is_some()),
                    (Field::Upload, upload.is_some()),
                    (Field::Jitter, jitter.is_some()),
                ];
                Err(presence
                    .into_iter()
                    .filter(|(_, present)| !present)
                    .map(|(field, _)| field)
                    .collect())
            }
        }
    }
}
