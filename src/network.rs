//! Measurement providers backed by the OS and external tools

use std::ffi::CString;
use std::io::{self, Read};
use std::net::Ipv4Addr;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use log::{debug, error, warn};

use crate::config::Config;
use crate::error::ProviderError;
use crate::model::{PerformanceReport, WirelessInfo};
use crate::speedtest;
use crate::traits::NetworkProbe;

const SIGNAL_LEVEL_MARKER: &str = "Signal level=";

/// How often a running speed test is checked for exit or a shutdown request
const SPEEDTEST_POLL: Duration = Duration::from_millis(100);

#[repr(C)]
struct IfReqAddr {
    ifr_name: [libc::c_char; libc::IFNAMSIZ],
    ifr_addr: libc::sockaddr_in,
    // ifreq is a union padded to 24 bytes after the name
    _pad: [u8; 8],
}

fn validate_ifname(name: &str) -> Result<CString, ProviderError> {
    if name.trim().is_empty() || name.len() >= libc::IFNAMSIZ {
        return Err(ProviderError::InvalidInterface(name.to_string()));
    }
    CString::new(name).map_err(|_| ProviderError::InvalidInterface(name.to_string()))
}

/// IPv4 address bound to `interface`, via `SIOCGIFADDR`.
pub fn link_address(interface: &str) -> Result<Ipv4Addr, ProviderError> {
    let name = validate_ifname(interface)?;
    let interface_error = |source: io::Error| ProviderError::Interface {
        name: interface.to_string(),
        source,
    };

    // SAFETY: plain syscall with constant arguments; the result is checked.
    let raw = unsafe { libc::socket(libc::AF_INET, libc::SOCK_DGRAM, 0) };
    if raw < 0 {
        return Err(interface_error(io::Error::last_os_error()));
    }
    // SAFETY: `raw` is a freshly opened descriptor nobody else owns.
    let socket = unsafe { OwnedFd::from_raw_fd(raw) };

    // SAFETY: all-zero is a valid bit pattern for this plain C struct.
    let mut req: IfReqAddr = unsafe { std::mem::zeroed() };
    for (dst, src) in req.ifr_name.iter_mut().zip(name.as_bytes()) {
        *dst = *src as libc::c_char;
    }

    // SAFETY: `socket` is open for the whole call and `req` is a live,
    // ifreq-sized buffer the kernel writes the address into.
    let res = unsafe {
        libc::ioctl(
            socket.as_raw_fd(),
            libc::SIOCGIFADDR,
            &mut req as *mut IfReqAddr as *mut libc::c_void,
        )
    };
    if res < 0 {
        return Err(interface_error(io::Error::last_os_error()));
    }

    Ok(Ipv4Addr::from(u32::from_be(req.ifr_addr.sin_addr.s_addr)))
}

/// Signal level in dBm from `iwconfig` output, e.g. `Signal level=-55 dBm`.
pub fn parse_signal_level(iwconfig_output: &str) -> Option<i32> {
    let (_, rest) = iwconfig_output.split_once(SIGNAL_LEVEL_MARKER)?;
    rest.split(' ').next()?.trim().parse().ok()
}

fn command_stdout(program: &str, args: &[&str]) -> Result<String, String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| format!("{program}: {e}"))?;
    if !output.status.success() {
        return Err(format!("{program} exited with {}", output.status));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Probe that queries the running system.
pub struct SystemProbe {
    interface: String,
    speedtest_program: String,
    speedtest_args: Vec<String>,
    shutdown: Arc<AtomicBool>,
}

impl SystemProbe {
    pub fn new(config: &Config) -> Self {
        Self {
            interface: config.interface.to_string(),
            speedtest_program: config.speedtest_program.to_string(),
            speedtest_args: config.speedtest_args.iter().map(|a| a.to_string()).collect(),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Kill a running speed test as soon as `shutdown` is set.
    pub fn with_shutdown(mut self, shutdown: Arc<AtomicBool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Run the speed test to completion, polling for a shutdown request.
    fn run_speedtest(&self) -> Result<(ExitStatus, Vec<u8>), ProviderError> {
        let spawn_error = |source| ProviderError::Spawn {
            program: self.speedtest_program.clone(),
            source,
        };
        let wait_error = |source| ProviderError::Wait {
            program: self.speedtest_program.clone(),
            source,
        };

        let mut child = Command::new(&self.speedtest_program)
            .args(&self.speedtest_args)
            .stdout(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        // Drained off-thread while the child is polled
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| wait_error(io::Error::other("stdout not captured")))?;
        let reader = thread::spawn(move || {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).map(|_| buf)
        });

        let status = loop {
            if self.shutdown.load(Ordering::SeqCst) {
                warn!("[NET] Shutdown requested, stopping {}", self.speedtest_program);
                if let Err(e) = child.kill() {
                    warn!("[NET] Failed to kill {}: {}", self.speedtest_program, e);
                }
                let _ = child.wait();
                return Err(ProviderError::Interrupted(self.speedtest_program.clone()));
            }
            if let Some(status) = child.try_wait().map_err(wait_error)? {
                break status;
            }
            thread::sleep(SPEEDTEST_POLL);
        };

        let stdout = reader
            .join()
            .map_err(|_| wait_error(io::Error::other("stdout reader panicked")))?
            .map_err(wait_error)?;
        Ok((status, stdout))
    }

    fn query_wireless(&self) -> Result<(String, i32), String> {
        let ssid = command_stdout("iwgetid", &["-r"])?.trim().to_string();
        if ssid.is_empty() {
            return Err("not associated with any network".to_string());
        }

        let iwconfig = command_stdout("iwconfig", &[&self.interface])?;
        let signal = parse_signal_level(&iwconfig)
            .ok_or_else(|| format!("no '{SIGNAL_LEVEL_MARKER}' in iwconfig output"))?;

        Ok((ssid, signal))
    }
}

impl NetworkProbe for SystemProbe {
    fn link_address(&mut self, interface: &str) -> Result<Ipv4Addr, ProviderError> {
        link_address(interface)
    }

    fn wireless_info(&mut self) -> WirelessInfo {
        match self.query_wireless() {
            Ok((ssid, signal)) => {
                debug!("[NET] ssid={} signal={} dBm", ssid, signal);
                WirelessInfo {
                    ssid: Some(ssid),
                    signal_dbm: Some(signal),
                }
            }
            Err(e) => {
                error!("[NET] Error getting Wi-Fi info: {}", e);
                WirelessInfo::default()
            }
        }
    }

    fn network_performance(&mut self) -> Result<PerformanceReport, ProviderError> {
        debug!("[NET] Running {}", self.speedtest_program);
        let (status, stdout) = self.run_speedtest()?;

        if !status.success() {
            warn!("[NET] {} exited with {}", self.speedtest_program, status);
        }

        let report = speedtest::parse_report(&String::from_utf8_lossy(&stdout));
        debug!("[NET] Speed test: {:?}", report);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_level_is_read_from_iwconfig() {
        let output = "wlan0     IEEE 802.11  ESSID:\"HomeNet\"\n          \
                      Link Quality=55/70  Signal level=-55 dBm\n";
        assert_eq!(parse_signal_level(output), Some(-55));
    }

    #[test]
    fn missing_or_garbled_signal_level_is_absent() {
        assert_eq!(parse_signal_level("wlan0  unassociated"), None);
        assert_eq!(parse_signal_level("Signal level=unknown dBm"), None);
    }

    #[test]
    fn interface_names_are_validated() {
        assert!(matches!(
            link_address(""),
            Err(ProviderError::InvalidInterface(_))
        ));
        assert!(matches!(
            link_address("an-interface-name-too-long"),
            Err(ProviderError::InvalidInterface(_))
        ));
        assert!(matches!(
            link_address("wl\0an"),
            Err(ProviderError::InvalidInterface(_))
        ));
    }

    #[test]
    fn unknown_interface_is_an_error() {
        assert!(matches!(
            link_address("nosuchif0"),
            Err(ProviderError::Interface { .. })
        ));
    }

    fn speedtest_probe(program: &str, args: &[&str]) -> SystemProbe {
        SystemProbe {
            interface: "wlan0".into(),
            speedtest_program: program.into(),
            speedtest_args: args.iter().map(|a| a.to_string()).collect(),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    #[test]
    fn missing_speedtest_binary_is_a_spawn_error() {
        let mut probe = speedtest_probe("/nonexistent/speedtest", &[]);
        assert!(matches!(
            probe.network_performance(),
            Err(ProviderError::Spawn { .. })
        ));
    }

    #[test]
    fn speedtest_stdout_is_parsed() {
        let report = "Latency: 12.3 ms (jitter: 1.2ms)\nDownload: 95.4 Mbps\nUpload: 40.1 Mbps\n";
        let mut probe = speedtest_probe("/bin/sh", &["-c", &format!("printf '{report}'")]);

        let parsed = probe.network_performance().unwrap();
        assert_eq!(parsed.ping_ms.as_deref(), Some("12.3"));
        assert_eq!(parsed.jitter_ms.as_deref(), Some("1.2"));
        assert_eq!(parsed.download_mbps.as_deref(), Some("95.4"));
        assert_eq!(parsed.upload_mbps.as_deref(), Some("40.1"));
    }

    #[test]
    fn shutdown_kills_a_hung_speedtest() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut probe = speedtest_probe("/bin/sleep", &["30"]).with_shutdown(shutdown.clone());

        let trigger = thread::spawn(move || {
            thread::sleep(Duration::from_millis(200));
            shutdown.store(true, Ordering::SeqCst);
        });

        let started = std::time::Instant::now();
        let result = probe.network_performance();
        trigger.join().unwrap();

        assert!(matches!(result, Err(ProviderError::Interrupted(_))));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
