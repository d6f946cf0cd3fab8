//! On-device smoke test: providers and panel, with a pass/fail summary.

use std::net::Ipv4Addr;
use std::process::ExitCode;

use env_logger::Env;

use netpanel::{
    config::Config,
    display::{SignalBand, compose, gauge_fill_width},
    epd::FRAME_LEN,
    fonts::FontBundle,
    hardware,
    model::{Snapshot, ip_string},
    network::{self, SystemProbe},
    traits::{NetworkProbe, Panel},
};

// Test result tracking
struct TestResults {
    passed: u32,
    failed: u32,
    total: u32,
}

impl TestResults {
    fn new() -> Self {
        Self {
            passed: 0,
            failed: 0,
            total: 0,
        }
    }

    fn assert(&mut self, condition: bool, test_name: &str) {
        self.total += 1;
        if condition {
            self.passed += 1;
            println!("  ✓ {}", test_name);
        } else {
            self.failed += 1;
            println!("  ✗ {} FAILED", test_name);
        }
    }

    fn assert_eq<T: PartialEq + core::fmt::Debug>(&mut self, left: T, right: T, test_name: &str) {
        self.total += 1;
        if left == right {
            self.passed += 1;
            println!("  ✓ {}", test_name);
        } else {
            self.failed += 1;
            println!("  ✗ {} FAILED: {:?} != {:?}", test_name, left, right);
        }
    }

    fn assert_ok<T, E: core::fmt::Display>(&mut self, result: Result<T, E>, test_name: &str) -> Option<T> {
        self.total += 1;
        match result {
            Ok(value) => {
                self.passed += 1;
                println!("  ✓ {}", test_name);
                Some(value)
            }
            Err(e) => {
                self.failed += 1;
                println!("  ✗ {} FAILED: {}", test_name, e);
                None
            }
        }
    }

    fn print_summary(&self) {
        println!("\n==========================================");
        println!("Test Summary:");
        println!("  Total:  {}", self.total);
        println!("  Passed: {}", self.passed);
        println!("  Failed: {}", self.failed);
        if self.failed == 0 {
            println!("\n✓ ALL TESTS PASSED!");
        } else {
            println!("\n✗ SOME TESTS FAILED");
        }
        println!("==========================================");
    }
}

fn test_layout(results: &mut TestResults) {
    println!("\n[TEST] Layout");

    results.assert_eq(SignalBand::from_dbm(-30), SignalBand::Amazing, "band at -30 dBm");
    results.assert_eq(SignalBand::from_dbm(-67), SignalBand::VeryGood, "band at -67 dBm");
    results.assert_eq(SignalBand::from_dbm(-70), SignalBand::Okay, "band at -70 dBm");
    results.assert_eq(SignalBand::from_dbm(-71), SignalBand::Poor, "band at -71 dBm");
    results.assert_eq(gauge_fill_width(-90), 0, "empty gauge at -90 dBm");
    results.assert_eq(gauge_fill_width(-30), 150, "full gauge at -30 dBm");
}

fn test_network(results: &mut TestResults, config: &Config) -> Option<Ipv4Addr> {
    println!("\n[TEST] Network providers");

    let address = results.assert_ok(
        network::link_address(config.interface),
        &format!("{} has an IPv4 address", config.interface),
    );

    let mut probe = SystemProbe::new(config);
    let wireless = probe.wireless_info();
    results.assert(wireless.ssid.is_some(), "SSID reported");
    results.assert(wireless.signal_dbm.is_some(), "signal level reported");
    if let (Some(ssid), Some(signal)) = (&wireless.ssid, wireless.signal_dbm) {
        println!("    {} at {} dBm", ssid, signal);
    }

    address
}

fn test_panel(results: &mut TestResults, config: &Config, address: Ipv4Addr) {
    println!("\n[TEST] E-paper panel");

    let Some(mut panel) = results.assert_ok(hardware::open_panel(&config.panel), "open SPI and GPIO") else {
        return;
    };

    if results.assert_ok(panel.init(), "panel init").is_none() {
        return;
    }

    let snapshot = Snapshot {
        ip_address: ip_string(address),
        ssid: "test-hardware".into(),
        signal_dbm: -55,
        ping_ms: "0.0".into(),
        download_mbps: "0.0".into(),
        upload_mbps: "0.0".into(),
        jitter_ms: "0.0".into(),
    };
    let frame = compose(&snapshot, &FontBundle::builtin());
    results.assert_eq(frame.buffer().len(), FRAME_LEN, "frame size");

    results.assert_ok(panel.display_image(frame.buffer()), "display test frame");
    results.assert_ok(panel.sleep(), "panel sleep");
    results.assert_ok(panel.module_exit(), "module exit");
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    println!("==========================================");
    println!("netpanel hardware test");
    println!("==========================================");

    let config = Config::default();
    let mut results = TestResults::new();

    test_layout(&mut results);
    let address = test_network(&mut results, &config).unwrap_or(Ipv4Addr::UNSPECIFIED);
    test_panel(&mut results, &config, address);

    results.print_summary();

    if results.failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
