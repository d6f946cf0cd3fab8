use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::sync::mpsc;

use netpanel::{
    display::compose,
    epd::FRAME_LEN,
    error::{DashboardError, PanelError, ProviderError},
    fonts::FontBundle,
    logic::{CycleOutcome, Dashboard},
    model::{Field, PerformanceReport, Snapshot, WirelessInfo, ip_string},
    traits::{NetworkProbe, Panel},
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum PanelCall {
    Init,
    Display(usize),
    Sleep,
    ModuleExit,
}

#[derive(Default)]
struct RecordingPanel {
    calls: Vec<PanelCall>,
    frames: Vec<Vec<u8>>,
    fail_display: bool,
}

impl Panel for RecordingPanel {
    fn init(&mut self) -> Result<(), PanelError> {
        self.calls.push(PanelCall::Init);
        Ok(())
    }

    fn display_image(&mut self, buffer: &[u8]) -> Result<(), PanelError> {
        self.calls.push(PanelCall::Display(buffer.len()));
        if self.fail_display {
            return Err(PanelError::Spi("bus fault".into()));
        }
        self.frames.push(buffer.to_vec());
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), PanelError> {
        self.calls.push(PanelCall::Sleep);
        Ok(())
    }

    fn module_exit(&mut self) -> Result<(), PanelError> {
        self.calls.push(PanelCall::ModuleExit);
        Ok(())
    }
}

/// Probe replaying one scripted cycle per call
struct ScriptedProbe {
    address: Ipv4Addr,
    cycles: VecDeque<(WirelessInfo, PerformanceReport)>,
    address_queries: usize,
    performance_queries: usize,
    spawn_fails: bool,
    interrupted: bool,
}

impl ScriptedProbe {
    fn new(cycles: Vec<(WirelessInfo, PerformanceReport)>) -> Self {
        Self {
            address: Ipv4Addr::new(192, 168, 1, 20),
            cycles: cycles.into(),
            address_queries: 0,
            performance_queries: 0,
            spawn_fails: false,
            interrupted: false,
        }
    }
}

impl NetworkProbe for ScriptedProbe {
    fn link_address(&mut self, interface: &str) -> Result<Ipv4Addr, ProviderError> {
        self.address_queries += 1;
        if interface == "wlan0" {
            Ok(self.address)
        } else {
            Err(ProviderError::Interface {
                name: interface.to_string(),
                source: std::io::ErrorKind::NotFound.into(),
            })
        }
    }

    fn wireless_info(&mut self) -> WirelessInfo {
        self.cycles.front().map(|(w, _)| w.clone()).unwrap_or_default()
    }

    fn network_performance(&mut self) -> Result<PerformanceReport, ProviderError> {
        self.performance_queries += 1;
        if self.interrupted {
            return Err(ProviderError::Interrupted("/usr/bin/speedtest".into()));
        }
        if self.spawn_fails {
            return Err(ProviderError::Spawn {
                program: "/usr/bin/speedtest".into(),
                source: std::io::ErrorKind::NotFound.into(),
            });
        }
        Ok(self.cycles.pop_front().map(|(_, p)| p).unwrap_or_default())
    }
}

fn home_net() -> (WirelessInfo, PerformanceReport) {
    (
        WirelessInfo {
            ssid: Some("HomeNet".into()),
            signal_dbm: Some(-55),
        },
        PerformanceReport {
            ping_ms: Some("12.3".into()),
            download_mbps: Some("95.4".into()),
            upload_mbps: Some("40.1".into()),
            jitter_ms: Some("1.2".into()),
        },
    )
}

fn start(probe: ScriptedProbe) -> Dashboard<RecordingPanel, ScriptedProbe> {
    Dashboard::start(RecordingPanel::default(), probe, FontBundle::builtin(), "wlan0").unwrap()
}

#[test]
fn start_initializes_panel_and_reads_address() {
    let dashboard = start(ScriptedProbe::new(vec![]));
    assert_eq!(dashboard.ip_address(), "192.168.1.20");
    assert_eq!(dashboard.panel().calls, vec![PanelCall::Init]);
}

#[test]
fn unknown_interface_fails_start() {
    let result = Dashboard::start(
        RecordingPanel::default(),
        ScriptedProbe::new(vec![]),
        FontBundle::builtin(),
        "eth9",
    );
    assert!(matches!(
        result,
        Err(DashboardError::Provider(ProviderError::Interface { .. }))
    ));
}

#[test]
fn complete_cycle_refreshes_and_sleeps_panel() {
    let mut dashboard = start(ScriptedProbe::new(vec![home_net()]));

    assert_eq!(dashboard.run_cycle().unwrap(), CycleOutcome::Rendered);
    assert_eq!(
        dashboard.panel().calls,
        vec![
            PanelCall::Init,
            PanelCall::Init,
            PanelCall::Display(FRAME_LEN),
            PanelCall::Sleep,
        ]
    );

    let (wireless, performance) = home_net();
    let expected = Snapshot::assemble(
        ip_string(Ipv4Addr::new(192, 168, 1, 20)),
        wireless,
        performance,
    )
    .unwrap();
    let frame = compose(&expected, &FontBundle::builtin());
    assert_eq!(dashboard.panel().frames, vec![frame.buffer().to_vec()]);
}

#[test]
fn soft_failed_wireless_skips_push() {
    let (_, performance) = home_net();
    let mut dashboard = start(ScriptedProbe::new(vec![(WirelessInfo::default(), performance)]));

    assert_eq!(
        dashboard.run_cycle().unwrap(),
        CycleOutcome::Skipped(vec![Field::Ssid, Field::SignalStrength])
    );
    assert_eq!(dashboard.panel().calls, vec![PanelCall::Init]);
}

#[test]
fn any_single_missing_measurement_skips_push() {
    let strips: [fn(&mut PerformanceReport); 4] = [
        |p| p.ping_ms = None,
        |p| p.download_mbps = None,
        |p| p.upload_mbps = None,
        |p| p.jitter_ms = None,
    ];

    for strip in strips {
        let (wireless, mut performance) = home_net();
        strip(&mut performance);
        let mut dashboard = start(ScriptedProbe::new(vec![(wireless, performance)]));

        assert!(matches!(dashboard.run_cycle().unwrap(), CycleOutcome::Skipped(_)));
        assert!(dashboard.panel().frames.is_empty());
    }
}

#[test]
fn skipped_cycle_does_not_stick() {
    let (_, performance) = home_net();
    let mut probe = ScriptedProbe::new(vec![(WirelessInfo::default(), performance), home_net()]);
    probe.address = Ipv4Addr::new(10, 0, 0, 7);
    let mut dashboard = start(probe);

    assert!(matches!(dashboard.run_cycle().unwrap(), CycleOutcome::Skipped(_)));
    assert_eq!(dashboard.run_cycle().unwrap(), CycleOutcome::Rendered);
    assert_eq!(dashboard.panel().frames.len(), 1);
    assert_eq!(dashboard.ip_address(), "10.0.0.7");
}

#[test]
fn shutdown_request_releases_panel() {
    let mut dashboard = start(ScriptedProbe::new(vec![home_net()]));
    let (tx, rx) = mpsc::channel();
    tx.send(()).unwrap();

    dashboard.run(&rx).unwrap();

    assert_eq!(dashboard.panel().calls.last(), Some(&PanelCall::ModuleExit));
    assert_eq!(dashboard.panel().frames.len(), 1);
}

#[test]
fn skipped_cycle_still_waits_before_requerying() {
    let (_, performance) = home_net();
    let mut dashboard = start(ScriptedProbe::new(vec![(WirelessInfo::default(), performance), home_net()]));
    let (tx, rx) = mpsc::channel();
    tx.send(()).unwrap();

    dashboard.run(&rx).unwrap();

    assert_eq!(dashboard.panel().calls, vec![PanelCall::Init, PanelCall::ModuleExit]);
    assert!(dashboard.panel().frames.is_empty());
    assert_eq!(dashboard.probe().performance_queries, 1);
}

#[test]
fn interrupted_speedtest_releases_panel() {
    let mut probe = ScriptedProbe::new(vec![home_net()]);
    probe.interrupted = true;
    let mut dashboard = start(probe);
    let (_tx, rx) = mpsc::channel();

    dashboard.run(&rx).unwrap();

    assert_eq!(dashboard.panel().calls, vec![PanelCall::Init, PanelCall::ModuleExit]);
    assert_eq!(dashboard.probe().performance_queries, 1);
}

#[test]
fn panel_failure_ends_the_loop() {
    let mut panel = RecordingPanel::default();
    panel.fail_display = true;
    let mut dashboard =
        Dashboard::start(panel, ScriptedProbe::new(vec![home_net()]), FontBundle::builtin(), "wlan0").unwrap();
    let (_tx, rx) = mpsc::channel();

    let result = dashboard.run(&rx);

    assert!(matches!(result, Err(DashboardError::Panel(PanelError::Spi(_)))));
    assert!(!dashboard.panel().calls.contains(&PanelCall::ModuleExit));
}

#[test]
fn speedtest_spawn_failure_propagates() {
    let mut probe = ScriptedProbe::new(vec![home_net()]);
    probe.spawn_fails = true;
    let mut dashboard = start(probe);
    let (_tx, rx) = mpsc::channel();

    assert!(matches!(
        dashboard.run(&rx),
        Err(DashboardError::Provider(ProviderError::Spawn { .. }))
    ));
    assert_eq!(dashboard.panel().calls, vec![PanelCall::Init]);
}

#[test]
fn address_is_read_only_once() {
    let mut dashboard = start(ScriptedProbe::new(vec![home_net(), home_net()]));
    dashboard.run_cycle().unwrap();
    dashboard.run_cycle().unwrap();
    assert_eq!(dashboard.probe().address_queries, 1);
}
