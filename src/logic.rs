//! Refresh loop (hardware-independent)

use std::sync::mpsc::{Receiver, RecvTimeoutError};

use log::{info, warn};

use crate::config::REFRESH_INTERVAL;
use crate::display::{SignalBand, compose};
use crate::error::{DashboardError, PanelError, ProviderError};
use crate::fonts::FontBundle;
use crate::model::{Field, IpString, Snapshot, ip_string};
use crate::traits::{NetworkProbe, Panel};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A frame was pushed to the panel
    Rendered,
    /// At least one measurement was missing; nothing was pushed
    Skipped(Vec<Field>),
}

/// Owns the panel for the lifetime of the process.
pub struct Dashboard<P, N> {
    panel: P,
    probe: N,
    fonts: FontBundle,
    ip_address: IpString,
}

impl<P: Panel, N: NetworkProbe> Dashboard<P, N> {
    /// Initialize the panel and read the link address once.
    pub fn start(mut panel: P, mut probe: N, fonts: FontBundle, interface: &str) -> Result<Self, DashboardError> {
        panel.init()?;
        let address = probe.link_address(interface)?;
        info!("[CYCLE] {} has address {}", interface, address);

        Ok(Self {
            panel,
            probe,
            fonts,
            ip_address: ip_string(address),
        })
    }

    pub fn ip_address(&self) -> &str {
        self.ip_address.as_str()
    }

    /// The panel being driven, for inspection by callers and tests.
    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// The measurement source, for inspection by callers and tests.
    pub fn probe(&self) -> &N {
        &self.probe
    }

    /// Sample, and if every measurement is present, render and push.
    pub fn run_cycle(&mut self) -> Result<CycleOutcome, DashboardError> {
        let wireless = self.probe.wireless_info();
        let performance = self.probe.network_performance()?;

        let snapshot = match Snapshot::assemble(self.ip_address.clone(), wireless, performance) {
            Ok(snapshot) => snapshot,
            Err(missing) => {
                let names: Vec<String> = missing.iter().map(Field::to_string).collect();
                warn!("[CYCLE] Skipping refresh, missing: {}", names.join(", "));
                return Ok(CycleOutcome::Skipped(missing));
            }
        };

        info!(
            "[CYCLE] {} {} dBm ({})",
            snapshot.ssid,
            snapshot.signal_dbm,
            SignalBand::from_dbm(snapshot.signal_dbm).label()
        );
        let frame = compose(&snapshot, &self.fonts);

        info!("[CYCLE] Full refresh");
        self.push(frame.buffer())?;
        Ok(CycleOutcome::Rendered)
    }

    fn push(&mut self, buffer: &[u8]) -> Result<(), PanelError> {
        self.panel.init()?;
        self.panel.display_image(buffer)?;
        self.panel.sleep()
    }

    /// Cycle until a shutdown request arrives on `shutdown`.
    ///
    /// Panel and provider failures end the loop and are returned to the
    /// caller for reporting. A shutdown request, including one that cut a
    /// speed test short, releases the panel hardware before returning.
    pub fn run(&mut self, shutdown: &Receiver<()>) -> Result<(), DashboardError> {
        loop {
            match self.run_cycle() {
                Ok(_) => {}
                Err(DashboardError::Provider(ProviderError::Interrupted(program))) => {
                    info!("[CYCLE] {} interrupted", program);
                    return self.release();
                }
                Err(e) => return Err(e),
            }

            match shutdown.recv_timeout(REFRESH_INTERVAL) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => return self.release(),
            }
        }
    }

    fn release(&mut self) -> Result<(), DashboardError> {
        info!("[CYCLE] Shutdown requested");
        self.panel.module_exit()?;
        Ok(())
    }
}
