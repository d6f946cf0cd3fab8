//! Hardware and OS abstraction traits

use std::net::Ipv4Addr;

use crate::error::{PanelError, ProviderError};
use crate::model::{PerformanceReport, WirelessInfo};

/// Trait for the panel the raster is pushed to
pub trait Panel {
    /// Wake and initialize the panel (full refresh mode)
    fn init(&mut self) -> Result<(), PanelError>;

    /// Push a packed 1-bit frame and refresh the panel
    fn display_image(&mut self, buffer: &[u8]) -> Result<(), PanelError>;

    /// Put the panel into its low-power state
    fn sleep(&mut self) -> Result<(), PanelError>;

    /// Leave the hardware in a safe state before the process exits
    fn module_exit(&mut self) -> Result<(), PanelError>;
}

/// Trait for the sources of network measurements
pub trait NetworkProbe {
    fn link_address(&mut self, interface: &str) -> Result<Ipv4Addr, ProviderError>;

    /// Never fails; a failed query yields both fields absent
    fn wireless_info(&mut self) -> WirelessInfo;

    /// Returns `ProviderError::Interrupted` if a shutdown request cut the
    /// measurement short
    fn network_performance(&mut self) -> Result<PerformanceReport, ProviderError>;
}
