//! Fixed configuration of the dashboard
//!
//! Nothing here is read from the command line or a file. The values mirror
//! the wiring of the Waveshare 2.7" V2 HAT on a Raspberry Pi.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::FontError;

/// Wait between two refresh cycles, whether or not the previous one rendered.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

pub const WIRELESS_INTERFACE: &str = "wlan0";

pub const SPEEDTEST_PROGRAM: &str = "/usr/bin/speedtest";
pub const SPEEDTEST_ARGS: [&str; 2] = ["--accept-license", "--accept-gdpr"];

/// Directory next to the executable holding the font assets.
pub const FONT_DIR_NAME: &str = "fonts";

const SPI_FREQ_HZ: u32 = 4_000_000;

/// SPI device and GPIO lines the panel is wired to.
#[derive(Debug, Clone)]
pub struct PanelWiring {
    pub spi_path: &'static str,
    pub spi_freq_hz: u32,
    pub gpio_chip: &'static str,
    pub rst_line: u32,
    pub dc_line: u32,
    pub busy_line: u32,
    pub pwr_line: u32,
}

impl Default for PanelWiring {
    fn default() -> Self {
        Self {
            spi_path: "/dev/spidev0.0",
            spi_freq_hz: SPI_FREQ_HZ,
            gpio_chip: "/dev/gpiochip0",
            rst_line: 17,
            dc_line: 25,
            busy_line: 24,
            pwr_line: 18,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub interface: &'static str,
    pub speedtest_program: &'static str,
    pub speedtest_args: &'static [&'static str],
    pub panel: PanelWiring,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interface: WIRELESS_INTERFACE,
            speedtest_program: SPEEDTEST_PROGRAM,
            speedtest_args: &SPEEDTEST_ARGS,
            panel: PanelWiring::default(),
        }
    }
}

impl Config {
    /// Font directory resolved relative to the running executable.
    pub fn font_dir(&self) -> Result<PathBuf, FontError> {
        let exe = std::env::current_exe().map_err(FontError::Location)?;
        let dir = exe
            .parent()
            .map(|parent| parent.join(FONT_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(FONT_DIR_NAME));
        Ok(dir)
    }
}
