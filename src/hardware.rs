use linux_embedded_hal::{
    CdevPin, Delay, SpidevDevice,
    gpio_cdev::{Chip, LineRequestFlags},
    spidev::{SpiModeFlags, SpidevOptions},
};
use log::info;

use crate::config::PanelWiring;
use crate::epd::Epd2in7V2;
use crate::error::PanelError;

const CONSUMER: &str = "netpanel";

pub type LinuxEpd = Epd2in7V2<SpidevDevice, CdevPin, CdevPin, Delay>;

fn request_line(chip: &mut Chip, line: u32, flags: LineRequestFlags, default: u8) -> Result<CdevPin, PanelError> {
    let handle = chip
        .get_line(line)
        .and_then(|l| l.request(flags, default, CONSUMER))
        .map_err(|e| PanelError::Gpio(format!("line {}: {}", line, e)))?;
    CdevPin::new(handle).map_err(|e| PanelError::Gpio(format!("line {}: {:?}", line, e)))
}

/// Open the SPI device and claim the GPIO lines the panel is wired to.
pub fn open_panel(wiring: &PanelWiring) -> Result<LinuxEpd, PanelError> {
    let mut spi = SpidevDevice::open(wiring.spi_path)
        .map_err(|e| PanelError::Spi(format!("{}: {:?}", wiring.spi_path, e)))?;
    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(wiring.spi_freq_hz)
        .mode(SpiModeFlags::SPI_MODE_0)
        .build();
    spi.configure(&options)
        .map_err(|e| PanelError::Spi(format!("configuring {}: {:?}", wiring.spi_path, e)))?;

    let mut chip = Chip::new(wiring.gpio_chip)
        .map_err(|e| PanelError::Gpio(format!("{}: {}", wiring.gpio_chip, e)))?;

    let rst = request_line(&mut chip, wiring.rst_line, LineRequestFlags::OUTPUT, 1)?;
    let dc = request_line(&mut chip, wiring.dc_line, LineRequestFlags::OUTPUT, 0)?;
    let pwr = request_line(&mut chip, wiring.pwr_line, LineRequestFlags::OUTPUT, 0)?;
    let busy = request_line(&mut chip, wiring.busy_line, LineRequestFlags::INPUT, 0)?;

    info!(
        "[EPD] Opened {} (RST={}, DC={}, BUSY={}, PWR={})",
        wiring.spi_path, wiring.rst_line, wiring.dc_line, wiring.busy_line, wiring.pwr_line
    );

    Ok(Epd2in7V2::new(spi, busy, dc, rst, pwr, Delay))
}
