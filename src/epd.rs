//! Driver for the Waveshare 2.7" e-Paper HAT V2 (176 x 264, black/white)

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiDevice,
};
use epd_waveshare::buffer_len;
use log::{debug, info};

use crate::error::PanelError;
use crate::traits::Panel;

pub const WIDTH: u32 = 176;
pub const HEIGHT: u32 = 264;

/// Bytes in one full frame
pub const FRAME_LEN: usize = buffer_len(WIDTH as usize, HEIGHT as usize);

const BUSY_TIMEOUT_MS: u32 = 10_000;
const BUSY_POLL_MS: u32 = 10;

/// Largest single write accepted by spidev with default settings
const SPI_CHUNK: usize = 4096;

mod command {
    pub const DEEP_SLEEP: u8 = 0x10;
    pub const DATA_ENTRY_MODE: u8 = 0x11;
    pub const SW_RESET: u8 = 0x12;
    pub const MASTER_ACTIVATION: u8 = 0x20;
    pub const DISPLAY_UPDATE_CONTROL_2: u8 = 0x22;
    pub const WRITE_RAM_BW: u8 = 0x24;
    pub const WRITE_RAM_RED: u8 = 0x26;
    pub const SET_RAM_Y_WINDOW: u8 = 0x45;
    pub const SET_RAM_Y_COUNTER: u8 = 0x4F;
}

pub struct Epd2in7V2<SPI, BUSY, OUT, DELAY> {
    spi: SPI,
    busy: BUSY,
    dc: OUT,
    rst: OUT,
    pwr: OUT,
    delay: DELAY,
}

fn spi_err(e: impl core::fmt::Debug) -> PanelError {
    PanelError::Spi(format!("{:?}", e))
}

fn gpio_err(e: impl core::fmt::Debug) -> PanelError {
    PanelError::Gpio(format!("{:?}", e))
}

impl<SPI, BUSY, OUT, DELAY> Epd2in7V2<SPI, BUSY, OUT, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    OUT: OutputPin,
    DELAY: DelayNs,
{
    pub fn new(spi: SPI, busy: BUSY, dc: OUT, rst: OUT, pwr: OUT, delay: DELAY) -> Self {
        Self {
            spi,
            busy,
            dc,
            rst,
            pwr,
            delay,
        }
    }

    /// Wait for the BUSY pin to go LOW
    fn wait_until_idle(&mut self) -> Result<(), PanelError> {
        let timeout_cycles = BUSY_TIMEOUT_MS / BUSY_POLL_MS;

        for _ in 0..timeout_cycles {
            if !self.busy.is_high().map_err(gpio_err)? {
                return Ok(());
            }
            self.delay.delay_ms(BUSY_POLL_MS);
        }

        Err(PanelError::BusyTimeout(BUSY_TIMEOUT_MS))
    }

    fn reset(&mut self) -> Result<(), PanelError> {
        self.rst.set_high().map_err(gpio_err)?;
        self.delay.delay_ms(200);
        self.rst.set_low().map_err(gpio_err)?;
        self.delay.delay_ms(2);
        self.rst.set_high().map_err(gpio_err)?;
        self.delay.delay_ms(200);
        Ok(())
    }

    fn command(&mut self, command: u8) -> Result<(), PanelError> {
        self.dc.set_low().map_err(gpio_err)?;
        self.spi.write(&[command]).map_err(spi_err)
    }

    fn data(&mut self, data: &[u8]) -> Result<(), PanelError> {
        self.dc.set_high().map_err(gpio_err)?;
        for chunk in data.chunks(SPI_CHUNK) {
            self.spi.write(chunk).map_err(spi_err)?;
        }
        Ok(())
    }

    fn command_with_data(&mut self, command: u8, data: &[u8]) -> Result<(), PanelError> {
        self.command(command)?;
        self.data(data)
    }

    fn turn_on_display(&mut self) -> Result<(), PanelError> {
        self.command_with_data(command::DISPLAY_UPDATE_CONTROL_2, &[0xF7])?;
        self.command(command::MASTER_ACTIVATION)?;
        self.wait_until_idle()
    }
}

impl<SPI, BUSY, OUT, DELAY> Panel for Epd2in7V2<SPI, BUSY, OUT, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    OUT: OutputPin,
    DELAY: DelayNs,
{
    fn init(&mut self) -> Result<(), PanelError> {
        debug!("[EPD] Init");
        self.pwr.set_high().map_err(gpio_err)?;
        self.reset()?;
        self.wait_until_idle()?;

        self.command(command::SW_RESET)?;
        self.wait_until_idle()?;

        self.command_with_data(command::SET_RAM_Y_WINDOW, &[0x00, 0x00, 0x07, 0x01])?;
        self.command_with_data(command::SET_RAM_Y_COUNTER, &[0x00, 0x00])?;
        // X increment, Y increment
        self.command_with_data(command::DATA_ENTRY_MODE, &[0x03])
    }

    fn display_image(&mut self, buffer: &[u8]) -> Result<(), PanelError> {
        if buffer.len() != FRAME_LEN {
            return Err(PanelError::FrameSize {
                expected: FRAME_LEN,
                actual: buffer.len(),
            });
        }

        info!("[EPD] Updating display...");
        self.command_with_data(command::WRITE_RAM_BW, buffer)?;
        self.command_with_data(command::WRITE_RAM_RED, buffer)?;
        self.turn_on_display()?;
        info!("[EPD] Display updated");
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), PanelError> {
        debug!("[EPD] Deep sleep");
        self.command_with_data(command::DEEP_SLEEP, &[0x01])?;
        self.delay.delay_ms(2_000);
        Ok(())
    }

    fn module_exit(&mut self) -> Result<(), PanelError> {
        info!("[EPD] Module exit");
        self.rst.set_low().map_err(gpio_err)?;
        self.dc.set_low().map_err(gpio_err)?;
        self.pwr.set_low().map_err(gpio_err)
    }
}
