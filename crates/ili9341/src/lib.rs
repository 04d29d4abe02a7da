#![cfg_attr(not(test), no_std)]

//! ILI9341 (240x320 RGB565 TFT) driver primitives.

pub mod protocol;

#[cfg(feature = "embedded-graphics")]
mod graphics;

use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiBus};

/// Pixels per bus write when streaming a solid color.
const CHUNK_PIXELS: usize = 64;
const CHUNK_BYTES: usize = CHUNK_PIXELS * protocol::BYTES_PER_PIXEL;

/// Driver configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// Addressable width in pixels.
    pub width: u16,
    /// Addressable height in pixels.
    pub height: u16,
    /// Expected SPI clock in Hz (documented for board glue).
    pub spi_hz: u32,
    /// Length of each half of the hardware reset pulse.
    pub reset_pulse_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: protocol::WIDTH,
            height: protocol::HEIGHT,
            spi_hz: 40_000_000,
            reset_pulse_ms: 50,
        }
    }
}

/// Driver errors.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Error<SpiErr, DcErr, CsErr, RstErr> {
    /// SPI transfer failed.
    Spi(SpiErr),
    /// Command/data select pin failed.
    Dc(DcErr),
    /// Chip-select pin failed.
    Cs(CsErr),
    /// Reset pin failed.
    Rst(RstErr),
}

pub type DriverResult<SpiErr, DcErr, CsErr, RstErr> = Result<(), Error<SpiErr, DcErr, CsErr, RstErr>>;

/// ILI9341 driver over a blocking SPI bus with discrete DC, CS and RST lines.
///
/// Chip select is asserted low around every command or data transaction.
/// Window coordinates are not validated; out-of-range windows are the
/// caller's problem.
#[derive(Debug)]
pub struct Ili9341<SPI, DC, CS, RST> {
    spi: SPI,
    dc: DC,
    cs: CS,
    rst: RST,
    config: Config,
}

impl<SPI, DC, CS, RST> Ili9341<SPI, DC, CS, RST>
where
    SPI: SpiBus<u8>,
    DC: OutputPin,
    CS: OutputPin,
    RST: OutputPin,
{
    /// Creates a new driver instance. No bus traffic happens until `reset`.
    pub fn new(spi: SPI, dc: DC, cs: CS, rst: RST, config: Config) -> Self {
        Self {
            spi,
            dc,
            cs,
            rst,
            config,
        }
    }

    /// Returns current configuration.
    pub fn config(&self) -> Config {
        self.config
    }

    /// Addressable `(width, height)`.
    pub fn dimensions(&self) -> (u16, u16) {
        (self.config.width, self.config.height)
    }

    /// Releases owned bus and pins.
    pub fn release(self) -> (SPI, DC, CS, RST) {
        (self.spi, self.dc, self.cs, self.rst)
    }

    /// Pulses the hardware reset line: low, wait, high, wait.
    pub fn reset<D>(&mut self, delay: &mut D) -> DriverResult<SPI::Error, DC::Error, CS::Error, RST::Error>
    where
        D: DelayNs,
    {
        self.rst.set_low().map_err(Error::Rst)?;
        delay.delay_ms(self.config.reset_pulse_ms);
        self.rst.set_high().map_err(Error::Rst)?;
        delay.delay_ms(self.config.reset_pulse_ms);
        Ok(())
    }

    /// Replays the vendor power-on sequence. Call `reset` first.
    pub fn initialize<D>(
        &mut self,
        delay: &mut D,
    ) -> DriverResult<SPI::Error, DC::Error, CS::Error, RST::Error>
    where
        D: DelayNs,
    {
        for step in protocol::INIT_SEQUENCE.iter() {
            self.write_command(step.command)?;
            if !step.params.is_empty() {
                self.write_data(step.params)?;
            }
            if step.settle_ms > 0 {
                delay.delay_ms(step.settle_ms);
            }
        }

        Ok(())
    }

    /// Hardware reset followed by the power-on sequence.
    pub fn init<D>(&mut self, delay: &mut D) -> DriverResult<SPI::Error, DC::Error, CS::Error, RST::Error>
    where
        D: DelayNs,
    {
        self.reset(delay)?;
        self.initialize(delay)
    }

    /// Sends one command byte with DC low.
    pub fn write_command(&mut self, command: u8) -> DriverResult<SPI::Error, DC::Error, CS::Error, RST::Error> {
        self.dc.set_low().map_err(Error::Dc)?;
        self.transaction(&[command])
    }

    /// Sends parameter or pixel bytes with DC high.
    pub fn write_data(&mut self, data: &[u8]) -> DriverResult<SPI::Error, DC::Error, CS::Error, RST::Error> {
        self.dc.set_high().map_err(Error::Dc)?;
        self.transaction(data)
    }

    /// Latches `(x0, y0)..=(x1, y1)` and enters memory-write mode.
    pub fn set_window(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
    ) -> DriverResult<SPI::Error, DC::Error, CS::Error, RST::Error> {
        self.address(x0, y0, x1, y1)?;
        self.write_command(protocol::cmd::RAMWR)
    }

    /// Latches `(x0, y0)..=(x1, y1)` and enters memory-read mode.
    pub fn set_window_for_read(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
    ) -> DriverResult<SPI::Error, DC::Error, CS::Error, RST::Error> {
        self.address(x0, y0, x1, y1)?;
        self.write_command(protocol::cmd::RAMRD)
    }

    /// Streams raw RGB565 bytes into the current window.
    pub fn write_pixels(&mut self, pixels: &[u8]) -> DriverResult<SPI::Error, DC::Error, CS::Error, RST::Error> {
        self.write_data(pixels)
    }

    /// Clocks raw bytes out of the current window into `buffer`.
    pub fn read_pixels(&mut self, buffer: &mut [u8]) -> DriverResult<SPI::Error, DC::Error, CS::Error, RST::Error> {
        self.dc.set_high().map_err(Error::Dc)?;
        self.cs.set_low().map_err(Error::Cs)?;
        let result = self.spi.read(buffer).and_then(|()| self.spi.flush());
        self.cs.set_high().map_err(Error::Cs)?;
        result.map_err(Error::Spi)
    }

    /// Streams `count` copies of `color` into the current window in one
    /// chip-select window.
    pub fn fill_color(
        &mut self,
        color: u16,
        count: usize,
    ) -> DriverResult<SPI::Error, DC::Error, CS::Error, RST::Error> {
        let chunk: [u8; CHUNK_BYTES] = protocol::color_chunk(color);

        self.dc.set_high().map_err(Error::Dc)?;
        self.cs.set_low().map_err(Error::Cs)?;

        let mut remaining = count;
        let mut result = Ok(());
        while remaining > 0 && result.is_ok() {
            let n = remaining.min(CHUNK_PIXELS);
            result = self.spi.write(&chunk[..n * protocol::BYTES_PER_PIXEL]);
            remaining -= n;
        }
        let result = result.and_then(|()| self.spi.flush());

        self.cs.set_high().map_err(Error::Cs)?;
        result.map_err(Error::Spi)
    }

    fn address(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
    ) -> DriverResult<SPI::Error, DC::Error, CS::Error, RST::Error> {
        self.write_command(protocol::cmd::CASET)?;
        self.write_data(&protocol::encode_bounds(x0, x1))?;
        self.write_command(protocol::cmd::PASET)?;
        self.write_data(&protocol::encode_bounds(y0, y1))
    }

    fn transaction(&mut self, bytes: &[u8]) -> DriverResult<SPI::Error, DC::Error, CS::Error, RST::Error> {
        self.cs.set_low().map_err(Error::Cs)?;
        let result = self.spi.write(bytes).and_then(|()| self.spi.flush());
        self.cs.set_high().map_err(Error::Cs)?;
        result.map_err(Error::Spi)
    }
}
