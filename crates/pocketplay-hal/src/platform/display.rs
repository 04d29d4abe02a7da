use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiBus};
use ili9341::{Config, Ili9341};
use log::info;
use pocketplay_core::gfx::{Panel, Rgb565, Window};

pub type DisplayError<SpiErr, DcErr, CsErr, RstErr> = ili9341::Error<SpiErr, DcErr, CsErr, RstErr>;

type DisplayResult<SPI, DC, CS, RST> = Result<
    (),
    DisplayError<
        <SPI as embedded_hal::spi::ErrorType>::Error,
        <DC as embedded_hal::digital::ErrorType>::Error,
        <CS as embedded_hal::digital::ErrorType>::Error,
        <RST as embedded_hal::digital::ErrorType>::Error,
    >,
>;

/// Board-level adapter exposing the ILI9341 as a drawing panel.
#[derive(Debug)]
pub struct TftDisplay<SPI, DC, CS, RST> {
    driver: Ili9341<SPI, DC, CS, RST>,
}

impl<SPI, DC, CS, RST> TftDisplay<SPI, DC, CS, RST>
where
    SPI: SpiBus<u8>,
    DC: OutputPin,
    CS: OutputPin,
    RST: OutputPin,
{
    pub fn new(spi: SPI, dc: DC, cs: CS, rst: RST, config: Config) -> Self {
        Self {
            driver: Ili9341::new(spi, dc, cs, rst, config),
        }
    }

    /// Pulses reset and runs the power-on sequence.
    pub fn init<D>(&mut self, delay: &mut D) -> DisplayResult<SPI, DC, CS, RST>
    where
        D: DelayNs,
    {
        self.driver.init(delay)?;
        let (width, height) = self.driver.dimensions();
        info!("display: ili9341 ready ({width}x{height})");
        Ok(())
    }

    /// Reads raw GRAM bytes back from `window`.
    pub fn read_window(&mut self, window: Window, buffer: &mut [u8]) -> DisplayResult<SPI, DC, CS, RST> {
        self.driver
            .set_window_for_read(window.x0, window.y0, window.x1, window.y1)?;
        self.driver.read_pixels(buffer)
    }

    pub fn driver_mut(&mut self) -> &mut Ili9341<SPI, DC, CS, RST> {
        &mut self.driver
    }

    pub fn release(self) -> (SPI, DC, CS, RST) {
        self.driver.release()
    }
}

impl<SPI, DC, CS, RST> Panel for TftDisplay<SPI, DC, CS, RST>
where
    SPI: SpiBus<u8>,
    DC: OutputPin,
    CS: OutputPin,
    RST: OutputPin,
{
    type Error = DisplayError<SPI::Error, DC::Error, CS::Error, RST::Error>;

    fn size(&self) -> (u16, u16) {
        self.driver.dimensions()
    }

    fn set_window(&mut self, window: Window) -> Result<(), Self::Error> {
        self.driver.set_window(window.x0, window.y0, window.x1, window.y1)
    }

    fn write_pixels(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.driver.write_pixels(bytes)
    }

    fn fill_pixels(&mut self, color: Rgb565, count: usize) -> Result<(), Self::Error> {
        self.driver.fill_color(color.raw(), count)
    }
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;
    use std::{cell::RefCell, rc::Rc, vec, vec::Vec};

    use embedded_graphics_core::{
        draw_target::DrawTarget,
        geometry::{Point, Size},
        pixelcolor::Rgb565 as EgRgb565,
        primitives::Rectangle,
    };
    use embedded_hal::{digital, spi};
    use pocketplay_core::gfx::Surface;

    use super::*;

    type Log = Rc<RefCell<Vec<Vec<u8>>>>;

    struct RecordingBus(Log);

    impl spi::ErrorType for RecordingBus {
        type Error = Infallible;
    }

    impl SpiBus<u8> for RecordingBus {
        fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
            words.fill(0x5A);
            Ok(())
        }

        fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
            self.0.borrow_mut().push(words.to_vec());
            Ok(())
        }

        fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
            read.fill(0);
            self.write(write)
        }

        fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
            self.write(words)
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    struct NullPin;

    impl digital::ErrorType for NullPin {
        type Error = Infallible;
    }

    impl OutputPin for NullPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    fn display(log: &Log) -> TftDisplay<RecordingBus, NullPin, NullPin, NullPin> {
        TftDisplay::new(
            RecordingBus(log.clone()),
            NullPin,
            NullPin,
            NullPin,
            Config::default(),
        )
    }

    #[test]
    fn surface_fill_goes_through_windowed_color_fill() {
        let log = Log::default();
        let mut gfx = Surface::new(display(&log));

        gfx.fill_rect(10, 20, 2, 1, Rgb565::RED).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                vec![0x2A],
                vec![0x00, 0x0A, 0x00, 0x0B],
                vec![0x2B],
                vec![0x00, 0x14, 0x00, 0x14],
                vec![0x2C],
                vec![0xF8, 0x00, 0xF8, 0x00],
            ]
        );
    }

    #[test]
    fn surface_dimensions_come_from_driver_config() {
        let log = Log::default();
        let gfx = Surface::new(display(&log));
        assert_eq!((gfx.width(), gfx.height()), (240, 320));
    }

    #[test]
    fn read_window_latches_read_mode() {
        let log = Log::default();
        let mut tft = display(&log);
        let mut buffer = [0u8; 4];

        tft.read_window(Window::new(0, 0, 1, 0), &mut buffer).unwrap();

        assert_eq!(buffer, [0x5A; 4]);
        assert_eq!(log.borrow().last(), Some(&vec![0x2E]));
    }

    #[test]
    fn driver_accepts_clipped_embedded_graphics_fills() {
        let log = Log::default();
        let mut tft = display(&log);
        let area = Rectangle::new(Point::new(-4, -4), Size::new(6, 5));

        tft.driver_mut().fill_solid(&area, EgRgb565::new(31, 0, 0)).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                vec![0x2A],
                vec![0x00, 0x00, 0x00, 0x01],
                vec![0x2B],
                vec![0x00, 0x00, 0x00, 0x00],
                vec![0x2C],
                vec![0xF8, 0x00, 0xF8, 0x00],
            ]
        );
    }
}
