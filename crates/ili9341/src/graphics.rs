use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{Dimensions, OriginDimensions, Size},
    pixelcolor::{IntoStorage, Rgb565},
    primitives::Rectangle,
};
use embedded_hal::{digital::OutputPin, spi::SpiBus};

use crate::{Error, Ili9341, protocol};

impl<SPI, DC, CS, RST> DrawTarget for Ili9341<SPI, DC, CS, RST>
where
    SPI: SpiBus<u8>,
    DC: OutputPin,
    CS: OutputPin,
    RST: OutputPin,
{
    type Color = Rgb565;
    type Error = Error<SPI::Error, DC::Error, CS::Error, RST::Error>;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = self.dimensions();

        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 || point.x >= width as i32 || point.y >= height as i32 {
                continue;
            }

            let x = point.x as u16;
            let y = point.y as u16;
            self.set_window(x, y, x, y)?;
            self.write_pixels(&protocol::color_bytes(color.into_storage()))?;
        }

        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };

        self.set_window(
            area.top_left.x as u16,
            area.top_left.y as u16,
            bottom_right.x as u16,
            bottom_right.y as u16,
        )?;
        self.fill_color(
            color.into_storage(),
            area.size.width as usize * area.size.height as usize,
        )
    }
}

impl<SPI, DC, CS, RST> OriginDimensions for Ili9341<SPI, DC, CS, RST> {
    fn size(&self) -> Size {
        Size::new(self.config.width as u32, self.config.height as u32)
    }
}
