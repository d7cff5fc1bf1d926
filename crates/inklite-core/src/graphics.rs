use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::BinaryColor,
};

use crate::bitmap::Bitmap;

impl DrawTarget for Bitmap<'_> {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 || point.x > i32::from(i16::MAX) || point.y > i32::from(i16::MAX) {
                continue;
            }

            let _ = self.set_pixel(point.x as i16, point.y as i16, color.is_on());
        }

        Ok(())
    }
}

impl OriginDimensions for Bitmap<'_> {
    fn size(&self) -> Size {
        Size::new(self.width() as u32, self.height() as u32)
    }
}
