//! Dashboard rendering onto any `embedded-graphics` draw target
//!
//! Nothing here knows about windows or files: the host decides whether the
//! frame buffer ends up in an SDL window, a PNG or nowhere.

pub mod dashboard;
pub mod graph;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::Size;

pub use dashboard::{Dashboard, Panel};
pub use graph::Chart;

/// Default frame size of the dashboard in pixels
pub const DISPLAY_WIDTH: u32 = 960;
pub const DISPLAY_HEIGHT: u32 = 720;
pub const DISPLAY_SIZE: Size = Size::new(DISPLAY_WIDTH, DISPLAY_HEIGHT);

pub const BLACK: Rgb565 = Rgb565::new(0, 0, 0);
pub const WHITE: Rgb565 = Rgb565::new(31, 63, 31);
pub const LIGHT_GRAY: Rgb565 = Rgb565::new(21, 42, 21);
pub const GRAY: Rgb565 = Rgb565::new(16, 32, 16);
pub const DARK_GRAY: Rgb565 = Rgb565::new(10, 20, 10);
pub const SURFACE_DARK: Rgb565 = Rgb565::new(0x08 >> 3, 0x10 >> 2, 0x18 >> 3);

// Series colors
pub const RED: Rgb565 = Rgb565::new(0xE5 >> 3, 0x39 >> 2, 0x35 >> 3);
pub const DODGER_BLUE: Rgb565 = Rgb565::new(30 >> 3, 144 >> 2, 255 >> 3);
pub const GREEN: Rgb565 = Rgb565::new(0x43 >> 3, 0xA0 >> 2, 0x47 >> 3);
pub const MAGENTA: Rgb565 = Rgb565::new(0xD8 >> 3, 0x1B >> 2, 0x60 >> 3);
pub const ORANGE: Rgb565 = Rgb565::new(0xFB >> 3, 0x8C >> 2, 0x00 >> 3);
pub const CYAN: Rgb565 = Rgb565::new(0x00 >> 3, 0xAC >> 2, 0xC1 >> 3);

// Status colors
pub const OK_GREEN: Rgb565 = Rgb565::new(0x4C >> 3, 0xAF >> 2, 0x50 >> 3);
pub const CRIMSON: Rgb565 = Rgb565::new(220 >> 3, 20 >> 2, 60 >> 3);
pub const AMBER: Rgb565 = Rgb565::new(0xFF >> 3, 0xC1 >> 2, 0x07 >> 3);

#[cfg(test)]
pub(crate) mod test_display {
    use core::convert::Infallible;

    use embedded_graphics::pixelcolor::Rgb565;
    use embedded_graphics::prelude::*;

    /// Frame buffer that keeps every pixel for inspection
    pub struct RecordingDisplay {
        size: Size,
        pixels: Vec<Rgb565>,
    }

    impl RecordingDisplay {
        pub fn new(size: Size) -> Self {
            Self {
                size,
                pixels: vec![Rgb565::BLACK; (size.width * size.height) as usize],
            }
        }

        pub fn count_color(&self, color: Rgb565) -> usize {
            self.pixels.iter().filter(|&&p| p == color).count()
        }

        pub fn count_color_in(&self, color: Rgb565, top_left: Point, size: Size) -> usize {
            let mut count = 0;
            for y in top_left.y..top_left.y + size.height as i32 {
                for x in top_left.x..top_left.x + size.width as i32 {
                    if self.pixel(Point::new(x, y)) == Some(color) {
                        count += 1;
                    }
                }
            }
            count
        }

        pub fn pixel(&self, point: Point) -> Option<Rgb565> {
            self.index(point).map(|i| self.pixels[i])
        }

        fn index(&self, point: Point) -> Option<usize> {
            let (x, y) = (point.x, point.y);
            if x < 0 || y < 0 || x >= self.size.width as i32 || y >= self.size.height as i32 {
                return None;
            }
            Some(y as usize * self.size.width as usize + x as usize)
        }
    }

    impl OriginDimensions for RecordingDisplay {
        fn size(&self) -> Size {
            self.size
        }
    }

    impl DrawTarget for RecordingDisplay {
        type Color = Rgb565;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(point, color) in pixels {
                if let Some(i) = self.index(point) {
                    self.pixels[i] = color;
                }
            }
            Ok(())
        }
    }
}
