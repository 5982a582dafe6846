// 1-bpp frame buffer for the watchface layer.
//
// Geometry: 144 x 168 logical pixels, rows packed LSB-first, 18 bytes per row.
// Implements `DrawTarget<BinaryColor>` so the face renders into RAM and the
// panel driver only ever sees finished frames.

use core::convert::Infallible;

use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PointsIter, Rectangle},
};

pub const FACE_WIDTH: u32 = 144;
pub const FACE_HEIGHT: u32 = 168;
const ROW_BYTES: usize = (FACE_WIDTH as usize + 7) / 8;

pub struct FrameBuffer {
    bits: [u8; ROW_BYTES * FACE_HEIGHT as usize],
    // Bounding box of pixels written since the last `take_dirty`.
    dirty: Option<(Point, Point)>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub const fn new() -> Self {
        Self {
            bits: [0; ROW_BYTES * FACE_HEIGHT as usize],
            dirty: None,
        }
    }

    pub fn bounds(&self) -> Rectangle {
        self.bounding_box()
    }

    /// Color at `p`, or `None` outside the buffer.
    pub fn pixel(&self, p: Point) -> Option<BinaryColor> {
        let (idx, bit) = Self::locate(p)?;
        Some(BinaryColor::from(self.bits[idx] & bit != 0))
    }

    /// Number of pixels set to `color`.
    pub fn count(&self, color: BinaryColor) -> usize {
        let on: usize = (0..FACE_HEIGHT as i32)
            .flat_map(|y| (0..FACE_WIDTH as i32).map(move |x| Point::new(x, y)))
            .filter(|p| self.pixel(*p) == Some(BinaryColor::On))
            .count();
        match color {
            BinaryColor::On => on,
            BinaryColor::Off => (FACE_WIDTH * FACE_HEIGHT) as usize - on,
        }
    }

    /// Row-major colors inside `area`, clipped to the buffer.
    pub fn colors_in<'a>(&'a self, area: &Rectangle) -> impl Iterator<Item = BinaryColor> + 'a {
        let area = area.intersection(&self.bounds());
        area.points()
            .map(move |p| self.pixel(p).unwrap_or(BinaryColor::Off))
    }

    /// Returns and resets the region touched since the previous call.
    pub fn take_dirty(&mut self) -> Option<Rectangle> {
        self.dirty
            .take()
            .map(|(min, max)| Rectangle::with_corners(min, max))
    }

    fn locate(p: Point) -> Option<(usize, u8)> {
        if p.x < 0 || p.y < 0 || p.x >= FACE_WIDTH as i32 || p.y >= FACE_HEIGHT as i32 {
            return None;
        }
        let (x, y) = (p.x as usize, p.y as usize);
        Some((y * ROW_BYTES + x / 8, 1 << (x % 8)))
    }

    fn set(&mut self, p: Point, color: BinaryColor) -> bool {
        let Some((idx, bit)) = Self::locate(p) else {
            return false;
        };
        if color.is_on() {
            self.bits[idx] |= bit;
        } else {
            self.bits[idx] &= !bit;
        }
        self.dirty = Some(match self.dirty {
            None => (p, p),
            Some((min, max)) => (min.component_min(p), max.component_max(p)),
        });
        true
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(FACE_WIDTH, FACE_HEIGHT)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<BinaryColor>>,
    {
        for Pixel(p, c) in pixels {
            self.set(p, c);
        }
        Ok(())
    }

    fn clear(&mut self, color: BinaryColor) -> Result<(), Self::Error> {
        let fill = if color.is_on() { 0xFF } else { 0x00 };
        self.bits.fill(fill);
        self.dirty = Some((
            Point::zero(),
            Point::new(FACE_WIDTH as i32 - 1, FACE_HEIGHT as i32 - 1),
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn test_new_buffer_is_off() {
        let fb = FrameBuffer::new();
        assert_eq!(fb.count(BinaryColor::On), 0);
        assert_eq!(fb.pixel(Point::new(143, 167)), Some(BinaryColor::Off));
        assert_eq!(fb.pixel(Point::new(144, 0)), None);
        assert_eq!(fb.pixel(Point::new(0, -1)), None);
    }

    #[test]
    fn test_clear_on_fills_every_pixel() {
        let mut fb = FrameBuffer::new();
        fb.clear(BinaryColor::On).unwrap();
        assert_eq!(fb.count(BinaryColor::On), (FACE_WIDTH * FACE_HEIGHT) as usize);
        assert_eq!(fb.take_dirty(), Some(fb.bounds()));
    }

    #[test]
    fn test_drawing_is_clipped_and_tracked() {
        let mut fb = FrameBuffer::new();
        Rectangle::new(Point::new(140, 160), Size::new(10, 10))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut fb)
            .unwrap();
        assert_eq!(fb.count(BinaryColor::On), 4 * 8);
        assert_eq!(
            fb.take_dirty(),
            Some(Rectangle::new(Point::new(140, 160), Size::new(4, 8)))
        );
        assert_eq!(fb.take_dirty(), None);
    }

    #[test]
    fn test_colors_in_is_row_major() {
        let mut fb = FrameBuffer::new();
        Pixel(Point::new(1, 0), BinaryColor::On).draw(&mut fb).unwrap();
        let row: heapless::Vec<BinaryColor, 3> = fb
            .colors_in(&Rectangle::new(Point::zero(), Size::new(3, 1)))
            .collect();
        assert_eq!(
            row.as_slice(),
            &[BinaryColor::Off, BinaryColor::On, BinaryColor::Off]
        );
    }
}
