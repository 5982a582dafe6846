//! Panel output.
//!
//! - `present` copies the finished 1-bpp face onto any RGB565 panel, centered.
//! - `setup_display` brings up the GC9A01 (240x240, D/C) through mipidsi.

use embedded_graphics::{
    pixelcolor::{BinaryColor, Rgb565},
    prelude::*,
};

use crate::framebuffer::{FrameBuffer, FACE_HEIGHT, FACE_WIDTH};

pub const PANEL_SIZE: u32 = 240;

/// Top-left of the face layer on the panel.
pub const FACE_ORIGIN: Point = Point::new(
    ((PANEL_SIZE - FACE_WIDTH) / 2) as i32,
    ((PANEL_SIZE - FACE_HEIGHT) / 2) as i32,
);

#[inline]
pub fn to_rgb(color: BinaryColor) -> Rgb565 {
    match color {
        BinaryColor::On => Rgb565::WHITE,
        BinaryColor::Off => Rgb565::BLACK,
    }
}

/// Sends the part of `frame` that changed since the last call. No-op if nothing did.
pub fn present<D>(frame: &mut FrameBuffer, panel: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let Some(dirty) = frame.take_dirty() else {
        return Ok(());
    };
    let area = dirty.translate(FACE_ORIGIN);
    panel.fill_contiguous(&area, frame.colors_in(&dirty).map(to_rgb))
}

// ==================================================================
// GC9A01 (240x240) backend, feature: devkit-esp32s3-disp128
// ==================================================================
#[cfg(feature = "devkit-esp32s3-disp128")]
mod gc9a01_backend {
    use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
    use esp_hal::{
        gpio::Output,
        spi::master::{Config as SpiConfig, Spi},
        spi::Mode,
        time::Rate,
        Blocking,
    };
    use mipidsi::interface::SpiInterface;
    use mipidsi::{
        models::GC9A01,
        options::{ColorInversion, ColorOrder, Orientation, Rotation},
        Builder as DisplayBuilder,
    };

    use crate::wiring::DisplayPins;

    // A tiny busy-wait delay that satisfies embedded-hal 1.0 DelayNs.
    pub struct SpinDelay;

    impl embedded_hal::delay::DelayNs for SpinDelay {
        #[inline]
        fn delay_ns(&mut self, ns: u32) {
            let mut n = ns / 50 + 1;
            while n != 0 { core::hint::spin_loop(); n -= 1; }
        }
        #[inline]
        fn delay_us(&mut self, us: u32) { for _ in 0..us { self.delay_ns(1_000); } }
        #[inline]
        fn delay_ms(&mut self, ms: u32) { for _ in 0..ms { self.delay_us(1_000); } }
    }

    pub type DisplayType<'a> = mipidsi::Display<
        SpiInterface<'a,
            ExclusiveDevice<Spi<'a, Blocking>, Output<'a>, NoDelay>,
            Output<'a>,
        >,
        GC9A01,
        Output<'a>,
    >;

    // Panics on failure: without a panel there is nothing left to do.
    pub fn setup_display<'a>(
        display_pins: DisplayPins<'a>,
        display_buf: &'a mut [u8],
    ) -> DisplayType<'a>
    {
        let DisplayPins {
            spi2,
            spi_sck,
            spi_mosi,
            lcd_cs,
            lcd_dc,
            mut lcd_rst,
            mut lcd_bl,
        } = display_pins;

        // Hardware reset & backlight
        lcd_rst.set_low();
        for _ in 0..10000 { core::hint::spin_loop(); }
        lcd_rst.set_high();
        lcd_bl.set_high();

        // SPI @ 40 MHz, Mode 0
        let spi_cfg = SpiConfig::default()
            .with_frequency(Rate::from_hz(40_000_000))
            .with_mode(Mode::_0);

        let spi = Spi::new(spi2, spi_cfg)
            .expect("SPI2 config rejected")
            .with_sck(spi_sck)
            .with_mosi(spi_mosi);

        // SPI device + DisplayInterface (needs D/C and a buffer)
        let spi_dev = ExclusiveDevice::new(spi, lcd_cs, NoDelay).expect("LCD CS setup failed");
        let di = SpiInterface::new(spi_dev, lcd_dc, display_buf);
        let mut delay = SpinDelay;

        DisplayBuilder::new(GC9A01, di)
            .display_size(240, 240)
            .display_offset(0, 0)
            .orientation(Orientation::new().rotate(Rotation::Deg180))
            .invert_colors(ColorInversion::Inverted)
            .color_order(ColorOrder::Bgr)
            .reset_pin(lcd_rst)
            .init(&mut delay)
            .expect("GC9A01 init failed")
    }
}

#[cfg(feature = "devkit-esp32s3-disp128")]
pub use gc9a01_backend::{setup_display, DisplayType, SpinDelay};

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    struct Panel {
        pixels: Vec<Rgb565>,
        writes: usize,
    }

    impl Panel {
        fn new() -> Self {
            Self {
                pixels: vec![Rgb565::RED; (PANEL_SIZE * PANEL_SIZE) as usize],
                writes: 0,
            }
        }

        fn at(&self, p: Point) -> Rgb565 {
            self.pixels[(p.y as u32 * PANEL_SIZE + p.x as u32) as usize]
        }
    }

    impl OriginDimensions for Panel {
        fn size(&self) -> Size {
            Size::new(PANEL_SIZE, PANEL_SIZE)
        }
    }

    impl DrawTarget for Panel {
        type Color = Rgb565;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Rgb565>>,
        {
            for Pixel(p, c) in pixels {
                self.pixels[(p.y as u32 * PANEL_SIZE + p.x as u32) as usize] = c;
                self.writes += 1;
            }
            Ok(())
        }
    }

    #[test]
    fn test_face_is_centered() {
        assert_eq!(FACE_ORIGIN, Point::new(48, 36));
    }

    #[test]
    fn test_present_maps_and_offsets() {
        let mut frame = FrameBuffer::new();
        frame.clear(BinaryColor::On).unwrap();
        Pixel(Point::new(0, 0), BinaryColor::Off).draw(&mut frame).unwrap();

        let mut panel = Panel::new();
        present(&mut frame, &mut panel).unwrap();

        assert_eq!(panel.writes, (FACE_WIDTH * FACE_HEIGHT) as usize);
        assert_eq!(panel.at(FACE_ORIGIN), Rgb565::BLACK);
        assert_eq!(panel.at(FACE_ORIGIN + Point::new(1, 0)), Rgb565::WHITE);
        assert_eq!(panel.at(Point::new(47, 36)), Rgb565::RED);
        assert_eq!(panel.at(Point::new(48 + 144, 36)), Rgb565::RED);
    }

    #[test]
    fn test_present_sends_only_dirty_region() {
        let mut frame = FrameBuffer::new();
        let mut panel = Panel::new();
        present(&mut frame, &mut panel).unwrap();
        assert_eq!(panel.writes, 0);

        Rectangle::new(Point::new(10, 20), Size::new(3, 2))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut frame)
            .unwrap();
        present(&mut frame, &mut panel).unwrap();
        assert_eq!(panel.writes, 6);
        assert_eq!(panel.at(FACE_ORIGIN + Point::new(11, 21)), Rgb565::WHITE);
    }
}
