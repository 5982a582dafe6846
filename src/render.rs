//! The per-frame draw routine.
//!
//! Paints, in order: minute hand, hour hand, then the second marker in the
//! palette chosen by the phone link state. Nothing is cleared here; the
//! caller owns the background.

use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Circle, PrimitiveStyle, Rectangle},
};

use crate::clock::{ClockSample, HandAngles};
use crate::hands::OrientedHand;
use crate::palette::Palette;
use crate::raster::{draw_polygon_outline, fill_polygon};

pub const SECOND_MARKER_RADIUS: u32 = 3;
pub const SECOND_MARKER_OUTLINE_RADIUS: u32 = 4;

/// Rotates `hand` to `angle` and paints it filled, then outlined.
pub fn draw_hand<D>(target: &mut D, hand: &mut OrientedHand, angle: i32, palette: Palette) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    hand.rotate_to(angle);
    fill_polygon(target, hand.outline(), palette.fill)?;
    draw_polygon_outline(target, hand.outline(), palette.stroke)
}

/// Second marker: a filled dot with a ring one pixel further out.
pub fn draw_second_marker<D>(target: &mut D, center: Point, palette: Palette) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    Circle::with_center(center, 2 * SECOND_MARKER_RADIUS + 1)
        .into_styled(PrimitiveStyle::with_fill(palette.fill))
        .draw(target)?;
    Circle::with_center(center, 2 * SECOND_MARKER_OUTLINE_RADIUS + 1)
        .into_styled(PrimitiveStyle::with_stroke(palette.stroke, 1))
        .draw(target)
}

/// Draws one frame of the face for `sample` into `target`.
///
/// `bounds` is the layer the face is laid out in; the hands' pivots are
/// expected to already sit at its center.
pub fn draw_face<D>(
    target: &mut D,
    bounds: &Rectangle,
    sample: ClockSample,
    connected: bool,
    minute_hand: &mut OrientedHand,
    hour_hand: &mut OrientedHand,
) -> Result<HandAngles, D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let angles = HandAngles::for_sample(sample, bounds);

    draw_hand(target, minute_hand, angles.minute, Palette::NORMAL)?;
    draw_hand(target, hour_hand, angles.hour, Palette::NORMAL)?;
    draw_second_marker(target, angles.second_marker, Palette::for_marker(connected))?;

    Ok(angles)
}
