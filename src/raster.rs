//! Drawing helpers embedded-graphics doesn't ship: filled and closed
//! polygons, plus the color-inverting layer the face is drawn through.

use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Line, Polyline, PrimitiveStyle, Rectangle},
};
use heapless::Vec;

use crate::hands::HAND_POINTS;

// Max edge crossings per scanline; a polygon can't cross a line more often than it has edges.
const MAX_CROSSINGS: usize = HAND_POINTS;

/// Fills a closed polygon with the even-odd rule.
///
/// Scanlines are sampled on integer rows with half-open edges, so shared
/// vertices are counted once. The bottom-most row is left to the outline.
pub fn fill_polygon<D>(target: &mut D, points: &[Point], color: D::Color) -> Result<(), D::Error>
where
    D: DrawTarget,
{
    if points.len() < 3 {
        return Ok(());
    }
    let (min_y, max_y) = points
        .iter()
        .fold((i32::MAX, i32::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));

    let mut crossings: Vec<i32, MAX_CROSSINGS> = Vec::new();
    for y in min_y..max_y {
        crossings.clear();
        for (i, a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            if a.y == b.y {
                continue;
            }
            let (lo, hi) = if a.y < b.y { (*a, b) } else { (b, *a) };
            if y < lo.y || y >= hi.y {
                continue;
            }
            let x = lo.x + (y - lo.y) * (hi.x - lo.x) / (hi.y - lo.y);
            if crossings.push(x).is_err() {
                break;
            }
        }
        crossings.sort_unstable();
        for span in crossings.chunks_exact(2) {
            let width = (span[1] - span[0] + 1) as u32;
            target.fill_solid(
                &Rectangle::new(Point::new(span[0], y), Size::new(width, 1)),
                color,
            )?;
        }
    }
    Ok(())
}

/// Strokes a closed polygon one pixel wide.
pub fn draw_polygon_outline<D>(
    target: &mut D,
    points: &[Point],
    color: D::Color,
) -> Result<(), D::Error>
where
    D: DrawTarget,
{
    let style = PrimitiveStyle::with_stroke(color, 1);
    Polyline::new(points).into_styled(style).draw(target)?;
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        Line::new(*last, *first).into_styled(style).draw(target)?;
    }
    Ok(())
}

/// Draw target adapter that swaps black and white on the way through.
pub struct Inverter<'a, D> {
    parent: &'a mut D,
}

impl<'a, D> Inverter<'a, D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    pub fn new(parent: &'a mut D) -> Self {
        Self { parent }
    }
}

impl<D> Dimensions for Inverter<'_, D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    fn bounding_box(&self) -> Rectangle {
        self.parent.bounding_box()
    }
}

impl<D> DrawTarget for Inverter<'_, D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    type Color = BinaryColor;
    type Error = D::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<BinaryColor>>,
    {
        self.parent
            .draw_iter(pixels.into_iter().map(|Pixel(p, c)| Pixel(p, c.invert())))
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = BinaryColor>,
    {
        self.parent
            .fill_contiguous(area, colors.into_iter().map(BinaryColor::invert))
    }

    fn fill_solid(&mut self, area: &Rectangle, color: BinaryColor) -> Result<(), Self::Error> {
        self.parent.fill_solid(area, color.invert())
    }

    fn clear(&mut self, color: BinaryColor) -> Result<(), Self::Error> {
        self.parent.clear(color.invert())
    }
}
