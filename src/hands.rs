//! Hand outlines and their rotation about the dial center.
//!
//! Each outline is a closed polygon in local coordinates with the pivot at
//! (0, 0) and the tip pointing up (negative y). The first point is the pivot,
//! the rest trace the rounded tip, so the filled shape reads as a narrow wedge.

use embedded_graphics::prelude::Point;
use heapless::Vec;

use crate::trig::{cos_lookup, sin_lookup, TRIG_MAX_RATIO};

/// Points per hand outline.
pub const HAND_POINTS: usize = 32;

/// Minute hand, radius ~70.
pub const MINUTE_HAND_POINTS: [Point; HAND_POINTS] = [
    Point::new(0, 0),
    Point::new(18, -68),
    Point::new(17, -68),
    Point::new(16, -68),
    Point::new(15, -68),
    Point::new(13, -69),
    Point::new(12, -69),
    Point::new(11, -69),
    Point::new(10, -69),
    Point::new(9, -69),
    Point::new(7, -70),
    Point::new(6, -70),
    Point::new(5, -70),
    Point::new(4, -70),
    Point::new(2, -70),
    Point::new(1, -70),
    Point::new(0, -70),
    Point::new(-1, -70),
    Point::new(-2, -70),
    Point::new(-4, -70),
    Point::new(-5, -70),
    Point::new(-6, -70),
    Point::new(-7, -70),
    Point::new(-9, -69),
    Point::new(-10, -69),
    Point::new(-11, -69),
    Point::new(-12, -69),
    Point::new(-13, -69),
    Point::new(-15, -68),
    Point::new(-16, -68),
    Point::new(-17, -68),
    Point::new(-18, -68),
];

/// Hour hand, radius ~50.
pub const HOUR_HAND_POINTS: [Point; HAND_POINTS] = [
    Point::new(0, 0),
    Point::new(13, -48),
    Point::new(12, -49),
    Point::new(11, -49),
    Point::new(10, -49),
    Point::new(10, -49),
    Point::new(9, -49),
    Point::new(8, -49),
    Point::new(7, -50),
    Point::new(6, -50),
    Point::new(5, -50),
    Point::new(4, -50),
    Point::new(3, -50),
    Point::new(3, -50),
    Point::new(2, -50),
    Point::new(1, -50),
    Point::new(0, -50),
    Point::new(-1, -50),
    Point::new(-2, -50),
    Point::new(-3, -50),
    Point::new(-3, -50),
    Point::new(-4, -50),
    Point::new(-5, -50),
    Point::new(-6, -50),
    Point::new(-7, -50),
    Point::new(-8, -49),
    Point::new(-9, -49),
    Point::new(-10, -49),
    Point::new(-10, -49),
    Point::new(-11, -49),
    Point::new(-12, -49),
    Point::new(-13, -48),
];

/// An immutable hand outline.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HandShape {
    points: &'static [Point; HAND_POINTS],
}

impl HandShape {
    pub const MINUTE: HandShape = HandShape { points: &MINUTE_HAND_POINTS };
    pub const HOUR: HandShape = HandShape { points: &HOUR_HAND_POINTS };

    pub fn points(&self) -> &'static [Point] {
        self.points
    }

    /// Largest distance (squared) from the pivot to any outline point.
    pub fn reach_sq(&self) -> i32 {
        self.points
            .iter()
            .map(|p| p.x * p.x + p.y * p.y)
            .max()
            .unwrap_or(0)
    }
}

/// Rotated outline storage, sized so a rotation never allocates.
pub type HandOutline = Vec<Point, HAND_POINTS>;

/// A hand bound to a pivot on screen and a rotation angle.
///
/// The pivot is set once when the face is laid out; the angle is replaced on
/// every redraw and never accumulated.
#[derive(Clone, Debug)]
pub struct OrientedHand {
    shape: HandShape,
    pivot: Point,
    angle: i32,
    outline: HandOutline,
}

impl OrientedHand {
    pub fn new(shape: HandShape) -> Self {
        let mut hand = Self {
            shape,
            pivot: Point::zero(),
            angle: 0,
            outline: Vec::new(),
        };
        hand.update_outline();
        hand
    }

    pub fn shape(&self) -> HandShape {
        self.shape
    }

    pub fn pivot(&self) -> Point {
        self.pivot
    }

    pub fn angle(&self) -> i32 {
        self.angle
    }

    /// Moves the pivot to `pivot` in screen space.
    pub fn move_to(&mut self, pivot: Point) {
        self.pivot = pivot;
        self.update_outline();
    }

    /// Sets an absolute rotation, clockwise, in `TRIG_MAX_ANGLE` units.
    pub fn rotate_to(&mut self, angle: i32) {
        self.angle = angle;
        self.update_outline();
    }

    /// The outline in screen space for the current pivot and angle.
    pub fn outline(&self) -> &[Point] {
        &self.outline
    }

    fn update_outline(&mut self) {
        let cos = cos_lookup(self.angle);
        let sin = sin_lookup(self.angle);
        self.outline.clear();
        for p in self.shape.points() {
            // Screen y grows downward, so this turns clockwise on the display.
            let x = (p.x * cos - p.y * sin) / TRIG_MAX_RATIO;
            let y = (p.y * cos + p.x * sin) / TRIG_MAX_RATIO;
            // Capacity matches the table length.
            let _ = self.outline.push(Point::new(x, y) + self.pivot);
        }
    }
}
