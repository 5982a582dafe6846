//! Fixed-point trigonometry for hand rotation.
//!
//! Angles are integers where `TRIG_MAX_ANGLE` is one full clockwise turn, and
//! sine/cosine come back scaled so that 1.0 == `TRIG_MAX_RATIO`. All hand math
//! stays in integers so rotated outlines land on the same pixels every frame.

use core::f64::consts::PI;

/// One full turn.
pub const TRIG_MAX_ANGLE: i32 = 0x10000;

/// Scale of the values returned by [`sin_lookup`] and [`cos_lookup`].
pub const TRIG_MAX_RATIO: i32 = 0xFFFF;

#[inline]
fn to_radians(angle: i32) -> f64 {
    (angle as f64) * 2.0 * PI / (TRIG_MAX_ANGLE as f64)
}

/// Sine of `angle`, scaled to `TRIG_MAX_RATIO`.
pub fn sin_lookup(angle: i32) -> i32 {
    libm::round(libm::sin(to_radians(angle)) * TRIG_MAX_RATIO as f64) as i32
}

/// Cosine of `angle`, scaled to `TRIG_MAX_RATIO`.
pub fn cos_lookup(angle: i32) -> i32 {
    libm::round(libm::cos(to_radians(angle)) * TRIG_MAX_RATIO as f64) as i32
}

/// `numerator / denominator` of a full turn, truncated like integer division.
#[inline]
pub fn turn_fraction(numerator: i32, denominator: i32) -> i32 {
    TRIG_MAX_ANGLE * numerator / denominator
}
