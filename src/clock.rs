//! Clock sampling and hand angle computation.
//!
//! Every redraw re-reads the wall clock and derives all three angles from that
//! sample alone, so a late or missed tick is corrected by the next one.

use embedded_graphics::prelude::Point;
use embedded_graphics::primitives::Rectangle;

use crate::trig::{cos_lookup, sin_lookup, turn_fraction, TRIG_MAX_RATIO};

/// A wall-clock reading in local time.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClockSample {
    pub hour: u8,   // 0-23
    pub minute: u8, // 0-59
    pub second: u8, // 0-59
}

impl ClockSample {
    pub const fn new(hour: u8, minute: u8, second: u8) -> Self {
        Self { hour, minute, second }
    }

    /// Time of day from seconds since midnight (or any Unix timestamp).
    pub const fn from_seconds(secs: u32) -> Self {
        let day = secs % 86_400;
        Self {
            hour: (day / 3600) as u8,
            minute: ((day % 3600) / 60) as u8,
            second: (day % 60) as u8,
        }
    }
}

/// Anything that can report the current local time on demand.
pub trait ClockSource {
    fn now(&mut self) -> ClockSample;
}

/// A clock stuck at one reading. Handy for tests and static previews.
#[derive(Copy, Clone, Debug)]
pub struct FixedClock(pub ClockSample);

impl ClockSource for FixedClock {
    fn now(&mut self) -> ClockSample {
        self.0
    }
}

/// Sign convention of `%` on negative operands.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ModuloConvention {
    /// Remainder takes the dividend's sign (integer division truncates toward zero).
    /// This is what the watchface has always shipped with.
    #[default]
    Truncating,
    /// Remainder takes the divisor's sign (floor division).
    Floored,
}

impl ModuloConvention {
    #[inline]
    fn rem(self, a: i32, b: i32) -> i32 {
        match self {
            ModuloConvention::Truncating => a % b,
            ModuloConvention::Floored => a.rem_euclid(b),
        }
    }
}

/// Stepped minute position using the shipped (truncating) arithmetic.
///
/// The result is in `5..=60`; 60 lands on the same angle as 0.
pub fn min_approx(minute: u8) -> i32 {
    min_approx_with(minute, ModuloConvention::Truncating)
}

/// `((min - ((min - 3) mod 5)) mod 60) + 2` under the given convention.
pub fn min_approx_with(minute: u8, convention: ModuloConvention) -> i32 {
    let min = minute as i32;
    convention.rem(min + (-1 * convention.rem(min - 3, 5)), 60) + 2
}

/// Minute-hand angle, stepped via [`min_approx`].
pub fn minute_angle(minute: u8) -> i32 {
    turn_fraction(min_approx(minute), 60)
}

/// Hour-hand angle. Jumps on the hour; minutes do not move it.
pub fn hour_angle(hour: u8) -> i32 {
    turn_fraction((hour % 12) as i32, 12)
}

/// Second-marker angle, 0 at 12 o'clock.
pub fn second_angle(second: u8) -> i32 {
    turn_fraction(second as i32, 60)
}

/// Center of a layer, rounding toward the top-left on odd sizes.
pub fn center_of(bounds: &Rectangle) -> Point {
    bounds.top_left
        + Point::new(
            (bounds.size.width / 2) as i32,
            (bounds.size.height / 2) as i32,
        )
}

/// Radius of the second marker's circular path.
pub fn second_hand_length(bounds: &Rectangle) -> i32 {
    (bounds.size.width / 2) as i32 - 4
}

/// Where the second marker sits for `second`, moving clockwise from the top.
pub fn second_hand_position(bounds: &Rectangle, second: u8) -> Point {
    let center = center_of(bounds);
    let length = second_hand_length(bounds);
    let angle = second_angle(second);
    Point::new(
        sin_lookup(angle) * length / TRIG_MAX_RATIO + center.x,
        -cos_lookup(angle) * length / TRIG_MAX_RATIO + center.y,
    )
}

/// All three hand placements for one sample.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HandAngles {
    pub minute: i32,
    pub hour: i32,
    pub second_marker: Point,
}

impl HandAngles {
    pub fn for_sample(sample: ClockSample, bounds: &Rectangle) -> Self {
        Self {
            minute: minute_angle(sample.minute),
            hour: hour_angle(sample.hour),
            second_marker: second_hand_position(bounds, sample.second),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trig::TRIG_MAX_ANGLE;
    use embedded_graphics::prelude::Size;
    use proptest::prelude::*;

    // Reference output of the shipped formula, minutes 0..=59.
    const TRUNCATING_TABLE: [i32; 60] = [
        5, 5, 5, 5, 5, 5, 5, 5, //  0- 7
        10, 10, 10, 10, 10, // 8-12
        15, 15, 15, 15, 15, // 13-17
        20, 20, 20, 20, 20, // 18-22
        25, 25, 25, 25, 25, // 23-27
        30, 30, 30, 30, 30, // 28-32
        35, 35, 35, 35, 35, // 33-37
        40, 40, 40, 40, 40, // 38-42
        45, 45, 45, 45, 45, // 43-47
        50, 50, 50, 50, 50, // 48-52
        55, 55, 55, 55, 55, // 53-57
        60, 60, // 58-59
    ];

    const FLOORED_TABLE: [i32; 60] = [
        60, 60, 60, //  0- 2
        5, 5, 5, 5, 5, //  3- 7
        10, 10, 10, 10, 10, // 8-12
        15, 15, 15, 15, 15, // 13-17
        20, 20, 20, 20, 20, // 18-22
        25, 25, 25, 25, 25, // 23-27
        30, 30, 30, 30, 30, // 28-32
        35, 35, 35, 35, 35, // 33-37
        40, 40, 40, 40, 40, // 38-42
        45, 45, 45, 45, 45, // 43-47
        50, 50, 50, 50, 50, // 48-52
        55, 55, 55, 55, 55, // 53-57
        60, 60, // 58-59
    ];

    fn face_bounds() -> Rectangle {
        Rectangle::new(Point::zero(), Size::new(144, 168))
    }

    #[test]
    fn test_min_approx_truncating_table() {
        for minute in 0..60u8 {
            assert_eq!(
                min_approx(minute),
                TRUNCATING_TABLE[minute as usize],
                "minute {minute}"
            );
        }
    }

    #[test]
    fn test_min_approx_floored_table() {
        for minute in 0..60u8 {
            assert_eq!(
                min_approx_with(minute, ModuloConvention::Floored),
                FLOORED_TABLE[minute as usize],
                "minute {minute}"
            );
        }
    }

    #[test]
    fn test_conventions_only_differ_on_negative_remainders() {
        for minute in 3..60u8 {
            assert_eq!(
                min_approx_with(minute, ModuloConvention::Truncating),
                min_approx_with(minute, ModuloConvention::Floored)
            );
        }
        for minute in 0..3u8 {
            assert_ne!(
                min_approx_with(minute, ModuloConvention::Truncating),
                min_approx_with(minute, ModuloConvention::Floored)
            );
        }
    }

    #[test]
    fn test_min_approx_range_after_reduction() {
        for convention in [ModuloConvention::Truncating, ModuloConvention::Floored] {
            for minute in 0..60u8 {
                let raw = min_approx_with(minute, convention);
                assert!((2..=61).contains(&raw), "raw {raw} for minute {minute}");
                assert!((0..=59).contains(&(raw % 60)));
            }
        }
    }

    #[test]
    fn test_minute_angle_at_sixty_is_a_full_turn() {
        assert_eq!(minute_angle(59), TRIG_MAX_ANGLE);
        assert_eq!(minute_angle(3), TRIG_MAX_ANGLE * 5 / 60);
    }

    #[test]
    fn test_hour_zero_and_twelve_match() {
        assert_eq!(hour_angle(0), hour_angle(12));
        assert_eq!(hour_angle(0), 0);
        assert_eq!(hour_angle(15), TRIG_MAX_ANGLE / 4);
    }

    #[test]
    fn test_second_marker_at_top_and_bottom() {
        let bounds = face_bounds();
        let center = center_of(&bounds);
        let length = second_hand_length(&bounds);
        assert_eq!(center, Point::new(72, 84));
        assert_eq!(length, 68);

        assert_eq!(second_hand_position(&bounds, 0), center - Point::new(0, length));
        assert_eq!(second_hand_position(&bounds, 30), center + Point::new(0, length));
        assert_eq!(second_hand_position(&bounds, 15), center + Point::new(length, 0));
        assert_eq!(second_hand_position(&bounds, 45), center - Point::new(length, 0));
    }

    #[test]
    fn test_from_seconds() {
        assert_eq!(ClockSample::from_seconds(0), ClockSample::new(0, 0, 0));
        assert_eq!(ClockSample::from_seconds(36_180), ClockSample::new(10, 3, 0));
        assert_eq!(
            ClockSample::from_seconds(86_400 + 3_661),
            ClockSample::new(1, 1, 1)
        );
    }

    #[test]
    fn test_angles_for_ten_oh_three() {
        let angles = HandAngles::for_sample(ClockSample::new(10, 3, 0), &face_bounds());
        assert_eq!(angles.minute, TRIG_MAX_ANGLE * min_approx(3) / 60);
        assert_eq!(angles.hour, TRIG_MAX_ANGLE * 10 / 12);
        assert_eq!(angles.second_marker, Point::new(72, 84 - 68));
    }

    proptest! {
        #[test]
        fn prop_hour_angle_is_hour_mod_twelve(hour in 0u8..24) {
            prop_assert_eq!(hour_angle(hour), TRIG_MAX_ANGLE * (hour % 12) as i32 / 12);
            prop_assert_eq!(hour_angle(hour), hour_angle((hour + 12) % 24));
        }

        #[test]
        fn prop_second_marker_stays_on_its_circle(second in 0u8..60) {
            let bounds = face_bounds();
            let offset = second_hand_position(&bounds, second) - center_of(&bounds);
            let r_sq = offset.x * offset.x + offset.y * offset.y;
            // Integer truncation can pull the point inward by at most ~1px per axis.
            prop_assert!(r_sq <= 68 * 68);
            prop_assert!(r_sq >= 66 * 66);
        }
    }
}
