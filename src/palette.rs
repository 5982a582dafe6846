//! Fill/stroke color pairs for the black-and-white face.

use embedded_graphics::pixelcolor::BinaryColor;

/// Background of the window behind the face.
pub const BACKGROUND: BinaryColor = BinaryColor::Off;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    pub fill: BinaryColor,
    pub stroke: BinaryColor,
}

impl Palette {
    /// White body, black edge.
    pub const NORMAL: Palette = Palette {
        fill: BinaryColor::On,
        stroke: BinaryColor::Off,
    };

    /// Black body, white edge.
    pub const INVERTED: Palette = Palette {
        fill: BinaryColor::Off,
        stroke: BinaryColor::On,
    };

    pub fn inverted(self) -> Self {
        Self {
            fill: self.fill.invert(),
            stroke: self.stroke.invert(),
        }
    }

    /// Palette of the second marker: inverted while the phone link is down.
    pub fn for_marker(connected: bool) -> Self {
        if connected {
            Self::NORMAL
        } else {
            Self::INVERTED
        }
    }
}
