#![cfg_attr(not(test), no_std)]

pub mod app;
pub mod button;
pub mod clock;
pub mod connectivity;
pub mod display;
pub mod framebuffer;
pub mod hands;
pub mod haptics;
pub mod palette;
pub mod raster;
pub mod render;
pub mod rtc;
pub mod trig;

#[cfg(feature = "firmware")]
pub mod wiring;
