// Board-specific pin mapping for the ESP32-S3 devkit with the round GC9A01 panel.
// Different boards get their own profile behind a Cargo feature.
//! The following wiring is assumed:
//! - Vibration motor (via NPN) => GPIO1
//! - BLE module STATUS line   => GPIO15 (high while a phone is connected)
//! - Side button              => GPIO21 (to GND, internal pull-up; also the deep-sleep wake pin)
//! - PCF85063 RTC SDA / SCL   => GPIO4 / GPIO5
//! - LCD SCK / MOSI           => GPIO10 / GPIO11
//! - LCD CS / DC / RST / BL   => GPIO9 / GPIO8 / GPIO14 / GPIO2
//! - GND => GND, 3.3V => 3.3V

use esp_hal::gpio::{Event, Input, InputConfig, Io, Level, Output, OutputConfig, Pull};
use esp_hal::peripherals::{Peripherals, GPIO10, GPIO11, GPIO4, GPIO5, I2C0, LPWR, SPI2};

pub struct DisplayPins<'a> {
    pub spi2: SPI2<'a>,
    pub spi_sck: GPIO10<'a>,
    pub spi_mosi: GPIO11<'a>,
    pub lcd_cs: Output<'a>,
    pub lcd_dc: Output<'a>,
    pub lcd_rst: Output<'a>,
    pub lcd_bl: Output<'a>,
}

pub struct RtcPins<'a> {
    pub i2c0: I2C0<'a>,
    pub sda: GPIO4<'a>,
    pub scl: GPIO5<'a>,
}

pub struct BoardPins<'a> {
    pub vibe: Output<'a>,
    pub link: Input<'a>,
    pub button: Input<'a>,
    pub display_pins: DisplayPins<'a>,
    pub rtc_pins: RtcPins<'a>,
    pub lpwr: LPWR<'a>,
}

// Default profile
#[cfg(feature = "devkit-esp32s3-disp128")]
pub fn init_board_pins(p: Peripherals) -> (Io<'static>, BoardPins<'static>) {
    let io = Io::new(p.IO_MUX);

    // motor off until asked
    let vibe = Output::new(p.GPIO1, Level::Low, OutputConfig::default());

    // link status interrupts on both edges; pull-down reads "disconnected" if the module is absent
    let mut link = Input::new(p.GPIO15, InputConfig::default().with_pull(Pull::Down));
    link.listen(Event::AnyEdge);

    // side button is polled for the shutdown hold, no interrupt
    let button = Input::new(p.GPIO21, InputConfig::default().with_pull(Pull::Up));

    // LCD control pins, do NOT touch GPIO10/11 here (SPI SCK/MOSI)
    let lcd_cs  = Output::new(p.GPIO9,  Level::High, OutputConfig::default());
    let lcd_dc  = Output::new(p.GPIO8,  Level::Low,  OutputConfig::default());
    let lcd_rst = Output::new(p.GPIO14, Level::High, OutputConfig::default());
    let lcd_bl  = Output::new(p.GPIO2,  Level::High, OutputConfig::default());

    (
        io,
        BoardPins {
            vibe,
            link,
            button,
            display_pins: DisplayPins {
                spi2: p.SPI2,
                spi_sck: p.GPIO10,
                spi_mosi: p.GPIO11,
                lcd_cs,
                lcd_dc,
                lcd_rst,
                lcd_bl,
            },
            rtc_pins: RtcPins {
                i2c0: p.I2C0,
                sda: p.GPIO4,
                scl: p.GPIO5,
            },
            lpwr: p.LPWR,
        },
    )
}
