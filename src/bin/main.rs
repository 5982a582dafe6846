//! Five O'Clock watchface firmware
//! ========================================
//! source ~/export-esp.sh
//! cargo run --release --features devkit-esp32s3-disp128
//! ========================================
//!
//! Hour and minute hands with a second marker on the rim. The marker
//! inverts while the phone link is down and the motor buzzes on every
//! link change. Hold the side button for 5 s to power down.

//% CHIPS: esp32s3
//% FEATURES: esp-hal/unstable

#![no_std]
#![no_main]

// Application descriptor checked by the bootloader.
esp_bootloader_esp_idf::esp_app_desc!();

use five_oclock::{
    app::{Event, EventQueue, Flow, TickTimer, WatchFace},
    button::{wait_for_release, HoldToShutdown, RELEASE_WAIT_MS},
    connectivity::{ConnectivityService, ConnectivityState, LinkPin},
    display::{present, setup_display, SpinDelay, FACE_ORIGIN},
    framebuffer::FrameBuffer,
    haptics::VibeMotor,
    rtc::{Pcf85063, RtcClock},
    wiring::{init_board_pins, BoardPins, RtcPins},
};

// Core imports
use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};
use critical_section::Mutex;
use embedded_hal::delay::DelayNs;
use esp_backtrace as _;

// ESP-HAL imports
use esp_hal::{
    gpio::Input,
    handler,
    i2c::master::{Config as I2cConfig, I2c},
    main, ram,
    rtc_cntl::{
        sleep::{Ext0WakeupSource, WakeupLevel},
        Rtc,
    },
    time::Rate,
    timer::systimer::{SystemTimer, Unit},
    Config,
};

use embedded_graphics::{pixelcolor::Rgb565, prelude::*};
use esp_println::println;

#[ram]
static mut DISPLAY_BUF: [u8; 1024] = [0; 1024];

// Set by the GPIO interrupt, drained by the main loop.
static LINK_CHANGED: AtomicBool = AtomicBool::new(false);

// BLE STATUS pin, shared with the interrupt handler
static LINK: Mutex<RefCell<Option<LinkPin<Input<'static>>>>> = Mutex::new(RefCell::new(None));

fn now_ms() -> u64 {
    let t = SystemTimer::unit_value(Unit::Unit0);
    t.saturating_mul(1000) / SystemTimer::ticks_per_second()
}

fn uptime_secs() -> u32 {
    (now_ms() / 1000) as u32
}

// Interrupt handler
#[handler]
#[ram]
fn handler() {
    critical_section::with(|cs| {
        let mut link = LINK.borrow_ref_mut(cs);
        let Some(link) = link.as_mut() else {
            return;
        };
        let pin = link.pin_mut();
        if !pin.is_interrupt_set() {
            return;
        }
        pin.clear_interrupt();
        LINK_CHANGED.store(true, Ordering::Release);
    });
}

fn link_connected() -> bool {
    critical_section::with(|cs| {
        LINK.borrow_ref_mut(cs)
            .as_mut()
            .map(|link| link.peek())
            .unwrap_or(false)
    })
}

#[main]
fn main() -> ! {
    let peripherals = esp_hal::init(Config::default());

    // one call gives you IO handler + all role pins from wiring.rs
    let (mut io, pins) = init_board_pins(peripherals);
    let BoardPins {
        vibe,
        link,
        mut button,
        display_pins,
        rtc_pins,
        lpwr,
    } = pins;

    let mut rtc = Rtc::new(lpwr);
    println!("five_oclock: boot");

    // If the button woke us it is probably still down; let go of it first
    if !wait_for_release(&mut button, now_ms, RELEASE_WAIT_MS) {
        println!("button still held, shutdown disarmed until released");
    }

    // Safe because DISPLAY_BUF is only used here
    let mut display = setup_display(display_pins, unsafe {
        &mut *core::ptr::addr_of_mut!(DISPLAY_BUF)
    });
    // panel area outside the face matches the face background
    display.clear(Rgb565::WHITE).ok();
    println!("display up, face at {:?}", FACE_ORIGIN);

    // PCF85063 on I2C0 @ 400 kHz
    let RtcPins { i2c0, sda, scl } = rtc_pins;
    let i2c_cfg = I2cConfig::default().with_frequency(Rate::from_khz(400));
    let i2c = match I2c::new(i2c0, i2c_cfg) {
        Ok(i2c) => i2c.with_sda(sda).with_scl(scl),
        Err(e) => panic!("I2C0 config rejected: {:?}", e),
    };
    let clock = RtcClock::new(Pcf85063::new(i2c), uptime_secs);

    let mut frame = FrameBuffer::new();
    let mut link = LinkPin::new(link, true);
    let mut face = WatchFace::init(clock, VibeMotor::new(vibe), &mut link, frame.bounds());
    println!("link at startup: {}", describe(face.connectivity()));

    critical_section::with(|cs| LINK.borrow_ref_mut(cs).replace(link));
    io.set_interrupt_handler(handler);

    // first frame right away, ticks take over from here
    if let Err(e) = face.render(&mut frame) {
        match e {}
    }
    if face.clock_mut().is_anchored() {
        println!("clock: PCF85063");
    } else {
        println!("clock: RTC unreadable, running on uptime");
    }
    present(&mut frame, &mut display).ok();

    let mut queue = EventQueue::new();
    let mut ticks = TickTimer::new();
    let mut hold = HoldToShutdown::default();
    let mut reported_failure = false;

    loop {
        let now_ms = now_ms();

        if ticks.poll(now_ms) {
            queue.push(Event::Tick);
        }
        if LINK_CHANGED.swap(false, Ordering::Acquire) {
            queue.push(Event::ConnectivityChanged(link_connected()));
        }

        if hold.update(now_ms, button.is_low()) {
            queue.push(Event::Shutdown);
        }

        let flow = match face.pump(&mut queue, &mut frame, |edge| {
            println!("link {} -> {}", describe(edge.from), describe(edge.to));
        }) {
            Ok(flow) => flow,
            Err(e) => match e {},
        };
        if flow == Flow::Exit {
            break;
        }

        face.haptics_mut().service(now_ms);
        present(&mut frame, &mut display).ok();

        if face.clock_mut().needs_reseed() {
            match face.clock_mut().reseed() {
                Ok(_) => println!("clock: PCF85063 lost power, restored from uptime"),
                Err(e) => println!("clock: reseed failed: {:?}", e),
            }
        }

        let failures = face.clock_mut().failures();
        if failures > 0 && !reported_failure {
            println!("clock: RTC read failed, extrapolating");
        } else if failures == 0 && reported_failure {
            println!("clock: RTC back");
        }
        reported_failure = failures > 0;
    }

    // ---- shutdown ----
    println!("shutdown");
    critical_section::with(|cs| LINK.borrow_ref_mut(cs).take());
    let (_clock, vibe) = face.deinit();
    let _ = vibe.release();
    if !queue.is_empty() {
        println!("{} pending events dropped", queue.len());
    }

    let mut delay = SpinDelay;
    let _ = display.sleep(&mut delay);

    // The wake is level triggered: sleeping with the button down wakes right back up
    while !wait_for_release(&mut button, now_ms, RELEASE_WAIT_MS) {
        println!("waiting for button release");
    }
    delay.delay_ms(50);

    // release the pin before handing it to the RTC domain
    drop(button);
    // uses unsafe steal since we've released the pin above
    let gpio21 = unsafe { esp_hal::peripherals::GPIO21::steal() };
    use esp_hal::gpio::RtcPinWithResistors;
    gpio21.rtcio_pullup(true);
    gpio21.rtcio_pulldown(false);
    let ext0_wake = Ext0WakeupSource::new(gpio21, WakeupLevel::Low);

    // Enter deep sleep (resets on wake)
    rtc.sleep_deep(&[&ext0_wake]);
}

fn describe(state: ConnectivityState) -> &'static str {
    if state.is_connected() {
        "connected"
    } else {
        "disconnected"
    }
}
