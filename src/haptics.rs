//! Vibration feedback.
//!
//! Requests are fire-and-forget: `long_pulse` only switches the motor on and
//! the owner's main loop calls `VibeMotor::service` to switch it off once the
//! pulse has run its length. Nothing here blocks.

use embedded_hal::digital::OutputPin;

/// Length of a long pulse.
pub const LONG_PULSE_MS: u64 = 500;

pub trait Haptics {
    fn long_pulse(&mut self);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Pulse {
    Idle,
    // Requested, start time not yet known.
    Armed,
    Running { until_ms: u64 },
}

/// Vibration motor behind a GPIO (usually through a transistor).
pub struct VibeMotor<P> {
    pin: P,
    pulse: Pulse,
}

impl<P: OutputPin> VibeMotor<P> {
    pub fn new(mut pin: P) -> Self {
        // A failed write here leaves the motor in whatever state the pin was in.
        pin.set_low().ok();
        Self {
            pin,
            pulse: Pulse::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        !matches!(self.pulse, Pulse::Idle)
    }

    /// Advances the pulse timer; call from the main loop with a monotonic clock.
    pub fn service(&mut self, now_ms: u64) {
        match self.pulse {
            Pulse::Idle => {}
            Pulse::Armed => {
                self.pulse = Pulse::Running {
                    until_ms: now_ms.saturating_add(LONG_PULSE_MS),
                };
            }
            Pulse::Running { until_ms } => {
                if now_ms >= until_ms {
                    let _ = self.pin.set_low();
                    self.pulse = Pulse::Idle;
                }
            }
        }
    }

    /// Stops any pulse and hands the pin back.
    pub fn release(mut self) -> P {
        let _ = self.pin.set_low();
        self.pin
    }
}

impl<P: OutputPin> Haptics for VibeMotor<P> {
    fn long_pulse(&mut self) {
        let _ = self.pin.set_high();
        // A new request restarts the window.
        self.pulse = Pulse::Armed;
    }
}
