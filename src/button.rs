//! Side button handling for the power-down gesture.
//!
//! The button doubles as the deep-sleep wake source, and the wake is level
//! triggered on "pressed". So the press that ends a shutdown must be released
//! before sleeping, and the press that woke the chip must be released before
//! it can count towards the next shutdown.

use embedded_hal::digital::InputPin;

/// Hold the button this long to power down.
pub const SHUTDOWN_HOLD_MS: u64 = 5_000;

/// Upper bound on any wait for the button to come back up.
pub const RELEASE_WAIT_MS: u64 = 3_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Hold {
    // Pressed since before we started watching; ignored until released.
    AwaitingRelease,
    Released,
    Held { since_ms: u64 },
}

/// Detects a long press, starting disarmed.
#[derive(Debug)]
pub struct HoldToShutdown {
    state: Hold,
    hold_ms: u64,
}

impl Default for HoldToShutdown {
    fn default() -> Self {
        Self::new(SHUTDOWN_HOLD_MS)
    }
}

impl HoldToShutdown {
    pub const fn new(hold_ms: u64) -> Self {
        Self {
            state: Hold::AwaitingRelease,
            hold_ms,
        }
    }

    /// False until the button has been seen released once.
    pub fn is_armed(&self) -> bool {
        self.state != Hold::AwaitingRelease
    }

    /// Feeds one button sample. Returns true while a full-length hold is in progress.
    pub fn update(&mut self, now_ms: u64, pressed: bool) -> bool {
        match (self.state, pressed) {
            (_, false) => {
                self.state = Hold::Released;
                false
            }
            (Hold::AwaitingRelease, true) => false,
            (Hold::Released, true) => {
                self.state = Hold::Held { since_ms: now_ms };
                false
            }
            (Hold::Held { since_ms }, true) => now_ms.saturating_sub(since_ms) >= self.hold_ms,
        }
    }
}

/// Spins until `pin` reads released (high, pulled up) or `timeout_ms` elapses.
/// Returns whether the button was released.
pub fn wait_for_release<P: InputPin>(
    pin: &mut P,
    mut now_ms: impl FnMut() -> u64,
    timeout_ms: u64,
) -> bool {
    let start = now_ms();
    loop {
        // read error counts as still pressed
        if pin.is_high().unwrap_or(false) {
            return true;
        }
        if now_ms().saturating_sub(start) >= timeout_ms {
            return false;
        }
        core::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    // Reads low (pressed) for the first `low_reads` samples, then high.
    struct ReleasingPin {
        low_reads: u32,
    }

    impl ErrorType for ReleasingPin {
        type Error = Infallible;
    }

    impl InputPin for ReleasingPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            if self.low_reads == 0 {
                return Ok(true);
            }
            self.low_reads -= 1;
            Ok(false)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            self.is_high().map(|high| !high)
        }
    }

    #[test]
    fn test_hold_fires_after_full_length() {
        let mut hold = HoldToShutdown::default();
        assert!(!hold.update(0, false));
        assert!(!hold.update(100, true));
        assert!(!hold.update(5_099, true));
        assert!(hold.update(5_100, true));
    }

    #[test]
    fn test_release_restarts_the_hold() {
        let mut hold = HoldToShutdown::new(1_000);
        hold.update(0, false);
        hold.update(0, true);
        hold.update(900, false);
        assert!(!hold.update(950, true));
        assert!(!hold.update(1_900, true));
        assert!(hold.update(1_950, true));
    }

    #[test]
    fn test_press_held_through_boot_is_ignored() {
        // Woken by the button and still holding it.
        let mut hold = HoldToShutdown::new(1_000);
        assert!(!hold.is_armed());
        for t in (0..10_000).step_by(100) {
            assert!(!hold.update(t, true));
        }
        assert!(!hold.is_armed());

        hold.update(10_000, false);
        assert!(hold.is_armed());
        hold.update(10_100, true);
        assert!(hold.update(11_100, true));
    }

    #[test]
    fn test_wait_for_release_returns_once_up() {
        let mut pin = ReleasingPin { low_reads: 5 };
        let mut t = 0u64;
        assert!(wait_for_release(&mut pin, || { t += 10; t }, RELEASE_WAIT_MS));
        assert_eq!(pin.low_reads, 0);
    }

    #[test]
    fn test_wait_for_release_gives_up() {
        let mut pin = ReleasingPin { low_reads: u32::MAX };
        let mut t = 0u64;
        assert!(!wait_for_release(&mut pin, || { t += 10; t }, 500));
        assert!(t >= 510);
    }
}
