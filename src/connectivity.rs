//! Phone link watcher.
//!
//! The stored state only changes on an edge: a report equal to the current
//! state is ignored, a differing one flips the state and fires one haptic
//! pulse.

use embedded_hal::digital::InputPin;

use crate::haptics::Haptics;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ConnectivityState {
    #[default]
    Connected,
    Disconnected,
}

impl ConnectivityState {
    pub fn from_connected(connected: bool) -> Self {
        if connected {
            Self::Connected
        } else {
            Self::Disconnected
        }
    }

    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// An edge reported by [`ConnectivityWatcher::report`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: ConnectivityState,
    pub to: ConnectivityState,
}

/// Source of the link status: a synchronous peek for startup.
/// Change notifications arrive as events.
pub trait ConnectivityService {
    fn peek(&mut self) -> bool;
}

#[derive(Debug, Default)]
pub struct ConnectivityWatcher {
    state: ConnectivityState,
}

impl ConnectivityWatcher {
    pub fn new(initial: ConnectivityState) -> Self {
        Self { state: initial }
    }

    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Feeds one link report. Pulses and returns the edge if the state changed.
    pub fn report(&mut self, connected: bool, haptics: &mut impl Haptics) -> Option<Transition> {
        let next = ConnectivityState::from_connected(connected);
        if next == self.state {
            return None;
        }
        haptics.long_pulse();
        let transition = Transition {
            from: self.state,
            to: next,
        };
        self.state = next;
        Some(transition)
    }
}

/// Link status wired to a GPIO, e.g. the STATUS line of a BLE UART module.
pub struct LinkPin<P> {
    pin: P,
    active_high: bool,
}

impl<P: InputPin> LinkPin<P> {
    pub fn new(pin: P, active_high: bool) -> Self {
        Self { pin, active_high }
    }

    /// For interrupt bookkeeping on the underlying pin.
    pub fn pin_mut(&mut self) -> &mut P {
        &mut self.pin
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: InputPin> ConnectivityService for LinkPin<P> {
    fn peek(&mut self) -> bool {
        // A pin read error counts as "no link".
        match self.pin.is_high() {
            Ok(high) => high == self.active_high,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    #[derive(Default)]
    struct CountingHaptics {
        pulses: usize,
    }

    impl Haptics for CountingHaptics {
        fn long_pulse(&mut self) {
            self.pulses += 1;
        }
    }

    struct StaticPin(bool);

    impl ErrorType for StaticPin {
        type Error = Infallible;
    }

    impl InputPin for StaticPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.0)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.0)
        }
    }

    #[test]
    fn test_pulses_only_on_edges() {
        let mut watcher = ConnectivityWatcher::new(ConnectivityState::Connected);
        let mut haptics = CountingHaptics::default();

        let mut pulsed_at = heapless::Vec::<usize, 4>::new();
        for (step, report) in [true, false, false, true].into_iter().enumerate() {
            let before = haptics.pulses;
            watcher.report(report, &mut haptics);
            if haptics.pulses != before {
                pulsed_at.push(step + 1).unwrap();
            }
        }

        assert_eq!(haptics.pulses, 2);
        assert_eq!(pulsed_at.as_slice(), &[2, 4]);
        assert!(watcher.is_connected());
    }

    #[test]
    fn test_repeated_reports_are_idempotent() {
        let mut watcher = ConnectivityWatcher::new(ConnectivityState::Disconnected);
        let mut haptics = CountingHaptics::default();
        for _ in 0..5 {
            assert_eq!(watcher.report(false, &mut haptics), None);
        }
        assert_eq!(haptics.pulses, 0);
    }

    #[test]
    fn test_report_returns_the_edge() {
        let mut watcher = ConnectivityWatcher::default();
        let mut haptics = CountingHaptics::default();
        assert_eq!(
            watcher.report(false, &mut haptics),
            Some(Transition {
                from: ConnectivityState::Connected,
                to: ConnectivityState::Disconnected,
            })
        );
        assert_eq!(watcher.state(), ConnectivityState::Disconnected);
    }

    #[test]
    fn test_link_pin_polarity() {
        assert!(LinkPin::new(StaticPin(true), true).peek());
        assert!(!LinkPin::new(StaticPin(false), true).peek());
        assert!(LinkPin::new(StaticPin(false), false).peek());
    }
}
