//! Event loop and the watchface context.
//!
//! Everything runs on one thread: events are queued (from the main loop or
//! from interrupt flags it drains), then handled one at a time to completion.
//! A `Tick` only marks the face dirty; the next `render` samples the clock
//! and repaints. Ticks that pile up are merged, never replayed.

use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::Rectangle,
};
use heapless::Deque;

use crate::clock::{center_of, ClockSource, HandAngles};
use crate::connectivity::{
    ConnectivityService, ConnectivityState, ConnectivityWatcher, Transition,
};
use crate::hands::{HandShape, OrientedHand};
use crate::haptics::Haptics;
use crate::palette::BACKGROUND;
use crate::raster::Inverter;
use crate::render::draw_face;

pub const EVENT_QUEUE_LEN: usize = 8;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Tick,
    ConnectivityChanged(bool),
    Shutdown,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Bounded FIFO of pending events.
///
/// A `Tick` pushed right behind another `Tick` is dropped, so a stalled loop
/// redraws once instead of catching up second by second. When full, a new
/// `Shutdown` evicts the oldest entry; anything else is dropped.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Deque<Event, EVENT_QUEUE_LEN>,
}

impl EventQueue {
    pub const fn new() -> Self {
        Self { events: Deque::new() }
    }

    /// Returns `false` if the event was dropped.
    pub fn push(&mut self, event: Event) -> bool {
        if event == Event::Tick && self.events.back() == Some(&Event::Tick) {
            return false;
        }
        if self.events.is_full() {
            if event != Event::Shutdown {
                return false;
            }
            self.events.pop_front();
        }
        self.events.push_back(event).is_ok()
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Turns a free-running millisecond clock into one tick per second boundary.
#[derive(Debug, Default)]
pub struct TickTimer {
    last_second: Option<u64>,
}

impl TickTimer {
    pub const fn new() -> Self {
        Self { last_second: None }
    }

    /// True at most once per wall second, however far `now_ms` jumped.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        let second = now_ms / 1000;
        match self.last_second {
            Some(last) if last == second => false,
            _ => {
                self.last_second = Some(second);
                true
            }
        }
    }
}

/// Process-owned state of the watchface.
///
/// Built once by [`WatchFace::init`], driven by [`WatchFace::handle`] and
/// [`WatchFace::render`], and torn down by [`WatchFace::deinit`], which hands
/// the borrowed services back.
pub struct WatchFace<C, H> {
    clock: C,
    haptics: H,
    watcher: ConnectivityWatcher,
    minute_hand: OrientedHand,
    hour_hand: OrientedHand,
    bounds: Rectangle,
    dirty: bool,
}

impl<C, H> WatchFace<C, H>
where
    C: ClockSource,
    H: Haptics,
{
    /// Lays the face out in `bounds` and takes the initial link state.
    ///
    /// The peeked state is applied as an ordinary report against a
    /// `Connected` default, so starting without a link pulses once.
    pub fn init(
        clock: C,
        mut haptics: H,
        link: &mut impl ConnectivityService,
        bounds: Rectangle,
    ) -> Self {
        let mut watcher = ConnectivityWatcher::new(ConnectivityState::Connected);
        watcher.report(link.peek(), &mut haptics);

        let center = center_of(&bounds);
        let mut minute_hand = OrientedHand::new(HandShape::MINUTE);
        let mut hour_hand = OrientedHand::new(HandShape::HOUR);
        minute_hand.move_to(center);
        hour_hand.move_to(center);

        Self {
            clock,
            haptics,
            watcher,
            minute_hand,
            hour_hand,
            bounds,
            dirty: true,
        }
    }

    pub fn connectivity(&self) -> ConnectivityState {
        self.watcher.state()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }

    pub fn haptics_mut(&mut self) -> &mut H {
        &mut self.haptics
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Handles one event. Returns the link edge, if this event caused one.
    pub fn handle(&mut self, event: Event) -> (Flow, Option<Transition>) {
        match event {
            Event::Tick => {
                self.dirty = true;
                (Flow::Continue, None)
            }
            Event::ConnectivityChanged(connected) => {
                let edge = self.watcher.report(connected, &mut self.haptics);
                if edge.is_some() {
                    self.dirty = true;
                }
                (Flow::Continue, edge)
            }
            Event::Shutdown => (Flow::Exit, None),
        }
    }

    /// Repaints the whole layer: black window, face drawn through the inverter.
    pub fn render<D>(&mut self, target: &mut D) -> Result<HandAngles, D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let sample = self.clock.now();
        let connected = self.watcher.is_connected();
        let mut layer = Inverter::new(target);
        layer.clear(BACKGROUND)?;
        let angles = draw_face(
            &mut layer,
            &self.bounds,
            sample,
            connected,
            &mut self.minute_hand,
            &mut self.hour_hand,
        )?;
        self.dirty = false;
        Ok(angles)
    }

    /// Renders only if something marked the face dirty.
    pub fn render_if_dirty<D>(&mut self, target: &mut D) -> Result<Option<HandAngles>, D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        if !self.dirty {
            return Ok(None);
        }
        self.render(target).map(Some)
    }

    /// Drains `queue`, repainting after each event that dirtied the face.
    /// `on_edge` sees every link transition.
    pub fn pump<D>(
        &mut self,
        queue: &mut EventQueue,
        target: &mut D,
        mut on_edge: impl FnMut(Transition),
    ) -> Result<Flow, D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        while let Some(event) = queue.pop() {
            let (flow, edge) = self.handle(event);
            if let Some(edge) = edge {
                on_edge(edge);
            }
            if flow == Flow::Exit {
                return Ok(Flow::Exit);
            }
            self.render_if_dirty(target)?;
        }
        Ok(Flow::Continue)
    }

    /// Runs until `Shutdown` or the event source ends.
    pub fn run<I, D>(&mut self, events: I, target: &mut D) -> Result<(), D::Error>
    where
        I: IntoIterator<Item = Event>,
        D: DrawTarget<Color = BinaryColor>,
    {
        self.render_if_dirty(target)?;
        for event in events {
            if self.handle(event).0 == Flow::Exit {
                break;
            }
            self.render_if_dirty(target)?;
        }
        Ok(())
    }

    /// Tears the face down and returns the services it owned.
    pub fn deinit(self) -> (C, H) {
        (self.clock, self.haptics)
    }
}
