//! Frame-driven elapsed-time source.
//!
//! The session engine never reads the clock itself. A [`ClockDriver`] turns
//! whatever cadence the host has (a render callback, an input poll timeout)
//! into elapsed-time deltas, so countdown accuracy follows real wall time
//! even when frames are dropped or the process is suspended.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use chrono::{Local, NaiveDate};

/// Monotonic time in milliseconds since an arbitrary origin.
pub trait TimeSource {
    fn now_ms(&self) -> f64;
}

/// Production time source backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-advanced time source. Clones share the same reading.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_ms(&self, ms: f64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    pub fn set_ms(&self, ms: f64) {
        self.now_ms.set(ms);
    }
}

impl TimeSource for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }
}

/// Converts frames into elapsed seconds while started.
#[derive(Debug, Clone)]
pub struct ClockDriver<S: TimeSource> {
    source: S,
    started: bool,
    last_ms: Option<f64>,
}

impl<S: TimeSource> ClockDriver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            started: false,
            last_ms: None,
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Begin delivering deltas. Calling it again while started keeps the
    /// current timestamp so no time is lost or double counted.
    pub fn start(&mut self) {
        self.started = true;
    }

    /// Halt delivery and forget the last timestamp.
    pub fn stop(&mut self) {
        self.started = false;
        self.last_ms = None;
    }

    /// One frame. Returns the seconds elapsed since the previous frame, zero
    /// on the first frame after a (re)start, and `None` while stopped.
    pub fn frame(&mut self) -> Option<f64> {
        if !self.started {
            return None;
        }
        let now = self.source.now_ms();
        let dt = match self.last_ms {
            Some(last) => ((now - last) / 1000.0).max(0.0),
            None => 0.0,
        };
        self.last_ms = Some(now);
        Some(dt)
    }
}

/// Source of "today" for streak and achievement bookkeeping.
pub trait Calendar {
    fn today(&self) -> NaiveDate;
}

/// The user's local calendar day.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCalendar;

impl Calendar for LocalCalendar {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Calendar pinned to a settable day. Clones share the same day.
#[derive(Debug, Clone)]
pub struct FixedCalendar {
    day: Rc<Cell<NaiveDate>>,
}

impl FixedCalendar {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day: Rc::new(Cell::new(day)),
        }
    }

    pub fn set(&self, day: NaiveDate) {
        self.day.set(day);
    }

    pub fn advance_days(&self, days: u64) {
        let next = self
            .day
            .get()
            .checked_add_days(chrono::Days::new(days))
            .unwrap_or(NaiveDate::MAX);
        self.day.set(next);
    }
}

impl Calendar for FixedCalendar {
    fn today(&self) -> NaiveDate {
        self.day.get()
    }
}
