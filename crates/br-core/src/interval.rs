//! Interval engine.
//!
//! Presents a live "time since the last entry" display derived from the log.
//!
//! # Algorithm Summary
//!
//! 1. The anchor is the maximum timestamp in the owner's log (`None` when empty)
//! 2. Every tick computes `now - anchor` in milliseconds
//! 3. The difference is floor-decomposed into days/hours/minutes/seconds; a
//!    negative difference (anchor in the future) yields the zero snapshot
//!
//! The engine holds no authoritative state: it is rebuilt from the log on
//! every load and after every mutation.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::category::Category;
use crate::clock::Clock;
use crate::event::Event;

/// Cadence at which the display is recomputed.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// Elapsed time since the anchor, decomposed into calendar-agnostic fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IntervalSnapshot {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl IntervalSnapshot {
    pub const ZERO: Self = Self {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Decomposes `now - anchor`. Anchors in the future clamp to [`Self::ZERO`].
    pub fn between(anchor: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let elapsed_ms = now.signed_duration_since(anchor).num_milliseconds();
        let Ok(ms) = u64::try_from(elapsed_ms) else {
            return Self::ZERO;
        };
        Self {
            days: ms / MS_PER_DAY,
            hours: (ms % MS_PER_DAY) / MS_PER_HOUR,
            minutes: (ms % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (ms % MS_PER_MINUTE) / MS_PER_SECOND,
        }
    }
}

impl fmt::Display for IntervalSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}d {:02}h {:02}m {:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Handle for the repeating tick timer.
///
/// The generation increments every time the timer is re-armed, so a host
/// driving a real timer can tell when to restart it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickTimer {
    armed: bool,
    generation: u64,
}

impl TickTimer {
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    const fn arm(&mut self) {
        self.armed = true;
        self.generation += 1;
    }

    const fn clear(&mut self) {
        self.armed = false;
    }
}

/// What the display should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No entry logged yet; the start form is shown.
    Setup,
    /// Counting up from the anchor.
    Running {
        anchor: DateTime<Utc>,
        snapshot: IntervalSnapshot,
    },
}

/// Derives the anchor from the log and ticks the elapsed display.
#[derive(Debug)]
pub struct IntervalEngine<C> {
    clock: C,
    anchor: Option<DateTime<Utc>>,
    snapshot: IntervalSnapshot,
    timer: TickTimer,
}

impl<C: Clock> IntervalEngine<C> {
    /// Creates an engine in the setup state.
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            anchor: None,
            snapshot: IntervalSnapshot::ZERO,
            timer: TickTimer::default(),
        }
    }

    /// Replaces the reference instant.
    ///
    /// A changed anchor clears the timer, re-arms it once when the new anchor
    /// is present, and recomputes the snapshot immediately. Returns whether
    /// the anchor changed.
    pub fn set_anchor(&mut self, anchor: Option<DateTime<Utc>>) -> bool {
        if self.anchor == anchor {
            return false;
        }
        self.timer.clear();
        self.anchor = anchor;
        match anchor {
            Some(anchor) => {
                self.timer.arm();
                self.snapshot = IntervalSnapshot::between(anchor, self.clock.now());
                tracing::debug!(
                    %anchor,
                    generation = self.timer.generation(),
                    "anchor changed, tick timer re-armed"
                );
            }
            None => {
                self.snapshot = IntervalSnapshot::ZERO;
                tracing::debug!("log is empty, entering setup state");
            }
        }
        true
    }

    /// Re-derives the anchor from the log's most recent entry.
    ///
    /// The log does not need to be sorted.
    pub fn rederive(&mut self, log: &[Event]) -> bool {
        self.set_anchor(log.iter().map(|event| event.timestamp).max())
    }

    /// Recomputes the snapshot from the clock.
    ///
    /// Returns `None` while the timer is cleared.
    pub fn tick(&mut self) -> Option<IntervalSnapshot> {
        if !self.timer.is_armed() {
            return None;
        }
        let anchor = self.anchor?;
        self.snapshot = IntervalSnapshot::between(anchor, self.clock.now());
        Some(self.snapshot)
    }

    /// Stops the timer when the view goes away. The anchor is kept.
    pub fn unmount(&mut self) {
        self.timer.clear();
    }

    /// Re-arms the timer for the kept anchor after [`Self::unmount`].
    ///
    /// No-op while the timer runs or in the setup state.
    pub fn mount(&mut self) {
        if self.timer.is_armed() {
            return;
        }
        let Some(anchor) = self.anchor else {
            return;
        };
        self.timer.arm();
        self.snapshot = IntervalSnapshot::between(anchor, self.clock.now());
        tracing::debug!(generation = self.timer.generation(), "tick timer re-armed on mount");
    }

    pub fn state(&self) -> EngineState {
        match self.anchor {
            Some(anchor) => EngineState::Running {
                anchor,
                snapshot: self.snapshot,
            },
            None => EngineState::Setup,
        }
    }

    pub const fn anchor(&self) -> Option<DateTime<Utc>> {
        self.anchor
    }

    pub const fn timer(&self) -> TickTimer {
        self.timer
    }

    pub const fn clock(&self) -> &C {
        &self.clock
    }
}

/// Counts entries whose category is not `excluded`.
pub fn derive_count(log: &[Event], excluded: Category) -> usize {
    log.iter().filter(|event| event.category != excluded).count()
}

/// Numbers a descending log for display.
///
/// Each non-origin entry gets `1 +` the number of non-origin entries older
/// than it; origin entries get `None`.
pub fn number_entries(log: &[Event], origin: Category) -> Vec<Option<usize>> {
    let mut numbers = vec![None; log.len()];
    let mut seen = 0;
    for (index, event) in log.iter().enumerate().rev() {
        if event.category != origin {
            seen += 1;
            numbers[index] = Some(seen);
        }
    }
    numbers
}
