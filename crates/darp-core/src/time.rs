//! Simulation time model.
//!
//! # Design
//!
//! Time is continuous (`f64`) and advances in irregular jumps from one event
//! to the next: a driver arriving somewhere, or a target time window opening
//! or closing.  Because vehicles move at unit speed, a travel time is the
//! euclidean distance covered.
//!
//! `f64` is not `Ord`, so event queues key on [`EventTime`], a thin wrapper
//! ordered by `f64::total_cmp`.

use std::cmp::Ordering;
use std::fmt;

/// Tolerance used when comparing an arrival time against a window bound.
pub const TIME_EPS: f64 = 1e-6;

/// Tolerance used when matching distance travelled against time elapsed.
pub const DISTANCE_EPS: f64 = 1e-3;

// ── TimeWindow ────────────────────────────────────────────────────────────────

/// Earliest and latest time at which service may begin at a location.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    #[inline]
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// `true` if `t` falls inside the window (bounds inclusive, `TIME_EPS`
    /// slack on both sides).
    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start - TIME_EPS && t <= self.end + TIME_EPS
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    #[inline]
    pub fn as_array(&self) -> [f64; 2] {
        [self.start, self.end]
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.2}, {:.2}]", self.start, self.end)
    }
}

// ── EventTime ─────────────────────────────────────────────────────────────────

/// A totally ordered simulation timestamp usable as a `BTreeMap` key.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventTime(pub f64);

impl EventTime {
    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl PartialEq for EventTime {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for EventTime {}

impl PartialOrd for EventTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f64> for EventTime {
    #[inline]
    fn from(t: f64) -> Self {
        EventTime(t)
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.3}", self.0)
    }
}
