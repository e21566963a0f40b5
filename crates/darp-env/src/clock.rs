//! `EventClock`: continuous simulated time plus the pending-event queue.
//!
//! Two kinds of events wake the environment:
//!
//! - **arrivals**: a driver reaching its destination, keyed by arrival time;
//! - **window boundaries**: any target window opening or closing, so drivers
//!   that chose to wait get another decision when the feasible set changes.
//!
//! Arrivals live in a `BTreeMap<EventTime, Vec<DriverId>>` that persists
//! across steps.  Only the driver whose trip changed is touched; a per-driver
//! slot remembers its current key so rescheduling never scans the map.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use darp_core::{DriverId, EventTime, TIME_EPS};

pub struct EventClock {
    now:        f64,
    arrivals:   BTreeMap<EventTime, Vec<DriverId>>,
    /// `scheduled[d]` is the key under which driver `d` sits in `arrivals`.
    scheduled:  Vec<Option<EventTime>>,
    boundaries: BTreeSet<EventTime>,
}

impl EventClock {
    /// A clock at time 0 for `driver_count` drivers and the given window
    /// boundaries (duplicates collapse).
    pub fn new(driver_count: usize, boundaries: impl IntoIterator<Item = f64>) -> Self {
        Self {
            now:        0.0,
            arrivals:   BTreeMap::new(),
            scheduled:  vec![None; driver_count],
            boundaries: boundaries.into_iter().map(EventTime).collect(),
        }
    }

    #[inline]
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Schedule `driver` to arrive at `at`, replacing any earlier entry.
    pub fn schedule(&mut self, driver: DriverId, at: f64) {
        self.cancel(driver);
        let key = EventTime(at);
        self.arrivals.entry(key).or_default().push(driver);
        self.scheduled[driver.index()] = Some(key);
    }

    /// Drop `driver`'s pending arrival, if any.
    pub fn cancel(&mut self, driver: DriverId) {
        let Some(key) = self.scheduled[driver.index()].take() else {
            return;
        };
        if let Some(drivers) = self.arrivals.get_mut(&key) {
            drivers.retain(|&d| d != driver);
            if drivers.is_empty() {
                self.arrivals.remove(&key);
            }
        }
    }

    /// Pending arrival time of `driver`.
    #[inline]
    pub fn arrival_of(&self, driver: DriverId) -> Option<f64> {
        self.scheduled[driver.index()].map(EventTime::get)
    }

    /// Earliest upcoming event: the first pending arrival (which may be due
    /// right now, for zero-length trips) or the first boundary strictly after
    /// `now`.
    pub fn next_event(&self) -> Option<f64> {
        let arrival = self.arrivals.keys().next().copied();
        let boundary = self
            .boundaries
            .range((Bound::Excluded(EventTime(self.now)), Bound::Unbounded))
            .next()
            .copied();
        match (arrival, boundary) {
            (Some(a), Some(b)) => Some(a.min(b).get()),
            (a, b) => a.or(b).map(EventTime::get),
        }
    }

    /// Move time forward to `t` and return the gap.  Boundaries before the
    /// new time are discarded.
    pub fn advance_to(&mut self, t: f64) -> f64 {
        let previous = self.now;
        self.now = previous.max(t);
        self.boundaries = self.boundaries.split_off(&EventTime(self.now));
        self.now - previous
    }

    /// Remove every arrival due by now (within `TIME_EPS`), in ascending
    /// driver order.
    pub fn drain_due(&mut self) -> Vec<DriverId> {
        let mut due = Vec::new();
        while let Some(entry) = self.arrivals.first_entry() {
            if entry.key().get() > self.now + TIME_EPS {
                break;
            }
            due.extend(entry.remove());
        }
        for &d in &due {
            self.scheduled[d.index()] = None;
        }
        due.sort_unstable();
        due
    }

    /// Number of drivers with a pending arrival.
    pub fn pending(&self) -> usize {
        self.scheduled.iter().filter(|s| s.is_some()).count()
    }

    /// Window boundaries still ahead of (or at) the current time.
    pub fn boundary_count(&self) -> usize {
        self.boundaries.len()
    }
}
