//! A fully built problem instance.

use darp_core::{DriverId, Point, TargetId};
use darp_entity::{Driver, Target, TargetState};

use crate::{InstanceError, InstanceResult};

/// Bounding box of the instance plane.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extremas {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extremas {
    /// The square `[-size, size]²`.
    pub fn square(size: f64) -> Self {
        Self { min_x: -size, min_y: -size, max_x: size, max_y: size }
    }

    /// Smallest box containing every point (empty input gives a degenerate
    /// box at the origin).
    pub fn enclosing(points: impl IntoIterator<Item = Point>) -> Self {
        let mut it = points.into_iter();
        let Some(first) = it.next() else {
            return Self::square(0.0);
        };
        it.fold(
            Self { min_x: first.x, min_y: first.y, max_x: first.x, max_y: first.y },
            |e, p| Self {
                min_x: e.min_x.min(p.x),
                min_y: e.min_y.min(p.y),
                max_x: e.max_x.max(p.x),
                max_y: e.max_y.max(p.y),
            },
        )
    }

    /// Largest absolute coordinate: the "size" of the instance.
    pub fn size(&self) -> f64 {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .into_iter()
            .fold(0.0, |acc, v| acc.max(v.abs()))
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        (self.min_x..=self.max_x).contains(&p.x) && (self.min_y..=self.max_y).contains(&p.y)
    }
}

/// Depot, requests and vehicles for one episode.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DarpInstance {
    pub depot:    Point,
    pub extremas: Extremas,
    /// Horizon; the episode ends once simulated time reaches it.
    pub time_end: f64,
    pub targets:  Vec<Target>,
    pub drivers:  Vec<Driver>,
}

impl DarpInstance {
    /// Check the structural invariants the environment relies on.
    ///
    /// - target and driver IDs equal their position in the `Vec`s;
    /// - every time window is well-formed (`start <= end`);
    /// - every weight is positive and fits in at least one vehicle;
    /// - every request starts unassigned and every driver starts idle.
    pub fn validate(&self) -> InstanceResult<()> {
        if self.drivers.is_empty() {
            return Err(InstanceError::Invalid("instance has no drivers".into()));
        }
        for (i, t) in self.targets.iter().enumerate() {
            if t.id != TargetId(i as u32) {
                return Err(InstanceError::Invalid(format!(
                    "target at slot {i} carries id {}", t.id.0
                )));
            }
            if t.start_fork.start > t.start_fork.end || t.end_fork.start > t.end_fork.end {
                return Err(InstanceError::Invalid(format!("{} has an inverted time window", t.id)));
            }
            if t.weight <= 0 {
                return Err(InstanceError::Invalid(format!("{} has non-positive weight", t.id)));
            }
            if t.state() != TargetState::Unassigned {
                return Err(InstanceError::Invalid(format!("{} is not unassigned", t.id)));
            }
        }
        let max_capacity = self.drivers.iter().map(|d| d.max_capacity).max().unwrap_or(0);
        if let Some(t) = self.targets.iter().find(|t| t.weight as u32 > max_capacity) {
            return Err(InstanceError::Invalid(format!("{} does not fit in any vehicle", t.id)));
        }
        for (i, d) in self.drivers.iter().enumerate() {
            if d.id != DriverId(i as u32) {
                return Err(InstanceError::Invalid(format!(
                    "driver at slot {i} carries id {}", d.id.0
                )));
            }
            if !d.is_idle() || !d.loaded().is_empty() {
                return Err(InstanceError::Invalid(format!("{} does not start idle and empty", d.id)));
            }
        }
        Ok(())
    }

    /// Every window bound of every target, in target order.
    ///
    /// The clock wakes the simulation at each of these so waiting drivers get
    /// a chance to act when a window opens or closes.
    pub fn window_boundaries(&self) -> Vec<f64> {
        self.targets.iter().flat_map(Target::fork_bounds).collect()
    }
}
