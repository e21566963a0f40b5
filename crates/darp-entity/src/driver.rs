//! Vehicles and their pickup/dropoff state machine.

use std::fmt;

use darp_core::{DISTANCE_EPS, DriverId, Point, TargetId};

use crate::{EntityError, EntityResult, Target, TargetState};

// ── Order ─────────────────────────────────────────────────────────────────────

/// What the driver is doing on its current trip.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Order {
    /// No trip in progress; the driver is waiting for a decision.
    #[default]
    Idle,
    /// Heading to a pickup.
    Picking,
    /// Heading to a dropoff.
    Dropping,
}

impl Order {
    #[inline]
    pub fn code(self) -> u8 {
        match self {
            Order::Idle     => 0,
            Order::Picking  => 1,
            Order::Dropping => 2,
        }
    }
}

// ── Assignment ────────────────────────────────────────────────────────────────

/// Why [`Driver::set_target`] refused a request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// Taking the request on board would exceed `max_capacity`.
    CapacityExceeded,
    /// Arrival would fall outside the relevant time window.
    OutsideWindow,
    /// Dropoff requested for a target this driver is not carrying.
    NotCarried,
    /// The target is in a state that cannot be claimed.
    Unavailable(TargetState),
    /// The driver is still on a trip; neither a new target nor waiting is
    /// accepted until it arrives.
    Busy,
}

/// Result of [`Driver::set_target`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Assignment {
    /// Destination set; `distance` is the length of the committed trip.
    Assigned { distance: f64 },
    /// The idle driver waits where it is.
    Cleared,
    Rejected(Rejection),
}

impl Assignment {
    #[inline]
    pub fn is_accepted(self) -> bool {
        !matches!(self, Assignment::Rejected(_))
    }
}

// ── Driver ────────────────────────────────────────────────────────────────────

/// A vehicle.
///
/// Position changes only through [`move_to`](Self::move_to), which the
/// environment's clock calls while advancing time.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Driver {
    pub id:           DriverId,
    pub max_capacity: u32,
    position:         Point,
    /// Carried targets in boarding order.
    loaded:           Vec<TargetId>,
    load_weight:      i32,
    destination:      Option<Point>,
    order:            Order,
    target:           Option<TargetId>,
}

impl Driver {
    /// Length of [`info_vector`](Self::info_vector).
    pub const INFO_LEN: usize = 9;

    /// An empty, idle vehicle at `position`.
    pub fn new(id: DriverId, position: Point, max_capacity: u32) -> Self {
        Self {
            id,
            max_capacity,
            position,
            loaded: Vec::new(),
            load_weight: 0,
            destination: None,
            order: Order::Idle,
            target: None,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn position(&self) -> Point {
        self.position
    }

    #[inline]
    pub fn destination(&self) -> Option<Point> {
        self.destination
    }

    #[inline]
    pub fn order(&self) -> Order {
        self.order
    }

    /// The target the current trip serves.
    #[inline]
    pub fn target(&self) -> Option<TargetId> {
        self.target
    }

    #[inline]
    pub fn loaded(&self) -> &[TargetId] {
        &self.loaded
    }

    #[inline]
    pub fn load_weight(&self) -> i32 {
        self.load_weight
    }

    #[inline]
    pub fn carries(&self, target: TargetId) -> bool {
        self.loaded.contains(&target)
    }

    /// `true` while the driver needs a decision.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.destination.is_none()
    }

    /// Distance (= time) left to the destination.
    #[inline]
    pub fn remaining_distance(&self) -> Option<f64> {
        self.destination.map(|d| self.position.distance(d))
    }

    // ── State machine ─────────────────────────────────────────────────────

    /// Assign the next trip, or wait with `None`.
    ///
    /// Only an idle driver accepts either: mid-trip calls are rejected as
    /// [`Rejection::Busy`] and leave driver and target untouched.  The trip
    /// ends with [`load`](Self::load) or [`unload`](Self::unload).
    ///
    /// An `Unassigned` target is claimed for pickup when its weight fits and
    /// `now + distance` lands inside `start_fork`.  A `Loaded` target this
    /// driver carries is claimed for dropoff when arrival lands inside
    /// `end_fork`.  On success the target moves to its en-route state.
    pub fn set_target(&mut self, target: Option<&mut Target>, now: f64) -> Assignment {
        if self.destination.is_some() {
            return Assignment::Rejected(Rejection::Busy);
        }
        let Some(target) = target else {
            self.clear();
            return Assignment::Cleared;
        };

        match target.state {
            TargetState::Unassigned => {
                if self.load_weight + target.weight > self.max_capacity as i32 {
                    return Assignment::Rejected(Rejection::CapacityExceeded);
                }
                let distance = self.position.distance(target.pickup);
                if !target.start_fork.contains(now + distance) {
                    return Assignment::Rejected(Rejection::OutsideWindow);
                }
                target.state = TargetState::PickupEnRoute;
                self.begin_trip(target.pickup, Order::Picking, target.id);
                Assignment::Assigned { distance }
            }
            TargetState::Loaded => {
                if !self.carries(target.id) {
                    return Assignment::Rejected(Rejection::NotCarried);
                }
                let distance = self.position.distance(target.dropoff);
                if !target.end_fork.contains(now + distance) {
                    return Assignment::Rejected(Rejection::OutsideWindow);
                }
                target.state = TargetState::DropoffEnRoute;
                self.begin_trip(target.dropoff, Order::Dropping, target.id);
                Assignment::Assigned { distance }
            }
            other => Assignment::Rejected(Rejection::Unavailable(other)),
        }
    }

    /// Finish a pickup and end the trip.  The driver must be at the pickup of
    /// the target it is en route to, inside the pickup window.
    pub fn load(&mut self, target: &mut Target, now: f64) -> EntityResult<()> {
        self.check_service(target, Order::Picking, target.pickup)?;
        if !target.start_fork.contains(now) {
            return Err(EntityError::OutsideWindow {
                driver: self.id,
                target: target.id,
                time:   now,
                window: target.start_fork,
            });
        }
        target.state = TargetState::Loaded;
        self.loaded.push(target.id);
        self.load_weight += target.weight;
        self.clear();
        Ok(())
    }

    /// Finish a dropoff.  Mirror image of [`load`](Self::load).
    pub fn unload(&mut self, target: &mut Target, now: f64) -> EntityResult<()> {
        self.check_service(target, Order::Dropping, target.dropoff)?;
        if !target.end_fork.contains(now) {
            return Err(EntityError::OutsideWindow {
                driver: self.id,
                target: target.id,
                time:   now,
                window: target.end_fork,
            });
        }
        let Some(slot) = self.loaded.iter().position(|&t| t == target.id) else {
            return Err(EntityError::NotCarried { driver: self.id, target: target.id });
        };
        self.loaded.remove(slot);
        self.load_weight -= target.weight;
        target.state = TargetState::Delivered;
        self.clear();
        Ok(())
    }

    /// Teleport to `position`.
    #[inline]
    pub fn move_to(&mut self, position: Point) {
        self.position = position;
    }

    /// `[id, x, y, max_capacity, load_count, dest.x, dest.y, order, target]`
    ///
    /// An idle driver reports its own position as destination and target 0.
    pub fn info_vector(&self) -> [f64; Self::INFO_LEN] {
        let dest = self.destination.unwrap_or(self.position);
        [
            self.id.identity() as f64,
            self.position.x,
            self.position.y,
            self.max_capacity as f64,
            self.loaded.len() as f64,
            dest.x,
            dest.y,
            self.order.code() as f64,
            self.target.map_or(0.0, |t| t.identity() as f64),
        ]
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn begin_trip(&mut self, destination: Point, order: Order, target: TargetId) {
        self.destination = Some(destination);
        self.order = order;
        self.target = Some(target);
    }

    fn clear(&mut self) {
        self.destination = None;
        self.order = Order::Idle;
        self.target = None;
    }

    fn check_service(&self, target: &Target, order: Order, location: Point) -> EntityResult<()> {
        if self.order != order || self.target != Some(target.id) {
            return Err(EntityError::NotEnRoute { driver: self.id, target: target.id });
        }
        if self.position.distance(location) > DISTANCE_EPS {
            return Err(EntityError::NotAtLocation { driver: self.id, target: target.id });
        }
        Ok(())
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {} load {}/{}", self.id, self.position, self.load_weight, self.max_capacity)?;
        match (self.destination, self.target) {
            (Some(dest), Some(target)) => write!(f, " → {dest} ({:?} {target})", self.order),
            _ => f.write_str(" idle"),
        }
    }
}
