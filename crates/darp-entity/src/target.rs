//! Transport requests.

use std::fmt;

use darp_core::{Point, TargetId, TimeWindow};

/// Where a request is in its lifecycle.
///
/// The numeric [`code`](Self::code) is what observations carry.  Code `1` is
/// reserved: a request on its way to the dropoff still reports `0`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetState {
    /// Waiting for a driver to claim the pickup.
    #[default]
    Unassigned,
    /// Claimed; a driver is travelling to the pickup.
    PickupEnRoute,
    /// In a vehicle, waiting for its driver to head for the dropoff.
    Loaded,
    /// In a vehicle that is travelling to the dropoff.
    DropoffEnRoute,
    /// Terminal.
    Delivered,
}

impl TargetState {
    /// All states in lifecycle order.
    pub const ALL: [TargetState; 5] = [
        TargetState::Unassigned,
        TargetState::PickupEnRoute,
        TargetState::Loaded,
        TargetState::DropoffEnRoute,
        TargetState::Delivered,
    ];

    /// Numeric state code in `-2..=2`; never `1`.
    #[inline]
    pub fn code(self) -> i8 {
        match self {
            TargetState::Unassigned     => -2,
            TargetState::PickupEnRoute  => -1,
            TargetState::Loaded         => 0,
            TargetState::DropoffEnRoute => 0,
            TargetState::Delivered      => 2,
        }
    }

    /// Bucket index in a state count vector (`code + 2`); bucket 3 stays
    /// empty.
    #[inline]
    pub fn bucket(self) -> usize {
        (self.code() + 2) as usize
    }

    /// `true` while the request sits in some driver's load.
    #[inline]
    pub fn in_vehicle(self) -> bool {
        matches!(self, TargetState::Loaded | TargetState::DropoffEnRoute)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TargetState::Unassigned     => "unassigned",
            TargetState::PickupEnRoute  => "pickup-en-route",
            TargetState::Loaded         => "loaded",
            TargetState::DropoffEnRoute => "dropoff-en-route",
            TargetState::Delivered      => "delivered",
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pickup/dropoff request.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Target {
    pub id:           TargetId,
    pub pickup:       Point,
    pub dropoff:      Point,
    /// Service duration at each stop.  Carried for the benchmark format; the
    /// movement model does not consume it.
    pub service_time: f64,
    /// Seats taken while on board.
    pub weight:       i32,
    /// Window in which the pickup may happen.
    pub start_fork:   TimeWindow,
    /// Window in which the dropoff may happen.
    pub end_fork:     TimeWindow,
    pub(crate) state: TargetState,
}

impl Target {
    /// Length of [`info_vector`](Self::info_vector).
    pub const INFO_LEN: usize = 11;

    /// A fresh, unassigned request.
    pub fn new(
        id:           TargetId,
        pickup:       Point,
        dropoff:      Point,
        service_time: f64,
        weight:       i32,
        start_fork:   TimeWindow,
        end_fork:     TimeWindow,
    ) -> Self {
        Self {
            id,
            pickup,
            dropoff,
            service_time,
            weight,
            start_fork,
            end_fork,
            state: TargetState::Unassigned,
        }
    }

    #[inline]
    pub fn state(&self) -> TargetState {
        self.state
    }

    #[inline]
    pub fn is_delivered(&self) -> bool {
        self.state == TargetState::Delivered
    }

    /// `[id, pickup.x, pickup.y, dropoff.x, dropoff.y, start_fork.start,
    /// start_fork.end, end_fork.start, end_fork.end, weight, state]`
    pub fn info_vector(&self) -> [f64; Self::INFO_LEN] {
        [
            self.id.identity() as f64,
            self.pickup.x,
            self.pickup.y,
            self.dropoff.x,
            self.dropoff.y,
            self.start_fork.start,
            self.start_fork.end,
            self.end_fork.start,
            self.end_fork.end,
            self.weight as f64,
            self.state.code() as f64,
        ]
    }

    /// The four fork bounds, pickup window first.
    #[inline]
    pub fn fork_bounds(&self) -> [f64; 4] {
        [
            self.start_fork.start,
            self.start_fork.end,
            self.end_fork.start,
            self.end_fork.end,
        ]
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} → {} w={} pickup {} dropoff {}",
            self.id, self.state, self.pickup, self.dropoff, self.weight, self.start_fork, self.end_fork,
        )
    }
}
