//! What an action did.

use std::fmt;

/// Result of applying one action for the current driver.
///
/// Rejections consume the turn but leave the world untouched.  Their
/// [`value`](Self::value) is a distinct negative code that reward functions
/// may key on.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionOutcome {
    /// A trip was committed; `distance` is its length.
    Committed { distance: f64 },
    /// Action `0`: the driver stays where it is until the next event.
    Waited,
    /// The action is neither `0` nor a target index.
    OutOfRange,
    /// The target was already delivered.
    AlreadyDelivered,
    /// Pickup refused: the vehicle is full or arrival misses the pickup window.
    CannotLoad,
    /// Dropoff refused: the driver does not carry the target or arrival
    /// misses the dropoff window.
    NotCarried,
    /// Another trip is already heading for this target.
    AlreadyHandled,
}

impl ActionOutcome {
    /// Raw outcome value: the committed distance (`0` for waiting) or a
    /// negative rejection code.
    pub fn value(self) -> f64 {
        match self {
            ActionOutcome::Committed { distance } => distance,
            ActionOutcome::Waited           => 0.0,
            ActionOutcome::OutOfRange       => -2.0,
            ActionOutcome::AlreadyDelivered => -3.0,
            ActionOutcome::CannotLoad       => -4.0,
            ActionOutcome::NotCarried       => -5.0,
            ActionOutcome::AlreadyHandled   => -6.0,
        }
    }

    /// `true` for committed trips and waiting: the turn passes to the next
    /// driver.
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, ActionOutcome::Committed { .. } | ActionOutcome::Waited)
    }

    /// Distance added to the episode total.
    #[inline]
    pub fn distance(self) -> f64 {
        match self {
            ActionOutcome::Committed { distance } => distance,
            _ => 0.0,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            ActionOutcome::Committed { .. } => "trip committed",
            ActionOutcome::Waited           => "waiting for the next event",
            ActionOutcome::OutOfRange       => "action out of range",
            ActionOutcome::AlreadyDelivered => "aimed target already delivered",
            ActionOutcome::CannotLoad       => "cannot pick up: vehicle full or pickup window missed",
            ActionOutcome::NotCarried       => "cannot drop off: not carried or dropoff window missed",
            ActionOutcome::AlreadyHandled   => "target already being handled",
        }
    }
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionOutcome::Committed { distance } => write!(f, "{} ({distance:.3})", self.describe()),
            other => f.write_str(other.describe()),
        }
    }
}
