use darp_core::{DriverId, TargetId, TimeWindow};
use thiserror::Error;

/// Failures of [`Driver::load`](crate::Driver::load) and
/// [`Driver::unload`](crate::Driver::unload).
///
/// These never happen for a correctly scheduled simulation; callers treat
/// them as fatal.
#[derive(Debug, Error, PartialEq)]
pub enum EntityError {
    #[error("{driver} is not en route to {target}")]
    NotEnRoute { driver: DriverId, target: TargetId },

    #[error("{driver} is not at the service location of {target}")]
    NotAtLocation { driver: DriverId, target: TargetId },

    #[error("{driver} reached {target} at {time:.3}, outside its window {window}")]
    OutsideWindow {
        driver: DriverId,
        target: TargetId,
        time:   f64,
        window: TimeWindow,
    },

    #[error("{driver} does not carry {target}")]
    NotCarried { driver: DriverId, target: TargetId },
}

pub type EntityResult<T> = Result<T, EntityError>;
