//! `darp-core`: foundational types for the sequential Dial-a-Ride simulation.
//!
//! This crate is a dependency of every other `darp-*` crate.  It has no
//! `darp-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `TargetId`, `DriverId`                                |
//! | [`geo`]         | `Point`, euclidean distance, `float_equality`         |
//! | [`time`]        | `TimeWindow`, `EventTime`, tolerance constants        |
//! | [`rng`]         | `SimRng` (explicitly seeded, per environment)         |
//! | [`error`]       | `DarpError`, `DarpResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{DarpError, DarpResult};
pub use geo::{Point, float_equality};
pub use ids::{DriverId, TargetId};
pub use rng::SimRng;
pub use time::{DISTANCE_EPS, EventTime, TIME_EPS, TimeWindow};
