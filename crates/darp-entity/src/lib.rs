//! `darp-entity`: the two passive entity types of the DARP simulation.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`target`]  | `Target`, `TargetState` (5-state request lifecycle)        |
//! | [`driver`]  | `Driver`, `Order`, `Assignment`, `Rejection`               |
//! | [`error`]   | `EntityError`, `EntityResult<T>`                           |
//!
//! # Request lifecycle
//!
//! ```text
//!  Unassigned ──set_target──▶ PickupEnRoute ──load──▶ Loaded
//!      (-2)                       (-1)                  (0)
//!                                                        │ set_target
//!  Delivered ◀──────unload────── DropoffEnRoute ◀────────┘
//!     (2)                            (0)
//! ```
//!
//! Code `1` is never reported; count vectors keep its bucket for symmetry.
//!
//! A target's state only changes through the [`Driver`] operations, which
//! keeps the driver's load and the target's state consistent: a target is in
//! exactly one load iff it is `Loaded` or `DropoffEnRoute`.

pub mod driver;
pub mod error;
pub mod target;


pub use driver::{Assignment, Driver, Order, Rejection};
pub use error::{EntityError, EntityResult};
pub use target::{Target, TargetState};
