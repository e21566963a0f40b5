//! `darp-instance`: where the environment's worlds come from.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`instance`]   | `DarpInstance`, `Extremas`                                |
//! | [`benchmark`]  | `BenchmarkInstance`, `read_benchmark`, `write_benchmark`  |
//! | [`generator`]  | `GeneratorParams`, `RandomGenerator`                      |
//! | [`source`]     | `InstanceSource` trait, `FixedInstance`                   |
//! | [`error`]      | `InstanceError`, `InstanceResult<T>`                      |
//!
//! The environment calls [`InstanceSource::generate`] on every reset with its
//! own seeded [`SimRng`](darp_core::SimRng); nothing in this crate touches a
//! global generator.

pub mod benchmark;
pub mod error;
pub mod generator;
pub mod instance;
pub mod source;


pub use benchmark::{
    BenchmarkHeader, BenchmarkInstance, StopRecord, best_known_path, load_benchmark,
    read_benchmark, read_best_known, write_benchmark,
};
pub use error::{InstanceError, InstanceResult};
pub use generator::{GeneratorParams, RandomGenerator};
pub use instance::{DarpInstance, Extremas};
pub use source::{FixedInstance, InstanceSource};
