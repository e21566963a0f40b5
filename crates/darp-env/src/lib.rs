//! `darp-env`: the sequential dial-a-ride environment.
//!
//! # Turn loop
//!
//! ```text
//! reset():
//!   instance ← InstanceSource::generate(rng)
//!   current = driver 1, queue = [2..=D], time = 0
//!
//! step(action):
//!   ① Act     : 0 waits; 1..=T aims at a target (pickup or dropoff by state);
//!                anything infeasible yields a negative ActionOutcome.
//!   ② Clock   : on success with an empty queue: jump event to event
//!                (arrivals, window boundaries), moving drivers and serving
//!                stops, until some driver is idle; queue idle drivers.
//!   ③ Turn    : on success pop the next driver and add the trip distance.
//!   ④ Score   : done = all delivered ∨ step ≥ max_step ∨ time ≥ time_end;
//!                reward = RewardFunction::compute(outcome, done, &ctx).
//!   ⑤ Encode  : observation per RepresentationKind.
//! ```
//!
//! # Cargo features
//!
//! | Feature | Effect                                                        |
//! |---------|---------------------------------------------------------------|
//! | `serde` | `Serialize`/`Deserialize` on configs, outcomes, observations. |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use darp_env::{EnvBuilder, EnvConfig};
//!
//! let mut env = EnvBuilder::from_config(EnvConfig::default())?.build()?;
//! let mut obs = env.reset()?;
//! loop {
//!     let step = env.step(1)?;
//!     obs = step.observation;
//!     if step.done { break; }
//! }
//! ```

pub mod builder;
pub mod clock;
pub mod config;
pub mod context;
pub mod env;
pub mod error;
pub mod observation;
pub mod outcome;
pub mod reward;

#[cfg(test)]
mod tests;

pub use builder::EnvBuilder;
pub use clock::EventClock;
pub use config::EnvConfig;
pub use context::{EnvContext, GAP_SENTINEL, gap_percent};
pub use env::{DarSeqEnv, Step, StepInfo};
pub use error::{EnvError, EnvResult};
pub use observation::{
    DictDriver, DictObservation, DictTarget, DictWorld, Observation, Positions,
    RepresentationKind, StructuredObservation, Times, block_len, encode,
};
pub use outcome::ActionOutcome;
pub use reward::{
    ConstantDistributionReward, ConstantReward, DistanceReward, RewardFunction, RewardKind,
};
