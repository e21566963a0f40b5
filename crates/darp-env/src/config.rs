//! Environment configuration.

use std::path::PathBuf;

use darp_core::Point;

use crate::{EnvError, EnvResult, RepresentationKind, RewardKind};

/// Everything needed to build a [`DarSeqEnv`](crate::DarSeqEnv) from
/// [`EnvBuilder::from_config`](crate::EnvBuilder::from_config).
///
/// # Dataset modes
///
/// | `dataset` | `test_env` | Instances                                          |
/// |-----------|------------|----------------------------------------------------|
/// | `None`    | -          | random, inside `[-size, size]²`                    |
/// | `Some`    | `true`     | the benchmark file itself, every episode           |
/// | `Some`    | `false`    | random, shaped like the benchmark file             |
///
/// With a dataset, the file's populations, horizon, capacity and size
/// override the corresponding fields here.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EnvConfig {
    /// Half-width of the random instance square.
    pub size:              f64,
    pub target_population: usize,
    pub driver_population: usize,
    /// Seats per vehicle for random instances.
    pub capacity:          u32,
    pub time_end:          f64,
    pub max_step:          u64,
    /// Random instances get horizon-wide windows.
    pub timeless:          bool,
    pub representation:    RepresentationKind,
    pub reward:            RewardKind,
    /// Root seed of the environment's instance RNG.
    pub seed:              u64,
    /// Fixed depot for random instances; `None` draws one per episode.
    pub depot:             Option<Point>,
    pub dataset:           Option<PathBuf>,
    pub test_env:          bool,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            size:              4.0,
            target_population: 2,
            driver_population: 2,
            capacity:          3,
            time_end:          1_400.0,
            max_step:          10,
            timeless:          false,
            representation:    RepresentationKind::Block,
            reward:            RewardKind::Distance,
            seed:              0,
            depot:             None,
            dataset:           None,
            test_env:          false,
        }
    }
}

impl EnvConfig {
    pub fn validate(&self) -> EnvResult<()> {
        if !(self.size > 0.0) {
            return Err(EnvError::Config(format!("size must be positive, got {}", self.size)));
        }
        if self.driver_population == 0 {
            return Err(EnvError::Config("driver_population must be at least 1".into()));
        }
        if self.capacity == 0 {
            return Err(EnvError::Config("capacity must be at least 1".into()));
        }
        if !(self.time_end > 0.0) {
            return Err(EnvError::Config(format!(
                "time_end must be positive, got {}", self.time_end
            )));
        }
        if self.max_step == 0 {
            return Err(EnvError::Config("max_step must be at least 1".into()));
        }
        if self.test_env && self.dataset.is_none() {
            return Err(EnvError::Config("test_env requires a dataset".into()));
        }
        Ok(())
    }

    /// `⌊1.5 · size⌋`.
    #[inline]
    pub fn max_reward(&self) -> f64 {
        (1.5 * self.size).floor()
    }
}
