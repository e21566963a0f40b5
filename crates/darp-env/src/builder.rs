//! Fluent builder for constructing a [`DarSeqEnv`].

use darp_instance::{
    Extremas, FixedInstance, GeneratorParams, InstanceSource, RandomGenerator, load_benchmark,
};
use tracing::debug;

use crate::{DarSeqEnv, EnvConfig, EnvResult, RepresentationKind, RewardFunction, RewardKind};

/// Fluent builder for [`DarSeqEnv<I, R>`].
///
/// # Required inputs
///
/// - [`EnvConfig`]: populations, horizon, step limit, encoding, seed, …
/// - `I: InstanceSource`: where each episode's instance comes from
/// - `R: RewardFunction`: how each step is scored
///
/// [`from_config`](EnvBuilder::from_config) derives both collaborators from
/// the config alone (see the dataset modes on [`EnvConfig`]).
///
/// # Example
///
/// ```rust,ignore
/// let mut env = EnvBuilder::from_config(config)?
///     .reward(DistanceReward)
///     .build()?;
/// let obs = env.reset()?;
/// let step = env.step(1)?;
/// ```
pub struct EnvBuilder<I: InstanceSource, R: RewardFunction> {
    config: EnvConfig,
    source: I,
    reward: R,
}

impl EnvBuilder<Box<dyn InstanceSource>, RewardKind> {
    /// Resolve the instance source and reward strategy named by `config`.
    ///
    /// A dataset is loaded here, once; its populations, horizon, capacity and
    /// size overwrite the config's.
    pub fn from_config(mut config: EnvConfig) -> EnvResult<Self> {
        let source: Box<dyn InstanceSource> = match config.dataset.clone() {
            None => {
                let mut params = GeneratorParams::square(
                    config.size,
                    config.target_population,
                    config.driver_population,
                    config.capacity,
                    config.time_end,
                );
                params.depot = config.depot;
                params.timeless = config.timeless;
                Box::new(RandomGenerator::new(params))
            }
            Some(path) => {
                let bench = load_benchmark(&path)?;
                config.target_population = bench.header.requests;
                config.driver_population = bench.header.vehicles;
                config.capacity = bench.header.capacity;
                config.time_end = bench.time_end();
                config.size = bench.size();
                config.depot = Some(bench.depot_position());
                debug!(path = %path.display(), test_env = config.test_env, "dataset resolved");
                if config.test_env {
                    Box::new(bench)
                } else {
                    Box::new(RandomGenerator::new(GeneratorParams::from_benchmark(
                        &bench,
                        config.timeless,
                    )))
                }
            }
        };
        let reward = config.reward;
        Ok(Self { config, source, reward })
    }
}

impl<R: RewardFunction> EnvBuilder<FixedInstance, R> {
    /// Replay one hand-built instance every episode.  Populations and size in
    /// `config` are taken from the instance.
    pub fn fixed(mut config: EnvConfig, source: FixedInstance, reward: R) -> Self {
        let inst = source.instance();
        config.target_population = inst.targets.len();
        config.driver_population = inst.drivers.len();
        config.time_end = inst.time_end;
        config.size = instance_size(&inst.extremas);
        Self { config, source, reward }
    }
}

impl<I: InstanceSource, R: RewardFunction> EnvBuilder<I, R> {
    pub fn new(config: EnvConfig, source: I, reward: R) -> Self {
        Self { config, source, reward }
    }

    /// Swap the reward strategy.
    pub fn reward<R2: RewardFunction>(self, reward: R2) -> EnvBuilder<I, R2> {
        EnvBuilder { config: self.config, source: self.source, reward }
    }

    /// Swap the instance source.
    pub fn source<I2: InstanceSource>(self, source: I2) -> EnvBuilder<I2, R> {
        EnvBuilder { config: self.config, source, reward: self.reward }
    }

    pub fn max_step(mut self, max_step: u64) -> Self {
        self.config.max_step = max_step;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn representation(mut self, kind: RepresentationKind) -> Self {
        self.config.representation = kind;
        self
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Validate the config and return an environment awaiting its first
    /// [`reset`](DarSeqEnv::reset).
    pub fn build(self) -> EnvResult<DarSeqEnv<I, R>> {
        self.config.validate()?;
        Ok(DarSeqEnv::new(self.config, self.source, self.reward))
    }
}

/// Size of a fixed instance, at least 1.
fn instance_size(extremas: &Extremas) -> f64 {
    extremas.size().max(1.0)
}
