//! The `InstanceSource` seam between the environment and instance providers.

use darp_core::SimRng;

use crate::{BenchmarkInstance, DarpInstance, InstanceResult, RandomGenerator};

/// Produces the instance for each new episode.
///
/// Implementations must draw all randomness from `rng` so episodes are
/// reproducible from the environment's seed.
pub trait InstanceSource: Send {
    fn generate(&self, rng: &mut SimRng) -> InstanceResult<DarpInstance>;

    /// Best known total distance for the instances this source produces.
    /// Only meaningful when every episode sees the same instance.
    fn best_known_cost(&self) -> Option<f64> {
        None
    }
}

impl InstanceSource for RandomGenerator {
    fn generate(&self, rng: &mut SimRng) -> InstanceResult<DarpInstance> {
        RandomGenerator::generate(self, rng)
    }
}

/// Replays the benchmark itself on every reset.
impl InstanceSource for BenchmarkInstance {
    fn generate(&self, _rng: &mut SimRng) -> InstanceResult<DarpInstance> {
        Ok(self.to_instance())
    }

    fn best_known_cost(&self) -> Option<f64> {
        self.best_known
    }
}

impl<S: InstanceSource + ?Sized> InstanceSource for Box<S> {
    fn generate(&self, rng: &mut SimRng) -> InstanceResult<DarpInstance> {
        (**self).generate(rng)
    }

    fn best_known_cost(&self) -> Option<f64> {
        (**self).best_known_cost()
    }
}

/// A hand-built instance, cloned fresh on every reset.
#[derive(Clone, Debug)]
pub struct FixedInstance {
    instance:   DarpInstance,
    best_known: Option<f64>,
}

impl FixedInstance {
    pub fn new(instance: DarpInstance) -> Self {
        Self { instance, best_known: None }
    }

    pub fn with_best_known(mut self, cost: f64) -> Self {
        self.best_known = Some(cost);
        self
    }

    pub fn instance(&self) -> &DarpInstance {
        &self.instance
    }
}

impl InstanceSource for FixedInstance {
    fn generate(&self, _rng: &mut SimRng) -> InstanceResult<DarpInstance> {
        Ok(self.instance.clone())
    }

    fn best_known_cost(&self) -> Option<f64> {
        self.best_known
    }
}
