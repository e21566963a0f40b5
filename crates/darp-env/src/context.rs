//! Read-only environment state handed to reward functions and encoders.

use darp_core::{DriverId, Point};
use darp_entity::{Driver, Target};

/// Sentinel reported when the optimality gap is undefined.
pub const GAP_SENTINEL: f64 = 300.0;

/// A read-only snapshot of one episode.
///
/// Built by the environment after an action has been applied and the clock
/// has run.  Nothing reachable from here can mutate the episode.
#[derive(Copy, Clone, Debug)]
pub struct EnvContext<'a> {
    pub time:           f64,
    pub time_end:       f64,
    pub step:           u64,
    pub max_step:       u64,
    /// The driver that acts next.
    pub current_player: DriverId,
    pub depot:          Point,
    pub targets:        &'a [Target],
    pub drivers:        &'a [Driver],
    pub total_distance: f64,
    /// `⌊1.5 · size⌋` of the instance.
    pub max_reward:     f64,
    pub best_known:     Option<f64>,
}

impl<'a> EnvContext<'a> {
    /// Per-state target counts, indexed by [`TargetState::bucket`].
    pub fn targets_states(&self) -> [usize; 5] {
        targets_states(self.targets)
    }

    pub fn delivered(&self) -> usize {
        self.targets.iter().filter(|t| t.is_delivered()).count()
    }

    /// All requests served.
    #[inline]
    pub fn is_fit_solution(&self) -> bool {
        self.delivered() == self.targets.len()
    }

    /// Optimality gap in percent, or [`GAP_SENTINEL`].
    pub fn gap(&self) -> f64 {
        gap_percent(self.total_distance, self.best_known).unwrap_or(GAP_SENTINEL)
    }
}

/// Per-state counts for `targets`.
pub fn targets_states(targets: &[Target]) -> [usize; 5] {
    let mut counts = [0; 5];
    for t in targets {
        counts[t.state().bucket()] += 1;
    }
    counts
}

/// `100 · (total - best) / best`; undefined without a positive best cost.
pub fn gap_percent(total: f64, best: Option<f64>) -> Option<f64> {
    best.filter(|&b| b > 0.0).map(|b| 100.0 * (total - b) / b)
}
