//! Pluggable reward strategies.
//!
//! | Strategy                       | Committed trip      | Wait | Rejection     | On `done`                         |
//! |--------------------------------|---------------------|------|---------------|-----------------------------------|
//! | [`ConstantReward`]             | `+1`                | `0`  | `-1`          | -                                 |
//! | [`ConstantDistributionReward`] | `+1`                | `0`  | `-1`          | `+max_reward · delivered / T`     |
//! | [`DistanceReward`]             | `max_reward - dist` | `0`  | `-max_reward` | -                                 |
//!
//! [`RewardKind`] names the built-in strategies for configuration files and
//! itself implements [`RewardFunction`] by dispatch.

use crate::{ActionOutcome, EnvContext};

/// Scores one step.
///
/// `ctx` reflects the state *after* the action was applied and the clock has
/// run.  Implementations must be deterministic given their inputs.
pub trait RewardFunction: Send + Sync {
    fn compute(&self, outcome: ActionOutcome, done: bool, ctx: &EnvContext<'_>) -> f64;
}

// ── Built-in strategies ───────────────────────────────────────────────────────

/// `+1` per committed trip, `-1` per rejection.
#[derive(Copy, Clone, Debug, Default)]
pub struct ConstantReward;

impl RewardFunction for ConstantReward {
    fn compute(&self, outcome: ActionOutcome, _done: bool, _ctx: &EnvContext<'_>) -> f64 {
        constant(outcome)
    }
}

/// [`ConstantReward`] plus an end-of-episode bonus proportional to the share
/// of delivered requests.
#[derive(Copy, Clone, Debug, Default)]
pub struct ConstantDistributionReward;

impl RewardFunction for ConstantDistributionReward {
    fn compute(&self, outcome: ActionOutcome, done: bool, ctx: &EnvContext<'_>) -> f64 {
        let mut reward = constant(outcome);
        if done && !ctx.targets.is_empty() {
            reward += ctx.max_reward * ctx.delivered() as f64 / ctx.targets.len() as f64;
        }
        reward
    }
}

/// Linear in the committed distance: short trips pay more.
#[derive(Copy, Clone, Debug, Default)]
pub struct DistanceReward;

impl RewardFunction for DistanceReward {
    fn compute(&self, outcome: ActionOutcome, _done: bool, ctx: &EnvContext<'_>) -> f64 {
        match outcome {
            ActionOutcome::Committed { distance } => ctx.max_reward - distance,
            ActionOutcome::Waited => 0.0,
            _ => -ctx.max_reward,
        }
    }
}

fn constant(outcome: ActionOutcome) -> f64 {
    match outcome {
        ActionOutcome::Committed { .. } => 1.0,
        ActionOutcome::Waited => 0.0,
        _ => -1.0,
    }
}

// ── RewardKind ────────────────────────────────────────────────────────────────

/// The built-in strategies as a closed, configurable set.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RewardKind {
    Constant,
    ConstantDistribution,
    #[default]
    Distance,
}

impl RewardKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "constant" | "constantreward" => Some(RewardKind::Constant),
            "constantdistribution" | "constantdistributionreward" => {
                Some(RewardKind::ConstantDistribution)
            }
            "distance" | "distancereward" => Some(RewardKind::Distance),
            _ => None,
        }
    }
}

impl RewardFunction for RewardKind {
    fn compute(&self, outcome: ActionOutcome, done: bool, ctx: &EnvContext<'_>) -> f64 {
        match self {
            RewardKind::Constant => ConstantReward.compute(outcome, done, ctx),
            RewardKind::ConstantDistribution => ConstantDistributionReward.compute(outcome, done, ctx),
            RewardKind::Distance => DistanceReward.compute(outcome, done, ctx),
        }
    }
}
