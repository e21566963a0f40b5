//! `DarSeqEnv` and its turn loop.

use darp_core::{DISTANCE_EPS, DriverId, Point, SimRng, TargetId, float_equality};
use darp_entity::{Assignment, Driver, Order, Rejection, Target, TargetState};
use darp_instance::InstanceSource;
use tracing::{debug, info, trace};

use crate::clock::EventClock;
use crate::context::targets_states;
use crate::observation::{self, Observation, block_len};
use crate::{ActionOutcome, EnvConfig, EnvContext, EnvError, EnvResult, RewardFunction};

// ── Step ──────────────────────────────────────────────────────────────────────

/// Everything [`DarSeqEnv::step`] reports.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub observation: Observation,
    pub reward:      f64,
    pub done:        bool,
    /// What the action did; its [`value`](ActionOutcome::value) is what the
    /// reward function scored.
    pub outcome:     ActionOutcome,
    pub info:        StepInfo,
}

/// Diagnostics attached to every step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StepInfo {
    pub delivered:    usize,
    /// Optimality gap in percent, or the `300.0` sentinel.
    pub gap:          f64,
    pub fit_solution: bool,
}

// ── Episode ───────────────────────────────────────────────────────────────────

/// Mutable state of one episode, replaced wholesale on reset.
struct Episode {
    depot:             Point,
    time_end:          f64,
    targets:           Vec<Target>,
    drivers:           Vec<Driver>,
    clock:             EventClock,
    current_player:    DriverId,
    /// Drivers awaiting a decision; popped from the back.
    next_players:      Vec<DriverId>,
    current_step:      u64,
    total_distance:    f64,
    cumulative_reward: f64,
    last_outcome:      Option<ActionOutcome>,
    last_aim:          Option<TargetId>,
}

impl Episode {
    fn context(&self, max_step: u64, max_reward: f64, best_known: Option<f64>) -> EnvContext<'_> {
        EnvContext {
            time: self.clock.now(),
            time_end: self.time_end,
            step: self.current_step,
            max_step,
            current_player: self.current_player,
            depot: self.depot,
            targets: &self.targets,
            drivers: &self.drivers,
            total_distance: self.total_distance,
            max_reward,
            best_known,
        }
    }

    fn is_done(&self, max_step: u64) -> bool {
        self.targets.iter().all(Target::is_delivered)
            || self.current_step >= max_step
            || self.clock.now() >= self.time_end
    }

    // ── Action ────────────────────────────────────────────────────────────

    fn take_action(&mut self, action: usize) -> EnvResult<ActionOutcome> {
        let now = self.clock.now();
        let driver = &mut self.drivers[self.current_player.index()];
        if action == 0 {
            return match driver.set_target(None, now) {
                Assignment::Cleared => Ok(ActionOutcome::Waited),
                _ => Err(EnvError::InvariantViolated(format!(
                    "acting {} cannot wait mid-trip", driver.id
                ))),
            };
        }
        let Some(target) = self.targets.get_mut(action - 1) else {
            return Ok(ActionOutcome::OutOfRange);
        };
        self.last_aim = Some(target.id);

        let state = target.state();
        match driver.set_target(Some(target), now) {
            Assignment::Assigned { distance } => {
                self.clock.schedule(driver.id, now + distance);
                Ok(ActionOutcome::Committed { distance })
            }
            Assignment::Rejected(rejection) => rejection_outcome(rejection, state).ok_or_else(|| {
                EnvError::InvariantViolated(format!(
                    "acting {} still has a trip in progress", driver.id
                ))
            }),
            Assignment::Cleared => Err(EnvError::InvariantViolated(
                "assignment to a target cleared the trip".into(),
            )),
        }
    }

    // ── Clock ─────────────────────────────────────────────────────────────

    /// Advance from event to event until some driver needs a decision, then
    /// queue every idle driver in ascending id order.
    fn run_clock(&mut self) -> EnvResult<()> {
        while self.next_players.is_empty() {
            let event = self.clock.next_event().unwrap_or(self.time_end);
            let gap = self.clock.advance_to(event);
            let now = self.clock.now();
            let due = self.clock.drain_due();
            debug!(time = now, gap, arrivals = due.len(), "clock advanced");

            for slot in 0..self.drivers.len() {
                let id = self.drivers[slot].id;
                if due.binary_search(&id).is_ok() {
                    self.arrive(id, gap, now)?;
                } else {
                    self.travel(slot, gap)?;
                }
            }
            self.next_players
                .extend(self.drivers.iter().filter(|d| d.is_idle()).map(|d| d.id));
        }
        Ok(())
    }

    fn arrive(&mut self, id: DriverId, gap: f64, now: f64) -> EnvResult<()> {
        let driver = &mut self.drivers[id.index()];
        let (Some(destination), Some(target_id)) = (driver.destination(), driver.target()) else {
            return Err(EnvError::InvariantViolated(format!("{id} arrived without a trip")));
        };
        let remaining = driver.position().distance(destination);
        if !float_equality(remaining, gap, DISTANCE_EPS) {
            return Err(EnvError::InvariantViolated(format!(
                "{id} arrives after {gap:.6} with {remaining:.6} still to go"
            )));
        }
        driver.move_to(destination);

        let target = &mut self.targets[target_id.index()];
        match driver.order() {
            Order::Picking => driver.load(target, now)?,
            Order::Dropping => driver.unload(target, now)?,
            Order::Idle => {
                return Err(EnvError::InvariantViolated(format!("{id} arrived while idle")));
            }
        }
        trace!(driver = %id, target = %target_id, state = %target.state(), time = now, "arrival");
        Ok(())
    }

    /// Move a travelling driver `gap` along its straight line.
    fn travel(&mut self, slot: usize, gap: f64) -> EnvResult<()> {
        let driver = &mut self.drivers[slot];
        let Some(destination) = driver.destination() else {
            return Ok(());
        };
        if gap <= 0.0 {
            return Ok(());
        }
        let from = driver.position();
        let remaining = from.distance(destination);
        if gap > remaining + DISTANCE_EPS {
            return Err(EnvError::InvariantViolated(format!(
                "{} would overshoot: gap {gap:.6}, remaining {remaining:.6}", driver.id
            )));
        }
        let fraction = if remaining > 0.0 { (gap / remaining).min(1.0) } else { 1.0 };
        let to = from.lerp(destination, fraction);
        let covered = from.distance(to);
        if !float_equality(covered, gap, DISTANCE_EPS) {
            return Err(EnvError::InvariantViolated(format!(
                "{} covered {covered:.6} in {gap:.6} time", driver.id
            )));
        }
        driver.move_to(to);
        Ok(())
    }
}

/// Map a driver's refusal onto the action outcome.  `None` for refusals the
/// acting driver can never produce.
fn rejection_outcome(rejection: Rejection, state: TargetState) -> Option<ActionOutcome> {
    Some(match rejection {
        Rejection::Unavailable(TargetState::Delivered) => ActionOutcome::AlreadyDelivered,
        Rejection::Unavailable(_) => ActionOutcome::AlreadyHandled,
        Rejection::CapacityExceeded => ActionOutcome::CannotLoad,
        Rejection::OutsideWindow if state == TargetState::Unassigned => ActionOutcome::CannotLoad,
        Rejection::OutsideWindow | Rejection::NotCarried => ActionOutcome::NotCarried,
        Rejection::Busy => return None,
    })
}

// ── DarSeqEnv ─────────────────────────────────────────────────────────────────

/// The sequential dial-a-ride environment.
///
/// Drivers take turns: each [`step`](Self::step) applies one action for the
/// current driver.  When nobody else is waiting for a decision, simulated time
/// jumps from event to event (arrivals and window boundaries) until some
/// driver is free again.
///
/// Create via [`EnvBuilder`](crate::EnvBuilder), then call
/// [`reset`](Self::reset) before the first step.
pub struct DarSeqEnv<I: InstanceSource, R: RewardFunction> {
    pub config:      EnvConfig,
    source:          I,
    reward_fn:       R,
    rng:             SimRng,
    episode:         Option<Episode>,
    best_known:      Option<f64>,
    /// Finished episodes.
    current_episode: u64,
}

impl<I: InstanceSource, R: RewardFunction> DarSeqEnv<I, R> {
    pub(crate) fn new(config: EnvConfig, source: I, reward_fn: R) -> Self {
        Self {
            rng: SimRng::new(config.seed),
            config,
            source,
            reward_fn,
            episode: None,
            best_known: None,
            current_episode: 0,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Start a new episode on a fresh instance and return its first
    /// observation.  Driver 1 acts first.
    pub fn reset(&mut self) -> EnvResult<Observation> {
        let instance = self.source.generate(&mut self.rng)?;
        instance.validate()?;
        self.best_known = self.source.best_known_cost();

        let driver_count = instance.drivers.len();
        info!(
            episode = self.current_episode,
            targets = instance.targets.len(),
            drivers = driver_count,
            best_known = ?self.best_known,
            "reset"
        );
        self.episode = Some(Episode {
            depot:             instance.depot,
            time_end:          instance.time_end,
            clock:             EventClock::new(driver_count, instance.window_boundaries()),
            targets:           instance.targets,
            drivers:           instance.drivers,
            current_player:    DriverId(0),
            next_players:      (1..driver_count as u32).map(DriverId).collect(),
            current_step:      0,
            total_distance:    0.0,
            cumulative_reward: 0.0,
            last_outcome:      None,
            last_aim:          None,
        });
        self.observation()
    }

    /// Apply `action` for the current driver.
    ///
    /// `0` waits, `1..=T` aims at target `action - 1` (pickup or dropoff
    /// depending on its state).  Anything else is rejected as out of range.
    pub fn step(&mut self, action: usize) -> EnvResult<Step> {
        let max_step = self.config.max_step;
        let max_reward = self.config.max_reward();
        let ep = self.episode.as_mut().ok_or(EnvError::NotReset)?;

        let outcome = ep.take_action(action)?;
        ep.current_step += 1;
        ep.last_outcome = Some(outcome);

        if outcome.is_success() {
            if ep.next_players.is_empty() {
                ep.run_clock()?;
            }
            ep.current_player = ep.next_players.pop().ok_or_else(|| {
                EnvError::InvariantViolated("no driver awaits a decision".into())
            })?;
            ep.total_distance += outcome.distance();
        }

        let done = ep.is_done(max_step);
        let ctx = ep.context(max_step, max_reward, self.best_known);
        let reward = self.reward_fn.compute(outcome, done, &ctx);
        let observation = observation::encode(self.config.representation, &ctx);
        let step_info = StepInfo {
            delivered:    ctx.delivered(),
            gap:          ctx.gap(),
            fit_solution: ctx.is_fit_solution(),
        };
        ep.cumulative_reward += reward;

        debug!(
            step = ep.current_step,
            action,
            %outcome,
            reward,
            time = ep.clock.now(),
            player = ep.current_player.identity(),
            "step"
        );
        if done {
            info!(
                episode = self.current_episode,
                steps = ep.current_step,
                delivered = step_info.delivered,
                total_distance = ep.total_distance,
                cumulative_reward = ep.cumulative_reward,
                gap = step_info.gap,
                "episode finished"
            );
            self.current_episode += 1;
        }

        Ok(Step { observation, reward, done, outcome, info: step_info })
    }

    /// Encode the current state.  Pure: repeated calls agree.
    pub fn observation(&self) -> EnvResult<Observation> {
        let ctx = self.context().ok_or(EnvError::NotReset)?;
        Ok(observation::encode(self.config.representation, &ctx))
    }

    /// Read-only view of the running episode.
    pub fn context(&self) -> Option<EnvContext<'_>> {
        self.episode
            .as_ref()
            .map(|ep| ep.context(self.config.max_step, self.config.max_reward(), self.best_known))
    }

    /// Human-readable dump of the episode.
    pub fn render(&self) -> String {
        let Some(ep) = &self.episode else {
            return String::from("environment not reset\n");
        };
        let verdict = match ep.last_outcome {
            Some(o) if !o.is_success() => "go lost",
            _ => "aimed right",
        };
        let next: Vec<u32> = ep.next_players.iter().map(|d| d.identity()).collect();
        let last_aim = ep.last_aim.map_or_else(|| "-".to_string(), |t| t.identity().to_string());
        let log = ep.last_outcome.map_or("episode start", ActionOutcome::describe);
        format!(
            "--------------------- [Step {step}]\n\
             Player {player} {verdict}\n\
             Current time: {time:.3} / {time_end}\n\
             Next players: {next:?}\n\
             Last aimed at: {last_aim}\n\
             Targets by state: {states:?}\n\
             Cumulative reward: {reward:.3}\n\
             Cumulative distance: {distance:.3}\n\
             Info: {log}\n\
             GAP to best known: {gap:.2}\n\
             Fit solution: {fit}\n\
             ---------------------\n",
            step = ep.current_step,
            player = ep.current_player.identity(),
            time = ep.clock.now(),
            time_end = ep.time_end,
            states = targets_states(&ep.targets),
            reward = ep.cumulative_reward,
            distance = ep.total_distance,
            gap = self.gap(),
            fit = self.is_fit_solution(),
        )
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// Per-state target counts by code `-2..=2`; all zero before the first
    /// reset.  The slot for code `1` is always 0.
    pub fn targets_states(&self) -> [usize; 5] {
        self.episode.as_ref().map_or([0; 5], |ep| targets_states(&ep.targets))
    }

    /// Optimality gap in percent against the best known cost, or `300.0`.
    pub fn gap(&self) -> f64 {
        self.context().map_or(crate::GAP_SENTINEL, |ctx| ctx.gap())
    }

    pub fn is_fit_solution(&self) -> bool {
        self.context().is_some_and(|ctx| ctx.is_fit_solution())
    }

    pub fn is_done(&self) -> bool {
        self.episode.as_ref().is_some_and(|ep| ep.is_done(self.config.max_step))
    }

    /// Number of discrete actions: wait plus one per target.
    pub fn action_space_size(&self) -> usize {
        self.target_population() + 1
    }

    /// Length of a `Block` observation.
    pub fn observation_len(&self) -> usize {
        block_len(self.target_population(), self.driver_population())
    }

    pub fn target_population(&self) -> usize {
        self.episode
            .as_ref()
            .map_or(self.config.target_population, |ep| ep.targets.len())
    }

    pub fn driver_population(&self) -> usize {
        self.episode
            .as_ref()
            .map_or(self.config.driver_population, |ep| ep.drivers.len())
    }

    pub fn time(&self) -> f64 {
        self.episode.as_ref().map_or(0.0, |ep| ep.clock.now())
    }

    pub fn current_player(&self) -> Option<DriverId> {
        self.episode.as_ref().map(|ep| ep.current_player)
    }

    pub fn next_players(&self) -> &[DriverId] {
        self.episode.as_ref().map(|ep| ep.next_players.as_slice()).unwrap_or(&[])
    }

    pub fn current_step(&self) -> u64 {
        self.episode.as_ref().map_or(0, |ep| ep.current_step)
    }

    pub fn total_distance(&self) -> f64 {
        self.episode.as_ref().map_or(0.0, |ep| ep.total_distance)
    }

    pub fn cumulative_reward(&self) -> f64 {
        self.episode.as_ref().map_or(0.0, |ep| ep.cumulative_reward)
    }

    pub fn last_aim(&self) -> Option<TargetId> {
        self.episode.as_ref().and_then(|ep| ep.last_aim)
    }

    /// Number of episodes that have reached `done`.
    pub fn episode_count(&self) -> u64 {
        self.current_episode
    }

    pub fn targets(&self) -> &[Target] {
        self.episode.as_ref().map(|ep| ep.targets.as_slice()).unwrap_or(&[])
    }

    pub fn drivers(&self) -> &[Driver] {
        self.episode.as_ref().map(|ep| ep.drivers.as_slice()).unwrap_or(&[])
    }

    pub fn best_known(&self) -> Option<f64> {
        self.best_known
    }

    pub fn max_reward(&self) -> f64 {
        self.config.max_reward()
    }

    pub fn source(&self) -> &I {
        &self.source
    }

    pub fn reward_fn(&self) -> &R {
        &self.reward_fn
    }
}
