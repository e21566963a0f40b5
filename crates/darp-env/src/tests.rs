//! Unit and scenario tests for darp-env.

use darp_core::{DriverId, Point, TargetId, TimeWindow};
use darp_entity::{Driver, Target, TargetState};
use darp_instance::{DarpInstance, Extremas, FixedInstance, InstanceSource};

use crate::{
    ActionOutcome, ConstantDistributionReward, ConstantReward, DarSeqEnv, DistanceReward,
    EnvBuilder, EnvConfig, EnvContext, EnvError, EventClock, Observation, RepresentationKind,
    RewardFunction, RewardKind,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const ORIGIN: Point = Point::new(0.0, 0.0);

fn window(start: f64, end: f64) -> TimeWindow {
    TimeWindow::new(start, end)
}

fn target(id: u32, pickup: Point, dropoff: Point, start: TimeWindow, end: TimeWindow) -> Target {
    Target::new(TargetId(id), pickup, dropoff, 0.0, 1, start, end)
}

/// Request whose pickup and dropoff both sit on the depot.
fn at_depot(id: u32, horizon: f64) -> Target {
    target(id, ORIGIN, ORIGIN, window(0.0, horizon), window(0.0, horizon))
}

fn instance(targets: Vec<Target>, drivers: usize, capacity: u32, time_end: f64, size: f64) -> DarpInstance {
    DarpInstance {
        depot: ORIGIN,
        extremas: Extremas::square(size),
        time_end,
        targets,
        drivers: (0..drivers as u32)
            .map(|i| Driver::new(DriverId(i), ORIGIN, capacity))
            .collect(),
    }
}

fn env_with<R: RewardFunction>(
    inst: DarpInstance,
    max_step: u64,
    reward: R,
) -> DarSeqEnv<FixedInstance, R> {
    let config = EnvConfig { max_step, ..EnvConfig::default() };
    let mut env = EnvBuilder::fixed(config, FixedInstance::new(inst), reward)
        .build()
        .unwrap();
    env.reset().unwrap();
    env
}

/// One driver at the origin, one request (3, 4) → (3, 0), wide windows.
fn straight_line() -> DarpInstance {
    let horizon = window(0.0, 1_000.0);
    instance(
        vec![target(0, Point::new(3.0, 4.0), Point::new(3.0, 0.0), horizon, horizon)],
        1,
        1,
        1_000.0,
        10.0,
    )
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ── EventClock ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod clock_tests {
    use super::*;

    #[test]
    fn arrivals_and_boundaries_interleave() {
        let mut c = EventClock::new(3, [10.0, 20.0, 10.0]);
        assert_eq!(c.boundary_count(), 2);
        assert_eq!(c.next_event(), Some(10.0));

        c.schedule(DriverId(2), 5.0);
        c.schedule(DriverId(0), 5.0);
        assert_eq!(c.next_event(), Some(5.0));
        assert_eq!(c.advance_to(5.0), 5.0);
        assert_eq!(c.drain_due(), vec![DriverId(0), DriverId(2)]);
        assert_eq!(c.pending(), 0);
        assert_eq!(c.next_event(), Some(10.0));
    }

    #[test]
    fn zero_length_trip_is_due_now() {
        let mut c = EventClock::new(2, [50.0]);
        c.schedule(DriverId(1), 0.0);
        assert_eq!(c.next_event(), Some(0.0));
        assert_eq!(c.advance_to(0.0), 0.0);
        assert_eq!(c.drain_due(), vec![DriverId(1)]);
    }

    #[test]
    fn boundary_at_now_is_not_an_event() {
        let mut c = EventClock::new(1, [0.0, 4.0]);
        assert_eq!(c.next_event(), Some(4.0));
        c.advance_to(4.0);
        assert_eq!(c.next_event(), None);
    }

    #[test]
    fn reschedule_replaces_and_cancel_removes() {
        let mut c = EventClock::new(1, []);
        c.schedule(DriverId(0), 8.0);
        c.schedule(DriverId(0), 3.0);
        assert_eq!(c.pending(), 1);
        assert_eq!(c.arrival_of(DriverId(0)), Some(3.0));
        assert_eq!(c.next_event(), Some(3.0));

        c.cancel(DriverId(0));
        assert_eq!(c.arrival_of(DriverId(0)), None);
        assert_eq!(c.next_event(), None);
    }

    #[test]
    fn time_never_goes_back() {
        let mut c = EventClock::new(1, []);
        assert_eq!(c.advance_to(5.0), 5.0);
        assert_eq!(c.advance_to(2.0), 0.0);
        assert_eq!(c.now(), 5.0);
    }

    #[test]
    fn later_arrivals_stay_queued() {
        let mut c = EventClock::new(2, []);
        c.schedule(DriverId(0), 1.0);
        c.schedule(DriverId(1), 2.0);
        c.advance_to(1.0);
        assert_eq!(c.drain_due(), vec![DriverId(0)]);
        assert_eq!(c.arrival_of(DriverId(1)), Some(2.0));
    }
}

// ── ActionOutcome ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod outcome_tests {
    use super::*;

    #[test]
    fn rejection_codes_are_distinct() {
        let codes: Vec<f64> = [
            ActionOutcome::OutOfRange,
            ActionOutcome::AlreadyDelivered,
            ActionOutcome::CannotLoad,
            ActionOutcome::NotCarried,
            ActionOutcome::AlreadyHandled,
        ]
        .iter()
        .map(|o| o.value())
        .collect();
        assert_eq!(codes, vec![-2.0, -3.0, -4.0, -5.0, -6.0]);
    }

    #[test]
    fn success_carries_distance() {
        let c = ActionOutcome::Committed { distance: 2.5 };
        assert!(c.is_success());
        assert_eq!(c.value(), 2.5);
        assert_eq!(c.distance(), 2.5);
        assert!(ActionOutcome::Waited.is_success());
        assert_eq!(ActionOutcome::Waited.value(), 0.0);
        assert!(!ActionOutcome::CannotLoad.is_success());
        assert_eq!(ActionOutcome::CannotLoad.distance(), 0.0);
    }
}

// ── Reward strategies ─────────────────────────────────────────────────────────

#[cfg(test)]
mod reward_tests {
    use super::*;

    fn ctx() -> EnvContext<'static> {
        EnvContext {
            time:           0.0,
            time_end:       100.0,
            step:           1,
            max_step:       10,
            current_player: DriverId(0),
            depot:          ORIGIN,
            targets:        &[],
            drivers:        &[],
            total_distance: 0.0,
            max_reward:     6.0,
            best_known:     None,
        }
    }

    #[test]
    fn distance_reward_is_linear() {
        let c = ctx();
        let r = DistanceReward;
        assert_eq!(r.compute(ActionOutcome::Committed { distance: 2.0 }, false, &c), 4.0);
        assert_eq!(r.compute(ActionOutcome::Waited, false, &c), 0.0);
        assert_eq!(r.compute(ActionOutcome::CannotLoad, false, &c), -6.0);
    }

    #[test]
    fn constant_reward_ignores_distance() {
        let c = ctx();
        let r = ConstantReward;
        assert_eq!(r.compute(ActionOutcome::Committed { distance: 9.0 }, false, &c), 1.0);
        assert_eq!(r.compute(ActionOutcome::Waited, true, &c), 0.0);
        assert_eq!(r.compute(ActionOutcome::AlreadyHandled, false, &c), -1.0);
    }

    #[test]
    fn distribution_bonus_needs_targets() {
        let c = ctx();
        let r = ConstantDistributionReward;
        assert_eq!(r.compute(ActionOutcome::OutOfRange, true, &c), -1.0);
    }

    #[test]
    fn kind_dispatches_and_parses() {
        let c = ctx();
        let o = ActionOutcome::Committed { distance: 1.0 };
        assert_eq!(RewardKind::Distance.compute(o, false, &c), 5.0);
        assert_eq!(RewardKind::Constant.compute(o, false, &c), 1.0);
        assert_eq!(RewardKind::parse("ConstantDistributionReward"), Some(RewardKind::ConstantDistribution));
        assert_eq!(RewardKind::parse("constant"), Some(RewardKind::Constant));
        assert_eq!(RewardKind::parse("distance_reward"), Some(RewardKind::Distance));
        assert_eq!(RewardKind::parse("bogus"), None);
    }
}

// ── Named scenarios ───────────────────────────────────────────────────────────

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn coincident_request_done_in_two_steps() {
        let mut env = env_with(instance(vec![at_depot(0, 100.0)], 1, 1, 100.0, 1.0), 10, ConstantReward);

        let first = env.step(1).unwrap();
        assert_eq!(first.outcome, ActionOutcome::Committed { distance: 0.0 });
        assert!(!first.done);
        assert_eq!(env.targets()[0].state(), TargetState::Loaded);
        assert_eq!(env.current_player(), Some(DriverId(0)));

        let second = env.step(1).unwrap();
        assert!(second.done);
        assert_eq!(second.info.delivered, 1);
        assert!(second.info.fit_solution);
        assert_eq!(env.targets_states(), [0, 0, 0, 0, 1]);
        assert_eq!(env.current_step(), 2);
        assert_eq!(env.time(), 0.0);
        assert_eq!(env.episode_count(), 1);
    }

    #[test]
    fn waiting_until_max_step() {
        let targets = vec![
            target(0, Point::new(5.0, 0.0), Point::new(6.0, 0.0), window(10.0, 20.0), window(30.0, 40.0)),
            target(1, Point::new(5.0, 0.0), Point::new(6.0, 0.0), window(50.0, 60.0), window(70.0, 80.0)),
        ];
        let mut env = env_with(instance(targets, 1, 1, 1_000.0, 10.0), 4, ConstantReward);

        let mut times = Vec::new();
        for i in 1..=4 {
            let step = env.step(0).unwrap();
            assert_eq!(step.outcome, ActionOutcome::Waited);
            assert_eq!(step.done, i == 4);
            assert_eq!(step.info.delivered, 0);
            times.push(env.time());
        }
        assert_eq!(times, vec![10.0, 20.0, 30.0, 40.0]);
        assert_eq!(env.total_distance(), 0.0);
    }

    #[test]
    fn already_delivered_is_penalised() {
        let horizon = window(0.0, 1_000.0);
        let targets = vec![
            at_depot(0, 1_000.0),
            target(1, Point::new(3.0, 4.0), Point::new(3.0, 0.0), horizon, horizon),
        ];
        let mut env = env_with(instance(targets, 1, 1, 1_000.0, 10.0), 10, ConstantReward);
        env.step(1).unwrap();
        env.step(1).unwrap();

        let step = env.step(1).unwrap();
        assert_eq!(step.outcome, ActionOutcome::AlreadyDelivered);
        assert_eq!(step.outcome.value(), -3.0);
        assert_eq!(step.reward, -1.0);
        assert!(!step.done);
        assert_eq!(env.current_player(), Some(DriverId(0)));
        assert_eq!(env.total_distance(), 0.0);
    }
}

// ── Turn loop ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod step_tests {
    use super::*;

    #[test]
    fn distance_accumulates_per_trip() {
        let mut env = env_with(straight_line(), 10, DistanceReward);
        assert_eq!(env.max_reward(), 15.0);

        let pickup = env.step(1).unwrap();
        assert_eq!(pickup.outcome, ActionOutcome::Committed { distance: 5.0 });
        assert_eq!(pickup.reward, 10.0);
        assert_eq!(env.time(), 5.0);
        assert_eq!(env.total_distance(), 5.0);
        assert_eq!(env.drivers()[0].position(), Point::new(3.0, 4.0));

        let dropoff = env.step(1).unwrap();
        assert_eq!(dropoff.outcome, ActionOutcome::Committed { distance: 4.0 });
        assert_eq!(dropoff.reward, 11.0);
        assert!(dropoff.done);
        assert_eq!(env.time(), 9.0);
        assert_eq!(env.total_distance(), 9.0);
        assert_eq!(env.cumulative_reward(), 21.0);
    }

    #[test]
    fn gap_against_best_known() {
        let config = EnvConfig { max_step: 10, ..EnvConfig::default() };
        let source = FixedInstance::new(straight_line()).with_best_known(6.0);
        let mut env = EnvBuilder::fixed(config, source, ConstantReward).build().unwrap();
        env.reset().unwrap();
        env.step(1).unwrap();
        let last = env.step(1).unwrap();
        assert!(close(last.info.gap, 50.0));
        assert!(close(env.gap(), 50.0));
    }

    #[test]
    fn gap_sentinel_without_best_known() {
        let mut env = env_with(straight_line(), 10, ConstantReward);
        assert_eq!(env.step(1).unwrap().info.gap, 300.0);
    }

    #[test]
    fn travelling_drivers_interpolate() {
        let horizon = window(0.0, 1_000.0);
        let targets = vec![
            target(0, Point::new(10.0, 0.0), Point::new(10.0, 10.0), horizon, horizon),
            target(1, Point::new(0.0, 4.0), ORIGIN, horizon, horizon),
        ];
        let mut env = env_with(instance(targets, 2, 1, 1_000.0, 10.0), 50, ConstantReward);
        assert_eq!(env.current_player(), Some(DriverId(0)));
        assert_eq!(env.next_players(), &[DriverId(1)]);

        env.step(1).unwrap();
        assert_eq!(env.current_player(), Some(DriverId(1)));
        assert_eq!(env.time(), 0.0);

        env.step(2).unwrap();
        assert_eq!(env.time(), 4.0);
        assert_eq!(env.current_player(), Some(DriverId(1)));
        assert!(env.drivers()[0].position().distance(Point::new(4.0, 0.0)) < 1e-9);
        assert_eq!(env.targets()[0].state(), TargetState::PickupEnRoute);
        assert_eq!(env.targets()[1].state(), TargetState::Loaded);
        assert_eq!(env.total_distance(), 14.0);

        env.step(2).unwrap();
        assert_eq!(env.time(), 8.0);
        assert!(env.drivers()[0].position().distance(Point::new(8.0, 0.0)) < 1e-9);
        assert_eq!(env.targets()[1].state(), TargetState::Delivered);

        // Driver 2 waits; driver 1 reaches its pickup and both become free.
        env.step(0).unwrap();
        assert_eq!(env.time(), 10.0);
        assert_eq!(env.targets()[0].state(), TargetState::Loaded);
        assert_eq!(env.current_player(), Some(DriverId(1)));
        assert_eq!(env.next_players(), &[DriverId(0)]);
    }

    #[test]
    fn rejection_keeps_the_turn() {
        let mut env = env_with(straight_line(), 10, ConstantReward);
        let step = env.step(7).unwrap();
        assert_eq!(step.outcome, ActionOutcome::OutOfRange);
        assert_eq!(step.reward, -1.0);
        assert_eq!(env.current_step(), 1);
        assert_eq!(env.current_player(), Some(DriverId(0)));
        assert_eq!(env.time(), 0.0);
    }

    #[test]
    fn pickup_window_missed() {
        let t = target(0, Point::new(5.0, 0.0), Point::new(6.0, 0.0), window(0.0, 1.0), window(0.0, 100.0));
        let mut env = env_with(instance(vec![t], 1, 1, 100.0, 10.0), 10, ConstantReward);
        assert_eq!(env.step(1).unwrap().outcome, ActionOutcome::CannotLoad);
        assert_eq!(env.targets()[0].state(), TargetState::Unassigned);
    }

    #[test]
    fn full_vehicle_cannot_load() {
        let mut env = env_with(
            instance(vec![at_depot(0, 100.0), at_depot(1, 100.0)], 1, 1, 100.0, 1.0),
            10,
            ConstantReward,
        );
        env.step(1).unwrap();
        assert_eq!(env.step(2).unwrap().outcome, ActionOutcome::CannotLoad);
    }

    #[test]
    fn dropoff_window_missed() {
        let t = target(0, ORIGIN, Point::new(5.0, 0.0), window(0.0, 100.0), window(0.0, 1.0));
        let mut env = env_with(instance(vec![t], 1, 1, 100.0, 10.0), 10, ConstantReward);
        env.step(1).unwrap();
        assert_eq!(env.step(1).unwrap().outcome, ActionOutcome::NotCarried);
        assert_eq!(env.targets()[0].state(), TargetState::Loaded);
    }

    #[test]
    fn contested_targets() {
        let mut env = env_with(instance(vec![at_depot(0, 100.0)], 2, 1, 100.0, 1.0), 10, ConstantReward);
        env.step(1).unwrap();
        assert_eq!(env.current_player(), Some(DriverId(1)));

        assert_eq!(env.step(1).unwrap().outcome, ActionOutcome::AlreadyHandled);
        assert_eq!(env.step(0).unwrap().outcome, ActionOutcome::Waited);
        assert_eq!(env.targets()[0].state(), TargetState::Loaded);
        assert_eq!(env.current_player(), Some(DriverId(1)));

        let step = env.step(1).unwrap();
        assert_eq!(step.outcome, ActionOutcome::NotCarried);
        assert_eq!(step.outcome.value(), -5.0);
    }

    #[test]
    fn horizon_reached_by_waiting() {
        let t = target(0, Point::new(3.0, 4.0), Point::new(3.0, 0.0), window(0.0, 2.0), window(0.0, 2.0));
        let mut env = env_with(instance(vec![t], 1, 1, 2.0, 10.0), 10, ConstantReward);
        let step = env.step(0).unwrap();
        assert!(step.done);
        assert_eq!(env.time(), 2.0);
    }

    #[test]
    fn no_event_jumps_to_horizon() {
        let t = target(0, Point::new(3.0, 4.0), Point::new(3.0, 0.0), window(0.0, 10.0), window(0.0, 10.0));
        let mut env = env_with(instance(vec![t], 1, 1, 50.0, 10.0), 10, ConstantReward);
        assert!(!env.step(0).unwrap().done);
        assert_eq!(env.time(), 10.0);
        assert!(env.step(0).unwrap().done);
        assert_eq!(env.time(), 50.0);
    }

    #[test]
    fn distribution_bonus_on_completion() {
        let mut env = env_with(
            instance(vec![at_depot(0, 100.0)], 1, 1, 100.0, 1.0),
            10,
            ConstantDistributionReward,
        );
        assert_eq!(env.step(1).unwrap().reward, 1.0);
        // max_reward = ⌊1.5 · 1⌋ = 1, all delivered.
        assert_eq!(env.step(1).unwrap().reward, 2.0);
    }

    #[test]
    fn step_before_reset_fails() {
        let mut env = EnvBuilder::fixed(
            EnvConfig::default(),
            FixedInstance::new(straight_line()),
            ConstantReward,
        )
        .build()
        .unwrap();
        assert!(matches!(env.step(0), Err(EnvError::NotReset)));
        assert!(matches!(env.observation(), Err(EnvError::NotReset)));
        assert_eq!(env.render(), "environment not reset\n");
        assert_eq!(env.gap(), 300.0);
        assert_eq!(env.targets_states(), [0; 5]);
    }

    #[test]
    fn reset_starts_over() {
        let mut env = env_with(straight_line(), 10, ConstantReward);
        env.step(1).unwrap();
        env.step(1).unwrap();
        env.reset().unwrap();
        assert_eq!(env.current_step(), 0);
        assert_eq!(env.time(), 0.0);
        assert_eq!(env.total_distance(), 0.0);
        assert_eq!(env.cumulative_reward(), 0.0);
        assert_eq!(env.targets_states(), [1, 0, 0, 0, 0]);
        assert_eq!(env.drivers()[0].position(), ORIGIN);
        assert_eq!(env.episode_count(), 1);
    }

    #[test]
    fn render_reports_progress() {
        let mut env = env_with(instance(vec![at_depot(0, 100.0)], 1, 1, 100.0, 1.0), 10, ConstantReward);
        env.step(1).unwrap();
        env.step(1).unwrap();
        let text = env.render();
        assert!(text.contains("[Step 2]"));
        assert!(text.contains("Player 1 aimed right"));
        assert!(text.contains("Targets by state: [0, 0, 0, 0, 1]"));
        assert!(text.contains("Last aimed at: 1"));
        assert!(text.contains("Fit solution: true"));
    }
}

// ── Observation encodings ─────────────────────────────────────────────────────

#[cfg(test)]
mod observation_tests {
    use super::*;

    fn two_by_two(kind: RepresentationKind) -> DarSeqEnv<FixedInstance, ConstantReward> {
        let horizon = window(0.0, 1_000.0);
        let targets = vec![
            at_depot(0, 1_000.0),
            target(1, Point::new(3.0, 4.0), Point::new(3.0, 0.0), horizon, horizon),
        ];
        let config = EnvConfig { max_step: 10, representation: kind, ..EnvConfig::default() };
        let source = FixedInstance::new(instance(targets, 2, 2, 1_000.0, 10.0));
        let mut env = EnvBuilder::fixed(config, source, ConstantReward).build().unwrap();
        env.reset().unwrap();
        env
    }

    #[test]
    fn block_layout() {
        let env = two_by_two(RepresentationKind::Block);
        let obs = env.observation().unwrap();
        let flat = obs.as_flat().unwrap();
        assert_eq!(flat.len(), env.observation_len());
        assert_eq!(flat.len(), 4 + 11 * 2 + 9 * 2);
        assert_eq!(&flat[..4], &[0.0, 1.0, 0.0, 0.0]);
        // Second target row: identity, pickup, dropoff, forks, weight, state.
        assert_eq!(&flat[15..26], &[2.0, 3.0, 4.0, 3.0, 0.0, 0.0, 1_000.0, 0.0, 1_000.0, 1.0, -2.0]);
        assert_eq!(env.action_space_size(), 3);
    }

    #[test]
    fn observation_is_idempotent() {
        let mut env = two_by_two(RepresentationKind::Block);
        let step = env.step(2).unwrap();
        assert_eq!(env.observation().unwrap(), env.observation().unwrap());
        assert_eq!(step.observation, env.observation().unwrap());
    }

    #[test]
    fn trans_lists_loaded_ids() {
        let mut env = two_by_two(RepresentationKind::Trans);
        env.step(1).unwrap(); // driver 1 claims target 1
        env.step(0).unwrap(); // driver 2 waits; driver 1 loads it
        let obs = env.observation().unwrap();
        let s = obs.as_structured().unwrap();
        assert_eq!(s.world.len(), 4);
        assert_eq!(s.targets[0].len(), 11);
        assert_eq!(s.drivers[0], vec![1.0, 0.0, 0.0, 2.0, 1.0]);
        assert_eq!(s.drivers[1], vec![2.0, 0.0, 0.0, 2.0]);
        assert_eq!(s.positions.targets[1], [3.0, 4.0, 3.0, 0.0]);
        assert!(s.times.is_none());
    }

    #[test]
    fn trans2_family() {
        let env = two_by_two(RepresentationKind::Trans2);
        let s = env.observation().unwrap().as_structured().unwrap().clone();
        assert_eq!(s.world, vec![1.0, 1.0]);
        assert_eq!(s.targets, vec![vec![1.0, -2.0], vec![2.0, -2.0]]);
        assert_eq!(s.drivers, vec![vec![1.0], vec![2.0]]);

        let env = two_by_two(RepresentationKind::Trans25);
        let s = env.observation().unwrap().as_structured().unwrap().clone();
        assert_eq!(s.targets, vec![vec![3.0, -2.0], vec![4.0, -2.0]]);

        let env = two_by_two(RepresentationKind::Trans3);
        let s = env.observation().unwrap().as_structured().unwrap().clone();
        let times = s.times.unwrap();
        assert_eq!(times.now, 0.0);
        assert_eq!(times.forks[1], [0.0, 1_000.0, 0.0, 1_000.0]);
    }

    #[test]
    fn dict_fields() {
        let env = two_by_two(RepresentationKind::Dict);
        let Observation::Dict(d) = env.observation().unwrap() else {
            panic!("expected a dict observation");
        };
        assert_eq!(d.world.player, 1);
        assert_eq!(d.targets[1].pickup, Point::new(3.0, 4.0));
        assert_eq!(d.targets[1].state, -2);
        assert_eq!(d.drivers[1].capacity, 2);
        assert!(d.drivers[0].loaded.is_empty());
    }

    #[test]
    fn kinds_parse() {
        assert_eq!(RepresentationKind::parse("trans25"), Some(RepresentationKind::Trans25));
        assert_eq!(RepresentationKind::parse("BLOCK"), Some(RepresentationKind::Block));
        assert_eq!(RepresentationKind::parse("image"), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn dict_serialises() {
        let env = two_by_two(RepresentationKind::Dict);
        let json = serde_json::to_value(env.observation().unwrap().as_dict().unwrap()).unwrap();
        assert_eq!(json["world"]["player"], 1);
        assert_eq!(json["targets"][1]["pickup"]["x"], 3.0);
    }
}

// ── EnvBuilder ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use std::fs;

    use super::*;

    const BENCH: &str = "\
2 2 480 3 90
0   0.000   0.000  0  0    0 1440
1  -2.000   6.000  3  1   10  40
2   4.000  -1.000  3  1   20  60
3   1.000   1.000  3 -1   50 120
4  -5.000   2.500  3 -1   60 150
5   0.000   0.000  0  0    0 1440
";

    fn dataset(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("a2-2.txt");
        fs::write(&path, BENCH).unwrap();
        fs::write(dir.path().join("a2-2.best"), "42.5\n").unwrap();
        path
    }

    #[test]
    fn random_mode_from_defaults() {
        let mut env = EnvBuilder::from_config(EnvConfig::default()).unwrap().build().unwrap();
        env.reset().unwrap();
        assert_eq!(env.targets().len(), 2);
        assert_eq!(env.drivers().len(), 2);
        assert_eq!(env.action_space_size(), 3);
        assert_eq!(env.best_known(), None);
        assert_eq!(env.max_reward(), 6.0);
    }

    #[test]
    fn same_seed_same_episode() {
        let config = EnvConfig { seed: 17, ..EnvConfig::default() };
        let mut a = EnvBuilder::from_config(config.clone()).unwrap().build().unwrap();
        let mut b = EnvBuilder::from_config(config).unwrap().build().unwrap();
        assert_eq!(a.reset().unwrap(), b.reset().unwrap());
        for action in [1, 2, 0, 1, 2] {
            assert_eq!(a.step(action).unwrap(), b.step(action).unwrap());
        }
    }

    #[test]
    fn invalid_configs_rejected() {
        let bad = [
            EnvConfig { driver_population: 0, ..EnvConfig::default() },
            EnvConfig { max_step: 0, ..EnvConfig::default() },
            EnvConfig { size: 0.0, ..EnvConfig::default() },
            EnvConfig { test_env: true, ..EnvConfig::default() },
        ];
        for config in bad {
            assert!(matches!(
                EnvBuilder::from_config(config).unwrap().build(),
                Err(EnvError::Config(_))
            ));
        }
    }

    #[test]
    fn test_env_replays_benchmark() {
        let dir = tempfile::tempdir().unwrap();
        let config = EnvConfig { dataset: Some(dataset(&dir)), test_env: true, ..EnvConfig::default() };
        let builder = EnvBuilder::from_config(config).unwrap();
        assert_eq!(builder.config().target_population, 2);
        assert_eq!(builder.config().time_end, 1440.0);
        assert_eq!(builder.config().size, 6.0);

        let mut env = builder.build().unwrap();
        env.reset().unwrap();
        assert_eq!(env.best_known(), Some(42.5));
        assert_eq!(env.targets()[0].pickup, Point::new(-2.0, 6.0));
        assert_eq!(env.targets()[0].dropoff, Point::new(1.0, 1.0));
        assert!(close(env.gap(), -100.0));
    }

    #[test]
    fn dataset_shapes_random_instances() {
        let dir = tempfile::tempdir().unwrap();
        let config = EnvConfig { dataset: Some(dataset(&dir)), ..EnvConfig::default() };
        let mut env = EnvBuilder::from_config(config).unwrap().build().unwrap();
        env.reset().unwrap();
        assert_eq!(env.targets().len(), 2);
        assert_eq!(env.drivers()[0].max_capacity, 3);
        assert_eq!(env.drivers()[0].position(), ORIGIN);
        assert_ne!(env.targets()[0].pickup, Point::new(-2.0, 6.0));
        assert_eq!(env.gap(), 300.0);
    }

    #[test]
    fn missing_dataset_is_an_instance_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = EnvConfig { dataset: Some(dir.path().join("nope.txt")), ..EnvConfig::default() };
        assert!(matches!(EnvBuilder::from_config(config), Err(EnvError::Instance(_))));
    }

    #[test]
    fn builder_swaps_collaborators() {
        let mut env = EnvBuilder::from_config(EnvConfig::default())
            .unwrap()
            .source(FixedInstance::new(straight_line()))
            .reward(DistanceReward)
            .max_step(3)
            .build()
            .unwrap();
        env.reset().unwrap();
        assert_eq!(env.targets().len(), 1);
        assert_eq!(env.config.max_step, 3);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_from_partial_json() {
        let config: EnvConfig = serde_json::from_str(
            r#"{"target_population": 5, "representation": "trans25", "reward": "constant_distribution"}"#,
        )
        .unwrap();
        assert_eq!(config.target_population, 5);
        assert_eq!(config.representation, RepresentationKind::Trans25);
        assert_eq!(config.reward, RewardKind::ConstantDistribution);
        assert_eq!(config.max_step, EnvConfig::default().max_step);
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod property_tests {
    use proptest::prelude::*;
    use proptest::test_runner::TestCaseError;

    use super::*;

    const MAX_STEP: u64 = 80;
    const TIME_END: f64 = 200.0;

    fn random_env(seed: u64, timeless: bool) -> DarSeqEnv<Box<dyn InstanceSource>, RewardKind> {
        let config = EnvConfig {
            size: 5.0,
            target_population: 4,
            driver_population: 2,
            capacity: 2,
            time_end: TIME_END,
            max_step: MAX_STEP,
            timeless,
            seed,
            depot: Some(ORIGIN),
            ..EnvConfig::default()
        };
        let mut env = EnvBuilder::from_config(config).unwrap().build().unwrap();
        env.reset().unwrap();
        env
    }

    /// Every in-vehicle target sits in exactly one load; loads fit.
    fn check_loads(env: &DarSeqEnv<Box<dyn InstanceSource>, RewardKind>) -> Result<(), TestCaseError> {
        let mut holders = vec![0usize; env.targets().len()];
        for d in env.drivers() {
            let weight: i32 = d.loaded().iter().map(|t| env.targets()[t.index()].weight).sum();
            prop_assert_eq!(weight, d.load_weight());
            prop_assert!(d.load_weight() <= d.max_capacity as i32);
            for t in d.loaded() {
                holders[t.index()] += 1;
            }
        }
        for t in env.targets() {
            let expected = usize::from(t.state().in_vehicle());
            prop_assert_eq!(holders[t.id.index()], expected);
        }
        Ok(())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn episode_invariants(
            seed in any::<u64>(),
            timeless in any::<bool>(),
            actions in prop::collection::vec(0usize..=6, 1..120),
        ) {
            let mut env = random_env(seed, timeless);
            let mut delivered = 0;
            let mut time = 0.0;

            for action in actions {
                let distance_before = env.total_distance();
                let step = env.step(action).unwrap();

                prop_assert!((env.total_distance() - distance_before - step.outcome.distance()).abs() < 1e-9);
                if !step.outcome.is_success() {
                    prop_assert_eq!(env.total_distance(), distance_before);
                }
                prop_assert!(step.info.delivered >= delivered);
                delivered = step.info.delivered;
                prop_assert!(env.time() >= time);
                time = env.time();

                check_loads(&env)?;

                let actor = env.current_player().unwrap();
                prop_assert!(env.drivers()[actor.index()].is_idle());

                let expected_done = delivered == env.target_population()
                    || env.current_step() >= MAX_STEP
                    || env.time() >= TIME_END;
                prop_assert_eq!(step.done, expected_done);

                let obs = env.observation().unwrap();
                prop_assert_eq!(&obs, &env.observation().unwrap());
                prop_assert_eq!(&step.observation, &obs);

                if step.done {
                    break;
                }
            }
        }

        #[test]
        fn waiting_never_fails(seed in any::<u64>(), steps in 1usize..40) {
            let mut env = random_env(seed, false);
            for _ in 0..steps {
                let step = env.step(0).unwrap();
                prop_assert_eq!(step.outcome, ActionOutcome::Waited);
                prop_assert_eq!(step.info.delivered, 0);
                if step.done {
                    break;
                }
            }
        }
    }
}
