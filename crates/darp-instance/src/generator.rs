//! Random instance generation.

use darp_core::{DarpError, DarpResult, DriverId, Point, SimRng, TargetId, TimeWindow};
use darp_entity::{Driver, Target};

use crate::{BenchmarkInstance, DarpInstance, Extremas, InstanceResult};

/// Default width of a generated pickup window.
pub const DEFAULT_WINDOW_WIDTH: f64 = 60.0;

// ── GeneratorParams ───────────────────────────────────────────────────────────

/// Knobs for [`RandomGenerator`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratorParams {
    pub extremas:          Extremas,
    /// Fixed depot; `None` draws a fresh one inside `extremas` per instance.
    pub depot:             Option<Point>,
    pub target_population: usize,
    pub driver_population: usize,
    pub capacity:          u32,
    pub time_end:          f64,
    /// Every window spans `[0, time_end]`.
    pub timeless:          bool,
    /// Pickup window width.  Dropoff windows are twice as wide.
    pub window_width:      f64,
    pub service_time:      f64,
}

impl GeneratorParams {
    /// Requests scattered over `[-size, size]²`.
    pub fn square(
        size: f64,
        target_population: usize,
        driver_population: usize,
        capacity: u32,
        time_end: f64,
    ) -> Self {
        Self {
            extremas: Extremas::square(size),
            depot: None,
            target_population,
            driver_population,
            capacity,
            time_end,
            timeless: false,
            window_width: DEFAULT_WINDOW_WIDTH,
            service_time: 0.0,
        }
    }

    /// Fresh random requests shaped like a benchmark file: same populations,
    /// bounding box, depot, horizon and capacity.
    pub fn from_benchmark(bench: &BenchmarkInstance, timeless: bool) -> Self {
        Self {
            extremas: bench.extremas(),
            depot: Some(bench.depot_position()),
            target_population: bench.header.requests,
            driver_population: bench.header.vehicles,
            capacity: bench.header.capacity,
            time_end: bench.time_end(),
            timeless,
            window_width: DEFAULT_WINDOW_WIDTH,
            service_time: 0.0,
        }
    }

    pub fn validate(&self) -> DarpResult<()> {
        let e = &self.extremas;
        if e.min_x > e.max_x || e.min_y > e.max_y {
            return Err(DarpError::Config(format!("inverted extremas {e:?}")));
        }
        if self.driver_population == 0 {
            return Err(DarpError::Config("driver_population must be at least 1".into()));
        }
        if self.capacity == 0 {
            return Err(DarpError::Config("capacity must be at least 1".into()));
        }
        if !(self.time_end > 0.0) {
            return Err(DarpError::Config(format!("time_end must be positive, got {}", self.time_end)));
        }
        if !self.timeless && !(self.window_width > 0.0) {
            return Err(DarpError::Config("window_width must be positive".into()));
        }
        if let Some(depot) = self.depot {
            if !e.contains(depot) {
                return Err(DarpError::Config(format!("depot {depot} lies outside {e:?}")));
            }
        }
        Ok(())
    }
}

// ── RandomGenerator ───────────────────────────────────────────────────────────

/// Uniformly scattered unit-weight requests.
///
/// With windows enabled, request `i` gets a pickup window of width
/// `window_width` opening no earlier than the depot-to-pickup distance, and a
/// dropoff window starting one direct ride later.  Both are clamped to the
/// horizon, so every window is well-formed even when the horizon is short.
#[derive(Clone, Debug)]
pub struct RandomGenerator {
    params: GeneratorParams,
}

impl RandomGenerator {
    pub fn new(params: GeneratorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &GeneratorParams {
        &self.params
    }

    pub fn generate(&self, rng: &mut SimRng) -> InstanceResult<DarpInstance> {
        let p = &self.params;
        p.validate()?;

        let depot = p.depot.unwrap_or_else(|| random_point(&p.extremas, rng));
        let targets = (0..p.target_population)
            .map(|i| {
                let pickup = random_point(&p.extremas, rng);
                let dropoff = random_point(&p.extremas, rng);
                let (start_fork, end_fork) = if p.timeless {
                    let horizon = TimeWindow::new(0.0, p.time_end);
                    (horizon, horizon)
                } else {
                    self.windows(depot, pickup, dropoff, rng)
                };
                Target::new(TargetId(i as u32), pickup, dropoff, p.service_time, 1, start_fork, end_fork)
            })
            .collect();
        let drivers = (0..p.driver_population)
            .map(|i| Driver::new(DriverId(i as u32), depot, p.capacity))
            .collect();

        Ok(DarpInstance {
            depot,
            extremas: p.extremas,
            time_end: p.time_end,
            targets,
            drivers,
        })
    }

    fn windows(
        &self,
        depot: Point,
        pickup: Point,
        dropoff: Point,
        rng: &mut SimRng,
    ) -> (TimeWindow, TimeWindow) {
        let p = &self.params;
        let w = p.window_width;
        let approach = depot.distance(pickup).min(p.time_end);
        let ride = pickup.distance(dropoff);

        let latest = (p.time_end - ride - 2.0 * w).max(approach);
        let open = if latest > approach { rng.gen_range(approach..latest) } else { approach };

        let start_fork = TimeWindow::new(open, (open + w).min(p.time_end));
        let drop_open = (open + ride).min(p.time_end);
        let end_fork = TimeWindow::new(drop_open, (open + ride + 2.0 * w).min(p.time_end));
        (start_fork, end_fork)
    }
}

fn random_point(e: &Extremas, rng: &mut SimRng) -> Point {
    let x = if e.max_x > e.min_x { rng.gen_range(e.min_x..e.max_x) } else { e.min_x };
    let y = if e.max_y > e.min_y { rng.gen_range(e.min_y..e.max_y) } else { e.min_y };
    Point::new(x, y)
}
