//! Cordeau benchmark reader and writer.
//!
//! # File format
//!
//! Whitespace-separated, one record per line.  Blank lines are ignored.
//!
//! ```text
//! 3 48 480 6 90
//! 0   -1.044    2.000  0  0    0 1440
//! 1   -2.973    6.414 10  1    0 1440
//! ...
//! ```
//!
//! The first line is the header:
//!
//! | Field            | Meaning                          |
//! |------------------|----------------------------------|
//! | `vehicles`       | driver population                |
//! | `requests`       | target population `n`            |
//! | `route_duration` | maximum route duration           |
//! | `capacity`       | seats per vehicle                |
//! | `max_ride_time`  | maximum ride time per request    |
//!
//! It is followed by `id x y service_time demand tw_start tw_end` records: the
//! depot, the `n` pickups, the `n` dropoffs (request `i`'s dropoff is record
//! `i + n`), and optionally a closing depot record.  The depot's window end is
//! the instance horizon.
//!
//! # Best known cost
//!
//! [`load_benchmark`] also looks for a companion file with the `.best`
//! extension (see [`best_known_path`]); its first token is the best known
//! total distance.  A missing companion is not an error.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::str::{FromStr, SplitWhitespace};

use darp_core::{DriverId, Point, TargetId, TimeWindow};
use darp_entity::{Driver, Target};
use tracing::debug;

use crate::{DarpInstance, Extremas, InstanceError, InstanceResult};

// ── Records ───────────────────────────────────────────────────────────────────

/// First line of a benchmark file.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BenchmarkHeader {
    pub vehicles:       usize,
    pub requests:       usize,
    pub route_duration: f64,
    pub capacity:       u32,
    pub max_ride_time:  f64,
}

/// One stop line.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StopRecord {
    pub id:           u32,
    pub location:     Point,
    pub service_time: f64,
    pub demand:       i32,
    pub window:       TimeWindow,
}

/// A parsed benchmark file.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BenchmarkInstance {
    pub header:     BenchmarkHeader,
    pub depot:      StopRecord,
    pub pickups:    Vec<StopRecord>,
    pub dropoffs:   Vec<StopRecord>,
    /// Best known total distance, when a companion file was found.
    pub best_known: Option<f64>,
}

impl BenchmarkInstance {
    #[inline]
    pub fn depot_position(&self) -> Point {
        self.depot.location
    }

    /// The horizon: end of the depot's window.
    #[inline]
    pub fn time_end(&self) -> f64 {
        self.depot.window.end
    }

    /// Bounding box of every stop, depot included.
    pub fn extremas(&self) -> Extremas {
        Extremas::enclosing(
            std::iter::once(self.depot.location)
                .chain(self.pickups.iter().map(|s| s.location))
                .chain(self.dropoffs.iter().map(|s| s.location)),
        )
    }

    /// Largest absolute coordinate of any stop.
    #[inline]
    pub fn size(&self) -> f64 {
        self.extremas().size()
    }

    /// Materialise the file as an environment instance: one target per
    /// request, `vehicles` empty drivers parked at the depot.
    pub fn to_instance(&self) -> DarpInstance {
        let targets = self
            .pickups
            .iter()
            .zip(&self.dropoffs)
            .enumerate()
            .map(|(i, (p, d))| {
                Target::new(
                    TargetId(i as u32),
                    p.location,
                    d.location,
                    p.service_time,
                    p.demand,
                    p.window,
                    d.window,
                )
            })
            .collect();
        let drivers = (0..self.header.vehicles)
            .map(|i| Driver::new(DriverId(i as u32), self.depot.location, self.header.capacity))
            .collect();
        DarpInstance {
            depot: self.depot.location,
            extremas: self.extremas(),
            time_end: self.time_end(),
            targets,
            drivers,
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a benchmark file and its `.best` companion, if any.
pub fn load_benchmark(path: &Path) -> InstanceResult<BenchmarkInstance> {
    let mut instance = read_benchmark(File::open(path)?)?;
    let best_path = best_known_path(path);
    instance.best_known = match File::open(&best_path) {
        Ok(file) => read_best_known(file)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };
    debug!(
        path = %path.display(),
        requests = instance.header.requests,
        vehicles = instance.header.vehicles,
        best_known = ?instance.best_known,
        "loaded benchmark"
    );
    Ok(instance)
}

/// Like [`load_benchmark`] but from any `Read` source, without the companion
/// lookup (`best_known` is `None`).
pub fn read_benchmark<R: Read>(reader: R) -> InstanceResult<BenchmarkInstance> {
    let mut lines = BufReader::new(reader)
        .lines()
        .enumerate()
        .map(|(i, line)| line.map(|l| (i + 1, l)))
        .filter(|r| r.as_ref().map_or(true, |(_, l)| !l.trim().is_empty()));

    // ── Header ────────────────────────────────────────────────────────────
    let Some(first) = lines.next() else {
        return Err(InstanceError::Parse { line: 0, message: "empty benchmark file".into() });
    };
    let (line_no, text) = first?;
    let header = parse_header(line_no, &text)?;
    let n = header.requests;
    // Depot plus two stops per request; a closing depot may follow.
    let Some(required) = n.checked_mul(2).and_then(|v| v.checked_add(1)) else {
        return Err(InstanceError::Parse {
            line:    line_no,
            message: format!("request count {n} is out of range"),
        });
    };

    // ── Stops ─────────────────────────────────────────────────────────────
    let mut stops = Vec::new();
    for line in lines {
        let (line_no, text) = line?;
        stops.push(parse_stop(line_no, &text)?);
    }
    if !matches!(stops.len().checked_sub(required), Some(0 | 1)) {
        return Err(InstanceError::Invalid(format!(
            "expected {required} stop records (plus an optional closing depot) for {n} requests, found {}",
            stops.len()
        )));
    }

    let depot = stops[0];
    let pickups = stops[1..=n].to_vec();
    let dropoffs = stops[n + 1..=2 * n].to_vec();
    if let Some(p) = pickups.iter().find(|p| p.demand <= 0) {
        return Err(InstanceError::Invalid(format!(
            "pickup record {} has non-positive demand {}", p.id, p.demand
        )));
    }

    Ok(BenchmarkInstance { header, depot, pickups, dropoffs, best_known: None })
}

/// Read the first token of a `.best` companion as the best known cost.
/// An empty source gives `None`.
pub fn read_best_known<R: Read>(mut reader: R) -> InstanceResult<Option<f64>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let Some(token) = text.split_whitespace().next() else {
        return Ok(None);
    };
    token
        .parse::<f64>()
        .map(Some)
        .map_err(|_| InstanceError::Parse {
            line:    1,
            message: format!("invalid best known cost {token:?}"),
        })
}

/// `dir/name.txt` → `dir/name.best`.
pub fn best_known_path(path: &Path) -> PathBuf {
    path.with_extension("best")
}

/// Write `instance` in benchmark format.
///
/// Pickup demand is the request weight and dropoff demand its negation; the
/// depot appears first and last with window `[0, time_end]`.  Route duration
/// and ride time are both written as the horizon.
pub fn write_benchmark<W: Write>(instance: &DarpInstance, mut out: W) -> InstanceResult<()> {
    let n = instance.targets.len();
    let capacity = instance.drivers.iter().map(|d| d.max_capacity).max().unwrap_or(0);
    writeln!(
        out,
        "{} {} {} {} {}",
        instance.drivers.len(),
        n,
        instance.time_end,
        capacity,
        instance.time_end
    )?;

    let depot = instance.depot;
    writeln!(out, "0 {:.3} {:.3} 0 0 0 {}", depot.x, depot.y, instance.time_end)?;
    for t in &instance.targets {
        let p = t.pickup;
        writeln!(
            out,
            "{} {:.3} {:.3} {} {} {} {}",
            t.id.identity(), p.x, p.y, t.service_time, t.weight, t.start_fork.start, t.start_fork.end
        )?;
    }
    for t in &instance.targets {
        let d = t.dropoff;
        writeln!(
            out,
            "{} {:.3} {:.3} {} {} {} {}",
            t.id.identity() as usize + n, d.x, d.y, t.service_time, -t.weight, t.end_fork.start, t.end_fork.end
        )?;
    }
    writeln!(out, "{} {:.3} {:.3} 0 0 0 {}", 2 * n + 1, depot.x, depot.y, instance.time_end)?;
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Typed tokens of one record line.
struct Fields<'a> {
    line:   usize,
    what:   &'static str,
    tokens: SplitWhitespace<'a>,
}

impl<'a> Fields<'a> {
    fn new(line: usize, text: &'a str, what: &'static str) -> Self {
        Self { line, what, tokens: text.split_whitespace() }
    }

    /// Parse the next token as `T`.  Integer fields reject fractions, signs
    /// they cannot hold and values beyond their range.
    fn next<T: FromStr>(&mut self, name: &str) -> InstanceResult<T> {
        let token = self.tokens.next().ok_or_else(|| InstanceError::Parse {
            line:    self.line,
            message: format!("{} is missing `{name}`", self.what),
        })?;
        token.parse().map_err(|_| InstanceError::Parse {
            line:    self.line,
            message: format!("invalid `{name}` {token:?} in {}", self.what),
        })
    }
}

fn parse_header(line: usize, text: &str) -> InstanceResult<BenchmarkHeader> {
    let mut f = Fields::new(line, text, "header");
    let header = BenchmarkHeader {
        vehicles:       f.next("vehicles")?,
        requests:       f.next("requests")?,
        route_duration: f.next("route_duration")?,
        capacity:       f.next("capacity")?,
        max_ride_time:  f.next("max_ride_time")?,
    };
    if header.vehicles == 0 || header.capacity == 0 {
        return Err(InstanceError::Parse {
            line,
            message: "header needs at least one vehicle with positive capacity".into(),
        });
    }
    Ok(header)
}

fn parse_stop(line: usize, text: &str) -> InstanceResult<StopRecord> {
    let mut f = Fields::new(line, text, "stop record");
    let id = f.next("id")?;
    let location = Point::new(f.next("x")?, f.next("y")?);
    let service_time = f.next("service_time")?;
    let demand = f.next("demand")?;
    let (start, end): (f64, f64) = (f.next("tw_start")?, f.next("tw_end")?);
    if start > end {
        return Err(InstanceError::Parse {
            line,
            message: format!("time window [{start}, {end}] is inverted"),
        });
    }
    Ok(StopRecord { id, location, service_time, demand, window: TimeWindow::new(start, end) })
}
