//! Observation encodings.
//!
//! # Layouts
//!
//! | Kind      | World                          | Target row           | Driver row                   | Extra        |
//! |-----------|--------------------------------|----------------------|------------------------------|--------------|
//! | `Block`   | `[time, player, depot.x, depot.y]` | 11 values        | 9 values                     | -            |
//! | `Trans`   | `[time, player, depot.x, depot.y]` | 11 values        | `[id, x, y, cap, loaded…]`   | positions    |
//! | `Trans2`  | `[player, player]`             | `[id, state]`        | `[id, loaded…]`              | positions    |
//! | `Trans25` | `[player, player]`             | `[id + D, state]`    | `[id, loaded…]`              | positions    |
//! | `Trans3`  | `[player, player]`             | `[id, state]`        | `[id, loaded…]`              | positions, times |
//! | `Dict`    | named fields                   | named fields         | named fields                 | -            |
//!
//! `Block` concatenates everything into one flat vector of length
//! `4 + 11·T + 9·D`.  Identities are 1-based; `player` is the identity of the
//! driver that acts next.  Encoding is a pure function of the context.

use darp_core::Point;
use darp_entity::{Driver, Target};

use crate::EnvContext;

// ── RepresentationKind ────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RepresentationKind {
    #[default]
    Block,
    Trans,
    Trans2,
    Trans25,
    Trans3,
    Dict,
}

impl RepresentationKind {
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "block"   => RepresentationKind::Block,
            "trans"   => RepresentationKind::Trans,
            "trans2"  => RepresentationKind::Trans2,
            "trans25" => RepresentationKind::Trans25,
            "trans3"  => RepresentationKind::Trans3,
            "dict"    => RepresentationKind::Dict,
            _ => return None,
        })
    }
}

// ── Observation ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Observation {
    Flat(Vec<f64>),
    Structured(StructuredObservation),
    Dict(DictObservation),
}

impl Observation {
    pub fn as_flat(&self) -> Option<&[f64]> {
        match self {
            Observation::Flat(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_structured(&self) -> Option<&StructuredObservation> {
        match self {
            Observation::Structured(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&DictObservation> {
        match self {
            Observation::Dict(d) => Some(d),
            _ => None,
        }
    }
}

/// The `Trans*` encodings.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StructuredObservation {
    pub world:     Vec<f64>,
    pub targets:   Vec<Vec<f64>>,
    pub drivers:   Vec<Vec<f64>>,
    pub positions: Positions,
    /// Only for `Trans3`.
    pub times:     Option<Times>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Positions {
    pub depot:   [f64; 2],
    /// `[pickup.x, pickup.y, dropoff.x, dropoff.y]` per target.
    pub targets: Vec<[f64; 4]>,
    pub drivers: Vec<[f64; 2]>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Times {
    pub now:   f64,
    /// Fork bounds per target, pickup window first.
    pub forks: Vec<[f64; 4]>,
}

// ── Dict encoding ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DictObservation {
    pub world:   DictWorld,
    pub targets: Vec<DictTarget>,
    pub drivers: Vec<DictDriver>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DictWorld {
    pub time:   f64,
    pub player: u32,
    pub depot:  Point,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DictTarget {
    pub id:      u32,
    pub pickup:  Point,
    pub dropoff: Point,
    pub start:   [f64; 2],
    pub end:     [f64; 2],
    pub weight:  i32,
    pub state:   i8,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DictDriver {
    pub id:       u32,
    pub position: Point,
    pub capacity: u32,
    pub loaded:   Vec<u32>,
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Length of a `Block` observation.
#[inline]
pub fn block_len(target_population: usize, driver_population: usize) -> usize {
    4 + Target::INFO_LEN * target_population + Driver::INFO_LEN * driver_population
}

/// Encode `ctx` as `kind`.
pub fn encode(kind: RepresentationKind, ctx: &EnvContext<'_>) -> Observation {
    match kind {
        RepresentationKind::Block => Observation::Flat(block(ctx)),
        RepresentationKind::Trans => Observation::Structured(StructuredObservation {
            world:     world_info(ctx).to_vec(),
            targets:   ctx.targets.iter().map(|t| t.info_vector().to_vec()).collect(),
            drivers:   ctx
                .drivers
                .iter()
                .map(|d| {
                    let p = d.position();
                    let mut row = vec![d.id.identity() as f64, p.x, p.y, d.max_capacity as f64];
                    row.extend(loaded_identities(d));
                    row
                })
                .collect(),
            positions: positions(ctx),
            times:     None,
        }),
        RepresentationKind::Trans2 => Observation::Structured(compact(ctx, 0, false)),
        RepresentationKind::Trans25 => {
            Observation::Structured(compact(ctx, ctx.drivers.len() as u32, false))
        }
        RepresentationKind::Trans3 => Observation::Structured(compact(ctx, 0, true)),
        RepresentationKind::Dict => Observation::Dict(dict(ctx)),
    }
}

fn world_info(ctx: &EnvContext<'_>) -> [f64; 4] {
    [
        ctx.time,
        ctx.current_player.identity() as f64,
        ctx.depot.x,
        ctx.depot.y,
    ]
}

fn block(ctx: &EnvContext<'_>) -> Vec<f64> {
    let mut out = Vec::with_capacity(block_len(ctx.targets.len(), ctx.drivers.len()));
    out.extend(world_info(ctx));
    for t in ctx.targets {
        out.extend(t.info_vector());
    }
    for d in ctx.drivers {
        out.extend(d.info_vector());
    }
    out
}

fn loaded_identities(d: &Driver) -> impl Iterator<Item = f64> + '_ {
    d.loaded().iter().map(|t| t.identity() as f64)
}

fn positions(ctx: &EnvContext<'_>) -> Positions {
    Positions {
        depot:   ctx.depot.as_array(),
        targets: ctx
            .targets
            .iter()
            .map(|t| [t.pickup.x, t.pickup.y, t.dropoff.x, t.dropoff.y])
            .collect(),
        drivers: ctx.drivers.iter().map(|d| d.position().as_array()).collect(),
    }
}

/// `Trans2` family.  Target ids are shifted by `id_offset`.
fn compact(ctx: &EnvContext<'_>, id_offset: u32, with_times: bool) -> StructuredObservation {
    let player = ctx.current_player.identity() as f64;
    StructuredObservation {
        world:     vec![player, player],
        targets:   ctx
            .targets
            .iter()
            .map(|t| vec![(t.id.identity() + id_offset) as f64, t.state().code() as f64])
            .collect(),
        drivers:   ctx
            .drivers
            .iter()
            .map(|d| std::iter::once(d.id.identity() as f64).chain(loaded_identities(d)).collect())
            .collect(),
        positions: positions(ctx),
        times:     with_times.then(|| Times {
            now:   ctx.time,
            forks: ctx.targets.iter().map(Target::fork_bounds).collect(),
        }),
    }
}

fn dict(ctx: &EnvContext<'_>) -> DictObservation {
    DictObservation {
        world:   DictWorld {
            time:   ctx.time,
            player: ctx.current_player.identity(),
            depot:  ctx.depot,
        },
        targets: ctx
            .targets
            .iter()
            .map(|t| DictTarget {
                id:      t.id.identity(),
                pickup:  t.pickup,
                dropoff: t.dropoff,
                start:   t.start_fork.as_array(),
                end:     t.end_fork.as_array(),
                weight:  t.weight,
                state:   t.state().code(),
            })
            .collect(),
        drivers: ctx
            .drivers
            .iter()
            .map(|d| DictDriver {
                id:       d.id.identity(),
                position: d.position(),
                capacity: d.max_capacity,
                loaded:   d.loaded().iter().map(|t| t.identity()).collect(),
            })
            .collect(),
    }
}
