//! rollout: random-policy episodes on the sequential dial-a-ride environment.
//!
//! Each episode builds its own environment from a shared [`EnvConfig`] and a
//! seed derived from the root seed, then drives it with a uniformly random
//! policy until `done`.  Episodes are independent, so `--parallel` fans them
//! out over rayon without changing any result.
//!
//! ```text
//! RUST_LOG=darp_env=debug cargo run -p rollout -- --episodes 4 --verbose
//! cargo run -p rollout --release -- --dataset data/a2-16.txt --test-env
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use darp_core::SimRng;
use darp_env::{EnvBuilder, EnvConfig, RepresentationKind, RewardKind};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Offset separating the policy stream from the environment stream.
const POLICY_STREAM: u64 = 0x5eed;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "rollout", about = "Random-policy rollouts of the sequential DARP environment")]
struct Args {
    /// JSON `EnvConfig`; missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cordeau-format instance file; its shape overrides the config.
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Replay the dataset instance itself rather than random look-alikes.
    #[arg(long)]
    test_env: bool,

    #[arg(long, default_value_t = 10)]
    episodes: usize,

    /// Root seed; each episode derives its own.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// constant | constant_distribution | distance
    #[arg(long)]
    reward: Option<String>,

    /// block | trans | trans2 | trans25 | trans3 | dict
    #[arg(long)]
    representation: Option<String>,

    /// Probability that the policy waits instead of aiming at a target.
    #[arg(long, default_value_t = 0.1)]
    wait_rate: f64,

    #[arg(long)]
    parallel: bool,

    /// Write one CSV row per episode here.
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Print the rendered state after every step of the first episode.
    #[arg(long)]
    verbose: bool,
}

// ── Summary ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct EpisodeSummary {
    episode:           usize,
    seed:              u64,
    steps:             u64,
    targets:           usize,
    delivered:         usize,
    total_distance:    f64,
    cumulative_reward: f64,
    gap:               f64,
    fit_solution:      bool,
    final_time:        f64,
}

fn write_summary(path: &Path, rows: &[EpisodeSummary]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

// ── Configuration ─────────────────────────────────────────────────────────────

fn load_config(args: &Args) -> Result<EnvConfig> {
    let mut config: EnvConfig = match &args.config {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            serde_json::from_reader(file).with_context(|| format!("parsing {}", path.display()))?
        }
        None => EnvConfig::default(),
    };
    if args.dataset.is_some() {
        config.dataset = args.dataset.clone();
    }
    config.test_env |= args.test_env;
    if let Some(name) = &args.reward {
        config.reward = RewardKind::parse(name).with_context(|| format!("unknown reward `{name}`"))?;
    }
    if let Some(name) = &args.representation {
        config.representation = RepresentationKind::parse(name)
            .with_context(|| format!("unknown representation `{name}`"))?;
    }
    Ok(config)
}

// ── Episode ───────────────────────────────────────────────────────────────────

fn run_episode(
    config:    &EnvConfig,
    episode:   usize,
    seed:      u64,
    wait_rate: f64,
    verbose:   bool,
) -> Result<EpisodeSummary> {
    let config = EnvConfig { seed, ..config.clone() };
    let mut env = EnvBuilder::from_config(config)?.build()?;
    let mut policy = SimRng::new(seed).child(POLICY_STREAM);

    env.reset()?;
    let targets = env.target_population();
    let info = loop {
        let action = if targets == 0 || policy.gen_bool(wait_rate) {
            0
        } else {
            policy.gen_range(1..=targets)
        };
        let step = env.step(action)?;
        if verbose {
            print!("{}", env.render());
        }
        if step.done {
            break step.info;
        }
    };

    Ok(EpisodeSummary {
        episode,
        seed,
        steps: env.current_step(),
        targets,
        delivered: info.delivered,
        total_distance: env.total_distance(),
        cumulative_reward: env.cumulative_reward(),
        gap: info.gap,
        fit_solution: info.fit_solution,
        final_time: env.time(),
    })
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if !(0.0..=1.0).contains(&args.wait_rate) {
        bail!("--wait-rate must lie in [0, 1], got {}", args.wait_rate);
    }
    let config = load_config(&args)?;
    // Fail on a bad config before spawning anything.
    EnvBuilder::from_config(config.clone())?.build()?;

    println!("=== rollout — sequential dial-a-ride ===");
    println!(
        "Episodes: {}  |  Targets: {}  |  Drivers: {}  |  Reward: {:?}  |  Seed: {}",
        args.episodes, config.target_population, config.driver_population, config.reward, args.seed
    );

    let mut root = SimRng::new(args.seed);
    let seeds: Vec<u64> = (0..args.episodes)
        .map(|i| root.child(i as u64).random())
        .collect();

    let started = Instant::now();
    let run = |(i, &seed): (usize, &u64)| {
        run_episode(&config, i, seed, args.wait_rate, args.verbose && i == 0)
    };
    let rows: Vec<EpisodeSummary> = if args.parallel {
        seeds.par_iter().enumerate().map(run).collect::<Result<_>>()?
    } else {
        seeds.iter().enumerate().map(run).collect::<Result<_>>()?
    };
    let elapsed = started.elapsed();

    for row in &rows {
        println!(
            "episode {:>3}  steps {:>4}  delivered {:>3}/{:<3}  distance {:>9.3}  reward {:>9.3}  gap {:>7.2}",
            row.episode, row.steps, row.delivered, row.targets, row.total_distance,
            row.cumulative_reward, row.gap,
        );
    }

    let fit = rows.iter().filter(|r| r.fit_solution).count();
    let mean_reward = if rows.is_empty() {
        0.0
    } else {
        rows.iter().map(|r| r.cumulative_reward).sum::<f64>() / rows.len() as f64
    };
    info!(episodes = rows.len(), fit, mean_reward, elapsed_ms = elapsed.as_millis() as u64, "rollouts finished");
    if fit == 0 && !rows.is_empty() {
        warn!("no episode delivered every request");
    }

    if let Some(path) = &args.summary {
        write_summary(path, &rows)?;
        println!("Summary written to {}", path.display());
    }
    Ok(())
}
