//! Particle Life Headless Simulation Harness
//!
//! Validates the engine without rendering: rule-table bookkeeping, the
//! force law, persistence and frame stepping. Then runs a world for a
//! number of frames and optionally writes it out.
//!
//! Usage:
//!   cargo run -p plife-simtest
//!   cargo run -p plife-simtest -- --particles 1000 --frames 200 --seed 7
//!   cargo run -p plife-simtest -- --load data/typical_world.json --verbose

use anyhow::Context;
use clap::Parser;
use plife_core::config::SimConfig;
use plife_core::persistence;
use plife_core::prelude::*;
use plife_core::systems::{force_profile, pair_force};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON config file; missing fields take the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Particles in the generated world (overrides the config)
    #[arg(short, long)]
    particles: Option<usize>,

    /// Frames to run after the checks
    #[arg(short, long, default_value_t = 100)]
    frames: usize,

    /// Seed for world generation (overrides the config)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Start from a saved JSON world instead of generating one
    #[arg(short, long)]
    load: Option<PathBuf>,

    /// Write the final world to this JSON file
    #[arg(long)]
    save: Option<PathBuf>,

    /// Print passing checks as well as failures
    #[arg(short, long)]
    verbose: bool,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut config = match &args.config {
        Some(path) => SimConfig::from_path(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(particles) = args.particles {
        config.world_particles = particles;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    println!("=== Particle Life Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Type registry and rule table stay in step
    results.extend(validate_rule_table(args.verbose));

    // 2. Force law shape
    results.extend(validate_force_law(args.verbose));

    // 3. JSON and snapshot round trips
    results.extend(validate_persistence(&config, args.verbose));

    // 4. Frame stepping
    results.extend(validate_stepping(&config, args.verbose));

    // 5. The configured run
    let mut events = EventLog::new();
    let mut sim = match &args.load {
        Some(path) => persistence::load_json_file(path, &mut events)
            .with_context(|| format!("loading world {}", path.display()))?,
        None => {
            let mut sim = Simulation::with_config(&config)?;
            let mut rng = make_rng(config.seed);
            sim.generate_random_world_with(config.world_particles, &mut rng, &mut events);
            sim
        }
    };
    results.extend(run_world(&mut sim, args.frames, args.verbose));

    if let Some(path) = &args.save {
        persistence::save_json_file(&sim, path, &mut events)
            .with_context(|| format!("saving world {}", path.display()))?;
    }

    let notable = events
        .iter()
        .filter(|e| !matches!(e.event.kind, EventKind::ParticleAdded { .. }));
    for logged in notable {
        tracing::info!("[{}] {}", logged.seq, logged.event);
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn invariants_hold(sim: &Simulation) -> bool {
    sim.matrix().dim() == sim.type_count()
        && sim.particle_types().iter().enumerate().all(|(i, t)| t.id() == i)
        && sim.particles().iter().all(|p| p.type_id < sim.type_count())
}

// ── 1. Rule Table ───────────────────────────────────────────────────────

fn validate_rule_table(verbose: bool) -> Vec<TestResult> {
    println!("--- Rule Table ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(1);
    let mut sim = Simulation::new(400.0, 400.0);

    // Random adds and removes
    let mut broken_at = None;
    for step in 0..200 {
        if rng.gen_bool(0.4) && sim.type_count() > 0 {
            let index = rng.gen_range(0..sim.type_count());
            if sim.remove_particle_type(index, &mut ()).is_err() {
                broken_at = Some(step);
                break;
            }
        } else {
            sim.add_random_particle_type(3, &mut rng, &mut ());
        }
        if !invariants_hold(&sim) {
            broken_at = Some(step);
            break;
        }
    }
    results.push(TestResult::new(
        "rules_track_types",
        broken_at.is_none(),
        match broken_at {
            None => format!("200 steps, ending with {} type(s)", sim.type_count()),
            Some(step) => format!("invariants broken at step {}", step),
        },
    ));

    // Removing a middle type keeps the surviving coefficients
    let mut sim = Simulation::new(400.0, 400.0);
    sim.generate_random_world_with(30, &mut rng, &mut ());
    let corner = (
        sim.matrix().attraction(0, 2).ok(),
        sim.matrix().attraction(2, 0).ok(),
    );
    let removed = sim.remove_particle_type(1, &mut ());
    let after = (
        sim.matrix().attraction(0, 1).ok(),
        sim.matrix().attraction(1, 0).ok(),
    );
    results.push(TestResult::new(
        "remove_keeps_survivors",
        removed.is_ok() && corner == after && invariants_hold(&sim),
        format!("{:?} -> {:?}", corner, after),
    ));

    // Out-of-range removal is refused
    let before = sim.clone();
    let refused = sim.remove_particle_type(sim.type_count(), &mut ()).is_err();
    results.push(TestResult::new(
        "remove_out_of_range_refused",
        refused && sim == before,
        "index == type count",
    ));

    if verbose {
        println!("  {} checks", results.len());
    }
    results
}

// ── 2. Force Law ────────────────────────────────────────────────────────

fn validate_force_law(verbose: bool) -> Vec<TestResult> {
    println!("--- Force Law ---");
    let mut results = Vec::new();
    let beta = 0.4;
    let eps = 1e-12;

    let samples = [
        ("repulsion_at_contact", force_profile(0.0, 0.8, beta), -1.0),
        ("continuous_at_beta", force_profile(beta, 0.8, beta), 0.0),
        ("peak_at_midpoint", force_profile((1.0 + beta) / 2.0, 0.8, beta), 0.8),
        ("zero_at_one", force_profile(1.0, 0.8, beta), 0.0),
    ];
    for (name, got, expected) in samples {
        results.push(TestResult::new(
            name,
            (got - expected).abs() < eps,
            format!("got {:.6}, expected {:.6}", got, expected),
        ));
    }

    let origin = Vector::ZERO;
    let coincident = pair_force(origin, origin, 1.0, beta, 50.0);
    results.push(TestResult::new(
        "coincident_no_force",
        coincident == Vector::ZERO,
        format!("{}", coincident),
    ));

    let outside = pair_force(origin, Vector::new(50.5, 0.0), 1.0, beta, 50.0);
    results.push(TestResult::new(
        "beyond_range_no_force",
        outside == Vector::ZERO,
        format!("{}", outside),
    ));

    let toward = pair_force(origin, Vector::new(30.0, 0.0), 1.0, beta, 50.0);
    results.push(TestResult::new(
        "attraction_points_toward",
        toward.dx > 0.0 && toward.dy == 0.0,
        format!("{}", toward),
    ));

    if verbose {
        println!("  {} checks", results.len());
    }
    results
}

// ── 3. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(config: &SimConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut results = Vec::new();

    let mut sim = match Simulation::with_config(config) {
        Ok(sim) => sim,
        Err(e) => {
            results.push(TestResult::new("persistence_setup", false, e.to_string()));
            return results;
        }
    };
    let mut rng = StdRng::seed_from_u64(3);
    sim.generate_random_world_with(200, &mut rng, &mut ());
    sim.update_n(5);

    let json = persistence::to_json_string(&sim).and_then(|s| persistence::from_json_str(&s));
    results.push(match json {
        Ok(loaded) => TestResult::new(
            "json_roundtrip",
            loaded == sim,
            format!("{} particle(s), {} type(s)", loaded.particle_count(), loaded.type_count()),
        ),
        Err(e) => TestResult::new("json_roundtrip", false, e.to_string()),
    });

    let mut buffer = Vec::new();
    let snapshot = sim
        .save(&mut buffer)
        .and_then(|_| persistence::load_snapshot(&buffer[..]));
    results.push(match snapshot {
        Ok(loaded) => TestResult::new(
            "snapshot_roundtrip",
            loaded == sim,
            format!("{} byte(s)", buffer.len()),
        ),
        Err(e) => TestResult::new("snapshot_roundtrip", false, e.to_string()),
    });

    let truncated = persistence::load_snapshot(&buffer[..buffer.len() / 2]);
    results.push(TestResult::new(
        "truncated_snapshot_rejected",
        truncated.is_err(),
        "half a snapshot",
    ));

    if verbose {
        println!("  {} checks", results.len());
    }
    results
}

// ── 4. Frame Stepping ───────────────────────────────────────────────────

fn validate_stepping(config: &SimConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Frame Stepping ---");
    let mut results = Vec::new();

    // A lone particle drifts by its velocity and is damped by friction
    let mut lone = Simulation::new(config.width, config.height);
    lone.add_particle_type(&mut ());
    let start = Particle::new(Vector::new(50.0, 30.0), Vector::new(-2.0, 4.0), 0);
    let added = lone.add_particle(start, &mut ());
    lone.update();
    let p = lone.particles().first().copied();
    let friction = lone.matrix().friction();
    results.push(TestResult::new(
        "lone_particle_drifts",
        added.is_ok()
            && p.is_some_and(|p| {
                p.pos == Vector::new(48.0, 34.0) && p.vel == Vector::new(-2.0, 4.0) * friction
            }),
        format!("{:?}", p),
    ));

    // Two copies stepped independently stay identical
    let mut a = Simulation::new(config.width, config.height);
    a.generate_random_world_with(150, &mut StdRng::seed_from_u64(4), &mut ());
    let mut b = a.clone();
    a.update_n(20);
    b.update_n(20);
    results.push(TestResult::new(
        "stepping_deterministic",
        a == b,
        "150 particles, 20 frames",
    ));

    if verbose {
        println!("  {} checks", results.len());
    }
    results
}

// ── 5. Run ──────────────────────────────────────────────────────────────

fn run_world(sim: &mut Simulation, frames: usize, verbose: bool) -> Vec<TestResult> {
    println!("--- Run ---");
    let mut results = Vec::new();

    tracing::info!(
        "Running {} frame(s): {} particle(s), {} type(s)",
        frames,
        sim.particle_count(),
        sim.type_count()
    );
    let counts_before: Vec<usize> = (0..sim.type_count()).map(|t| sim.count_of_type(t)).collect();

    let started = std::time::Instant::now();
    sim.update_n(frames);
    let elapsed = started.elapsed();

    let counts_after: Vec<usize> = (0..sim.type_count()).map(|t| sim.count_of_type(t)).collect();
    results.push(TestResult::new(
        "population_conserved",
        counts_before == counts_after,
        format!("{:?}", counts_after),
    ));

    let non_finite = sim
        .particles()
        .iter()
        .filter(|p| {
            ![p.pos.dx, p.pos.dy, p.vel.dx, p.vel.dy]
                .iter()
                .all(|v| v.is_finite())
        })
        .count();
    results.push(TestResult::new(
        "state_finite",
        non_finite == 0,
        format!("{} non-finite particle(s)", non_finite),
    ));

    results.push(TestResult::new(
        "invariants_after_run",
        invariants_hold(sim),
        format!("{} type(s)", sim.type_count()),
    ));

    let per_frame = if frames > 0 {
        elapsed.as_secs_f64() * 1000.0 / frames as f64
    } else {
        0.0
    };
    tracing::info!("Ran {} frame(s) in {:.2?} ({:.3} ms/frame)", frames, elapsed, per_frame);
    if verbose {
        println!("  {} checks", results.len());
    }
    results
}
