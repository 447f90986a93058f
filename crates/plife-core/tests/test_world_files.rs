//! Integration tests for loading and saving simulation files.
//!
//! Exercises: JSON fixture → Simulation → stepping → file → Simulation

use plife_core::events::EventLog;
use plife_core::persistence::{self, SaveError};
use plife_core::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

const EMPTY_WORLD: &str = include_str!("../../../data/empty_world.json");
const TYPICAL_WORLD: &str = include_str!("../../../data/typical_world.json");

// ── Helpers ────────────────────────────────────────────────────────────

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("plife-{}-{}.json", name, std::process::id()))
}

fn populated(seed: u64) -> Simulation {
    let mut sim = Simulation::new(640.0, 480.0);
    let mut rng = StdRng::seed_from_u64(seed);
    sim.generate_random_world_with(60, &mut rng, &mut ());
    sim.add_random_particle_type(15, &mut rng, &mut ());
    sim.update_n(10);
    sim
}

// ── Fixtures ───────────────────────────────────────────────────────────

#[test]
fn empty_world_loads_with_defaults() {
    let sim = persistence::from_json_str(EMPTY_WORLD).unwrap();

    assert_eq!(sim.width(), 800.0);
    assert_eq!(sim.height(), 600.0);
    assert_eq!(sim.particle_count(), 0);
    assert_eq!(sim.type_count(), 0);

    let m = sim.matrix();
    assert_eq!(m.dim(), 0);
    assert_eq!(m.friction(), 0.7);
    assert_eq!(m.beta(), 0.4);
    assert_eq!(m.range(), 50.0);
}

#[test]
fn typical_world_loads_every_field() {
    let sim = persistence::from_json_str(TYPICAL_WORLD).unwrap();

    assert_eq!(sim.width(), 1280.0);
    assert_eq!(sim.height(), 720.0);

    let particles = sim.particles();
    assert_eq!(particles.len(), 2);
    assert_eq!(particles[0].pos, Vector::new(100.0, 200.0));
    assert_eq!(particles[0].vel, Vector::new(1.0, 2.0));
    assert_eq!(particles[0].type_id, 0);
    assert_eq!(particles[1].pos, Vector::new(0.0, 350.0));
    assert_eq!(particles[1].vel, Vector::new(-4.0, 3.0));
    assert_eq!(particles[1].type_id, 2);

    let types = sim.particle_types();
    assert_eq!(types.len(), 3);
    assert_eq!(types[0], ParticleType::new(Color(4141), 0));
    assert_eq!(types[1], ParticleType::new(Color(0), 1));
    assert_eq!(types[2], ParticleType::new(Color(-1), 2));

    let m = sim.matrix();
    assert_eq!(m.dim(), 3);
    assert_eq!(m.attraction(0, 1).unwrap(), -0.25);
    assert_eq!(m.attraction(2, 1).unwrap(), 0.125);
    assert_eq!(m.friction(), 0.9);
    assert_eq!(m.beta(), 0.3);
    assert_eq!(m.range(), 100.0);
}

#[test]
fn typical_world_steps_after_load() {
    let mut sim = persistence::from_json_str(TYPICAL_WORLD).unwrap();

    // The two particles are ~180 apart, beyond range, so only friction acts
    sim.update();
    let p = sim.particles()[0];
    assert_eq!(p.pos, Vector::new(101.0, 202.0));
    assert_eq!(p.vel, Vector::new(1.0, 2.0) * 0.9);
}

#[test]
fn load_json_replaces_existing_state() {
    let mut sim = populated(1);
    sim.load_json(TYPICAL_WORLD.as_bytes()).unwrap();
    assert_eq!(sim.type_count(), 3);
    assert_eq!(sim.particle_count(), 2);
}

#[test]
fn failed_load_leaves_state_untouched() {
    let mut sim = populated(2);
    let before = sim.clone();

    let broken = TYPICAL_WORLD.replace("\"id\": 2 }\n  ]", "\"id\": 7 }\n  ]");
    let err = sim.load_json(broken.as_bytes()).unwrap_err();
    assert!(matches!(err, SaveError::NonDenseTypeId { index: 2, id: 7 }));
    assert_eq!(sim, before);
}

// ── Files ──────────────────────────────────────────────────────────────

#[test]
fn populated_world_survives_file_round_trip() {
    let sim = populated(3);
    let path = temp_path("roundtrip");
    let mut events = EventLog::new();

    persistence::save_json_file(&sim, &path, &mut events).unwrap();
    let loaded = persistence::load_json_file(&path, &mut events).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded, sim);
    assert_eq!(
        events.count_matching(|k| matches!(k, EventKind::Saved { .. })),
        1
    );
    assert_eq!(
        events.count_matching(|k| matches!(k, EventKind::Loaded { .. })),
        1
    );
}

#[test]
fn loaded_world_evolves_identically() {
    let mut original = populated(4);
    let path = temp_path("evolve");

    persistence::save_json_file(&original, &path, &mut ()).unwrap();
    let mut loaded = persistence::load_json_file(&path, &mut ()).unwrap();
    let _ = std::fs::remove_file(&path);

    original.update_n(25);
    loaded.update_n(25);
    assert_eq!(loaded.particles(), original.particles());
}

#[test]
fn pretty_output_reloads() {
    let sim = populated(5);
    let pretty = persistence::to_json_string_pretty(&sim).unwrap();
    assert!(pretty.contains("\"particleTypes\""));
    assert!(pretty.contains("\"attractionMatrix\""));
    assert_eq!(persistence::from_json_str(&pretty).unwrap(), sim);
}

#[test]
fn snapshot_and_json_agree() {
    let sim = populated(6);

    let mut binary = Vec::new();
    sim.save(&mut binary).unwrap();
    let mut json = Vec::new();
    sim.save_json(&mut json).unwrap();

    let from_binary = persistence::load_snapshot(&binary[..]).unwrap();
    let from_json = persistence::read_json(&json[..]).unwrap();
    assert_eq!(from_binary, from_json);
}
