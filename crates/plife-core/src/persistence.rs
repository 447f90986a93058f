//! Save/Load functionality for persisting simulation state
//!
//! Two formats share one record layout:
//! - JSON, the interchange format read and written by front ends
//! - a versioned bincode snapshot for compact binary saves
//!
//! The JSON layout is:
//!
//! ```text
//! Simulation       := { width, height, particles: [Particle],
//!                       particleTypes: [ParticleType], attractionMatrix }
//! Particle         := { pos: Vector, vel: Vector, type: ParticleType }
//! ParticleType     := { color: int32 (packed ARGB), id }
//! Vector           := { dx, dy }
//! AttractionMatrix := { attractions: [[float]], friction, beta, range }
//! ```
//!
//! Records are validated before a [`Simulation`] is built from them, so a
//! loaded simulation always satisfies the engine's invariants.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

use crate::components::{Particle, ParticleType, Vector};
use crate::engine::Simulation;
use crate::error::SimError;
use crate::events::{EventKind, EventSink, SimEvent};
use crate::matrix::AttractionMatrix;

/// Version number for snapshot format (increment when format changes)
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable form of a whole simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRecord {
    pub width: f64,
    pub height: f64,
    pub particles: Vec<ParticleRecord>,
    pub particle_types: Vec<ParticleType>,
    pub attraction_matrix: MatrixRecord,
}

/// A particle with its type written out in full
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleRecord {
    pub pos: Vector,
    pub vel: Vector,
    #[serde(rename = "type")]
    pub particle_type: ParticleType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixRecord {
    pub attractions: Vec<Vec<f64>>,
    pub friction: f64,
    pub beta: f64,
    pub range: f64,
}

/// Binary snapshot wrapper
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Snapshot format version
    pub version: u32,
    pub simulation: SimulationRecord,
}

/// Errors that can occur during save/load
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("attraction matrix row {row} has {len} entries, expected {dim}")]
    NonSquareMatrix { row: usize, len: usize, dim: usize },
    #[error("attraction matrix is {matrix}x{matrix} but {types} particle type(s) are listed")]
    DimensionMismatch { matrix: usize, types: usize },
    #[error("particle type at position {index} has id {id}; ids must equal their position")]
    NonDenseTypeId { index: usize, id: usize },
    #[error("particle {particle} references unknown type id {type_id} ({count} type(s) listed)")]
    UnknownParticleType {
        particle: usize,
        type_id: usize,
        count: usize,
    },
    #[error("invalid parameter: {0}")]
    InvalidParameter(#[from] SimError),
}

impl From<&Simulation> for SimulationRecord {
    fn from(sim: &Simulation) -> Self {
        let particles = sim
            .particles()
            .iter()
            .map(|p| ParticleRecord {
                pos: p.pos,
                vel: p.vel,
                particle_type: sim.particle_types()[p.type_id],
            })
            .collect();

        let matrix = sim.matrix();
        Self {
            width: sim.width(),
            height: sim.height(),
            particles,
            particle_types: sim.particle_types().to_vec(),
            attraction_matrix: MatrixRecord {
                attractions: matrix.to_rows(),
                friction: matrix.friction(),
                beta: matrix.beta(),
                range: matrix.range(),
            },
        }
    }
}

impl TryFrom<SimulationRecord> for Simulation {
    type Error = SaveError;

    /// Particles keep only their type's id; the registry's color wins over
    /// the copy embedded in each particle.
    fn try_from(record: SimulationRecord) -> Result<Self, SaveError> {
        let rows = &record.attraction_matrix.attractions;
        let dim = rows.len();
        if let Some((row, values)) = rows.iter().enumerate().find(|(_, r)| r.len() != dim) {
            return Err(SaveError::NonSquareMatrix {
                row,
                len: values.len(),
                dim,
            });
        }

        let types = record.particle_types.len();
        if dim != types {
            return Err(SaveError::DimensionMismatch { matrix: dim, types });
        }

        for (index, particle_type) in record.particle_types.iter().enumerate() {
            if particle_type.id() != index {
                return Err(SaveError::NonDenseTypeId {
                    index,
                    id: particle_type.id(),
                });
            }
        }

        let particles = record
            .particles
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let type_id = p.particle_type.id();
                if type_id < types {
                    Ok(Particle::new(p.pos, p.vel, type_id))
                } else {
                    Err(SaveError::UnknownParticleType {
                        particle: i,
                        type_id,
                        count: types,
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let m = &record.attraction_matrix;
        let matrix = AttractionMatrix::from_rows(rows, m.friction, m.beta, m.range)?;

        Ok(Simulation::from_parts(
            record.width,
            record.height,
            particles,
            record.particle_types,
            matrix,
        ))
    }
}

fn into_simulation(record: SimulationRecord) -> Result<Simulation, SaveError> {
    Simulation::try_from(record).map_err(|e| {
        log::warn!("Rejected simulation data: {}", e);
        e
    })
}

/// Serialize to a compact JSON string
pub fn to_json_string(sim: &Simulation) -> Result<String, SaveError> {
    Ok(serde_json::to_string(&SimulationRecord::from(sim))?)
}

/// Serialize to an indented JSON string
pub fn to_json_string_pretty(sim: &Simulation) -> Result<String, SaveError> {
    Ok(serde_json::to_string_pretty(&SimulationRecord::from(sim))?)
}

pub fn from_json_str(json: &str) -> Result<Simulation, SaveError> {
    let record: SimulationRecord = serde_json::from_str(json)?;
    into_simulation(record)
}

/// Write the JSON form to a writer
pub fn write_json<W: Write>(sim: &Simulation, writer: W) -> Result<(), SaveError> {
    serde_json::to_writer(writer, &SimulationRecord::from(sim))?;
    Ok(())
}

/// Read and validate the JSON form from a reader
pub fn read_json<R: Read>(reader: R) -> Result<Simulation, SaveError> {
    let record: SimulationRecord = serde_json::from_reader(reader)?;
    into_simulation(record)
}

/// Write the JSON form to a file, creating or truncating it
pub fn save_json_file(
    sim: &Simulation,
    path: impl AsRef<Path>,
    events: &mut impl EventSink,
) -> Result<(), SaveError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_json(sim, &mut writer)?;
    writer.flush()?;

    log::info!("Saved {} particle(s) to {}", sim.particle_count(), path.display());
    events.record(SimEvent::new(EventKind::Saved {
        target: path.display().to_string(),
    }));
    Ok(())
}

/// Read a JSON file
pub fn load_json_file(
    path: impl AsRef<Path>,
    events: &mut impl EventSink,
) -> Result<Simulation, SaveError> {
    let path = path.as_ref();
    let sim = read_json(BufReader::new(File::open(path)?))?;

    log::info!("Loaded {} particle(s) from {}", sim.particle_count(), path.display());
    events.record(SimEvent::new(EventKind::Loaded {
        source: path.display().to_string(),
    }));
    Ok(sim)
}

/// Save a binary snapshot to a writer
pub fn save_snapshot<W: Write>(sim: &Simulation, writer: W) -> Result<(), SaveError> {
    let save_data = SaveData {
        version: SNAPSHOT_VERSION,
        simulation: SimulationRecord::from(sim),
    };

    bincode::serialize_into(writer, &save_data)?;
    Ok(())
}

/// Load a binary snapshot from a reader
pub fn load_snapshot<R: Read>(reader: R) -> Result<Simulation, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SNAPSHOT_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SNAPSHOT_VERSION,
            found: save_data.version,
        });
    }

    into_simulation(save_data.simulation)
}
