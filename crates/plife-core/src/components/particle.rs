//! Particle and particle type components.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Vector;

/// Packed 32-bit ARGB color. Serialized as a signed int32.
///
/// Purely a display attribute: the physics never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub i32);

impl Color {
    pub const RED: Self = Self::from_rgb(255, 0, 0);
    pub const GREEN: Self = Self::from_rgb(0, 255, 0);
    pub const BLUE: Self = Self::from_rgb(0, 0, 255);
    pub const WHITE: Self = Self::from_rgb(255, 255, 255);

    /// Fully opaque color from 8-bit channels
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_argb(255, r, g, b)
    }

    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        let packed = ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32;
        Self(packed as i32)
    }

    /// Random opaque color (random 24-bit RGB, alpha 255)
    pub fn random_opaque(rng: &mut impl Rng) -> Self {
        Self::from_rgb(rng.gen(), rng.gen(), rng.gen())
    }

    pub fn argb(&self) -> u32 {
        self.0 as u32
    }

    pub fn alpha(&self) -> u8 {
        (self.argb() >> 24) as u8
    }

    pub fn red(&self) -> u8 {
        (self.argb() >> 16) as u8
    }

    pub fn green(&self) -> u8 {
        (self.argb() >> 8) as u8
    }

    pub fn blue(&self) -> u8 {
        self.argb() as u8
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.argb())
    }
}

/// A particle category.
///
/// `id` is dense: it always equals the type's position in the simulation's
/// type list and the row/column of the attraction matrix. Only the
/// simulation renumbers ids, so the field is not publicly writable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticleType {
    color: Color,
    id: usize,
}

impl ParticleType {
    pub fn new(color: Color, id: usize) -> Self {
        Self { color, id }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub(crate) fn set_id(&mut self, id: usize) {
        self.id = id;
    }

    pub(crate) fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

impl fmt::Display for ParticleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParticleType[{}, {}]", self.color, self.id)
    }
}

/// A single particle. The type is held by id only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vector,
    pub vel: Vector,
    pub type_id: usize,
}

impl Particle {
    pub fn new(pos: Vector, vel: Vector, type_id: usize) -> Self {
        Self { pos, vel, type_id }
    }

    /// Particle with zero velocity
    pub fn at_rest(pos: Vector, type_id: usize) -> Self {
        Self::new(pos, Vector::ZERO, type_id)
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Particle[{}, {}, {}]", self.pos, self.vel, self.type_id)
    }
}
