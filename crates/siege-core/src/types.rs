//! Fundamental geometric and simulation types.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::DT;

/// World-space placement of an entity.
/// The defender sits at the origin; +Y is up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    /// Unit facing direction. Falls back to -Z when nothing better is known.
    pub facing: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            facing: Vec3::NEG_Z,
        }
    }
}

impl Transform {
    pub fn new(position: Vec3, facing: Vec3) -> Self {
        Self {
            position,
            facing: facing.try_normalize().unwrap_or(Vec3::NEG_Z),
        }
    }

    /// Transform at `position` facing the defender.
    pub fn facing_origin(position: Vec3) -> Self {
        Self::new(position, -position)
    }

    /// Distance to the defender.
    pub fn range(&self) -> f32 {
        self.position.length()
    }
}

/// Linear velocity in world units per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub Vec3);

/// Opaque handle the presentation layer uses to address a visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityHandle(pub u64);

/// Stable ship identifier, unique for the lifetime of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShipId(pub u32);

/// Identifier shared by every member of a formation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FormationId(pub u32);

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Seconds per tick.
    pub fn dt(&self) -> f32 {
        DT
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs += DT as f64;
    }

    /// Number of whole ticks needed to cover `secs`, at least one.
    pub fn ticks_for(secs: f32) -> u64 {
        ((secs / DT).ceil() as u64).max(1)
    }
}
