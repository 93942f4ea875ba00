//! ECS components for hecs entities.
//!
//! Components are plain data structs with no game logic.
//! Behavior lives in the AI crate and the sim systems.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{FormationId, ShipId};

/// A hostile ship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub id: ShipId,
    pub ship_type: ShipType,
    /// Never negative; the ship is removed in the tick it reaches zero.
    pub health: f32,
    pub max_health: f32,
    /// Cruise speed assigned at spawn.
    pub speed: f32,
    /// Simulation time of the last shot, `None` until the first one.
    pub last_fire_secs: Option<f64>,
    /// Remaining hit-flash time.
    pub hit_flash_secs: f32,
}

/// Per-ship AI state. Each archetype carries its own phase sub-state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "behavior")]
pub enum Behavior {
    /// Lockstep V-formation member. Every member shares the leader's heading.
    VFormation { heading: Vec3 },
    Pincer {
        phase: PincerPhase,
        phase_elapsed_secs: f32,
    },
    /// The bomber at the center of an escort formation.
    EscortedBomber,
    /// Escort orbiting its formation's bomber.
    EscortProtect { orbit_angle: f32 },
    OrbitStrafe {
        phase: OrbitPhase,
        angle: f32,
        radius: f32,
        height: f32,
    },
    /// Fly straight at the defender. Also the fallback for unknown tags.
    #[default]
    #[serde(other)]
    Default,
}

impl Behavior {
    /// Whether the ship is in an active strafe run (reduced weapon cooldown).
    pub fn is_strafing(&self) -> bool {
        matches!(
            self,
            Behavior::Pincer {
                phase: PincerPhase::Strafe,
                ..
            } | Behavior::OrbitStrafe {
                phase: OrbitPhase::Strafe,
                ..
            }
        )
    }

    pub fn is_escort(&self) -> bool {
        matches!(self, Behavior::EscortProtect { .. })
    }
}

/// Formation membership. Members carry the formation id and their role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FormationMember {
    pub formation: FormationId,
    pub role: FormationRole,
}

/// Defender-fired missile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Missile {
    pub age_secs: f32,
    pub max_age_secs: f32,
    pub damage: f32,
}

/// Enemy-fired beam or plasma bolt travelling toward the defender.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Projectile {
    pub weapon: WeaponKind,
    pub damage: f32,
    pub age_secs: f32,
    pub ttl_secs: f32,
}

/// Decorative explosion. No further interaction once spawned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Explosion {
    pub size: ExplosionSize,
    /// Visual size hint in world units.
    pub scale: f32,
    pub ttl_secs: f32,
}
