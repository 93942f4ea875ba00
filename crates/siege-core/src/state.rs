//! Game state snapshot: everything the presentation layer reads each tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::SimEvent;
use crate::types::{EntityHandle, FormationId, SimTime, Transform};

/// Complete visible state broadcast after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: SimPhase,
    pub doctrine: Doctrine,
    pub quality: Quality,
    pub ledger: LedgerView,
    pub ship_count: u32,
    pub missile_count: u32,
    pub projectile_count: u32,
    pub explosion_count: u32,
    pub formation_count: u32,
    /// Current transform of every live entity, sorted by handle.
    pub entities: Vec<EntityView>,
    /// Live formations in id order.
    pub formations: Vec<FormationView>,
    /// The defender's beam, while it is firing.
    pub beam: Option<BeamView>,
    /// Events raised since the previous snapshot, in emission order.
    pub events: Vec<SimEvent>,
}

/// Score and defender health.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerView {
    pub score: u32,
    pub health: f32,
    pub max_health: f32,
}

/// A live entity as the renderer sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityView {
    pub handle: EntityHandle,
    pub kind: EntityKind,
    pub transform: Transform,
    /// Non-zero while a ship is flashing from a hit.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub hit_flash_secs: f32,
}

/// A live formation and the handles of its remaining members.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormationView {
    pub id: FormationId,
    pub archetype: FormationArchetype,
    pub created_at_secs: f64,
    pub members: Vec<EntityHandle>,
}

/// Active defender beam.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BeamView {
    pub direction: Vec3,
    pub range: f32,
    pub remaining_secs: f32,
}

fn is_zero(value: &f32) -> bool {
    *value == 0.0
}
