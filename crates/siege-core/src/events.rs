//! Events emitted by the simulation for the presentation layer.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{EntityHandle, FormationId, Transform};

/// Something that happened during a tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// A renderer should create a visual for `handle`.
    Spawned {
        handle: EntityHandle,
        kind: EntityKind,
        transform: Transform,
    },
    /// The visual for `handle` should be torn down.
    Removed {
        handle: EntityHandle,
        kind: EntityKind,
    },
    /// A ship was killed by defender fire.
    ShipDestroyed {
        handle: EntityHandle,
        ship_type: ShipType,
        reward: u32,
    },
    /// The defender took damage.
    DefenderHit { damage: f32, source: DamageSource },
    FormationSpawned {
        formation: FormationId,
        archetype: FormationArchetype,
        members: u32,
    },
    /// A bomber died and its escorts reverted to default behavior.
    EscortsReleased { formation: FormationId, count: u32 },
    /// Defender health reached zero.
    DefenderDown,
}
