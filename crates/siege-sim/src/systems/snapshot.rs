//! Snapshot system: reads the world and builds a `GameStateSnapshot`.
//!
//! Read-only with respect to the world. Events are handed in already drained.

use siege_core::components::Ship;
use siege_core::enums::{Doctrine, EntityKind, Quality, SimPhase};
use siege_core::events::SimEvent;
use siege_core::state::{EntityView, FormationView, GameStateSnapshot};
use siege_core::types::{SimTime, Transform};

use crate::ledger::Ledger;
use crate::registry::{handle_of, Registry};
use crate::systems::weapons::Defender;

pub struct SnapshotInput<'a> {
    pub registry: &'a Registry,
    pub ledger: &'a Ledger,
    pub defender: &'a Defender,
    pub time: SimTime,
    pub phase: SimPhase,
    pub doctrine: Doctrine,
    pub quality: Quality,
}

pub fn build_snapshot(input: SnapshotInput<'_>, events: Vec<SimEvent>) -> GameStateSnapshot {
    let counts = input.registry.counts();
    GameStateSnapshot {
        time: input.time,
        phase: input.phase,
        doctrine: input.doctrine,
        quality: input.quality,
        ledger: input.ledger.view(),
        ship_count: counts.ships as u32,
        missile_count: counts.missiles as u32,
        projectile_count: counts.beams as u32,
        explosion_count: counts.explosions as u32,
        formation_count: input.registry.formations().count() as u32,
        entities: build_entities(input.registry),
        formations: build_formations(input.registry),
        beam: input.defender.beam_view(),
        events,
    }
}

fn build_entities(registry: &Registry) -> Vec<EntityView> {
    let mut entities: Vec<EntityView> = registry
        .world()
        .query::<(&EntityKind, &Transform, Option<&Ship>)>()
        .iter()
        .map(|(entity, (kind, transform, ship))| EntityView {
            handle: handle_of(entity),
            kind: *kind,
            transform: *transform,
            hit_flash_secs: ship.map_or(0.0, |s| s.hit_flash_secs),
        })
        .collect();
    entities.sort_by_key(|view| view.handle);
    entities
}

fn build_formations(registry: &Registry) -> Vec<FormationView> {
    registry
        .formations()
        .map(|formation| FormationView {
            id: formation.id,
            archetype: formation.archetype,
            created_at_secs: formation.created_at_secs,
            members: formation
                .members
                .iter()
                .map(|slot| handle_of(slot.entity))
                .collect(),
        })
        .collect()
}
