//! Formation constructors: one per archetype.
//!
//! Each constructor stops adding members once the ship pool is within
//! `FORMATION_RESERVED_SLOTS` of its effective cap, so a formation may come
//! out partial or empty. An empty formation is discarded.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use siege_core::components::{Behavior, FormationMember};
use siege_core::constants::*;
use siege_core::enums::{FormationArchetype, FormationRole, OrbitPhase, PincerPhase, ShipType};
use siege_core::events::SimEvent;
use siege_core::types::FormationId;

use siege_ai::geometry::{
    escort_orbit_point, phased_angles, pincer_group_offsets, random_sphere_point, v_formation_slots,
    FormationBasis,
};
use siege_ai::profiles::roll_speed;

use crate::registry::{Registry, ShipSpawn};

/// Spawn one formation of `archetype`. Returns its id if at least one
/// member made it into the world.
pub fn spawn_formation(
    registry: &mut Registry,
    rng: &mut ChaCha8Rng,
    archetype: FormationArchetype,
    now_secs: f64,
) -> Option<FormationId> {
    if !registry.formation_has_room() {
        tracing::debug!(?archetype, "formation skipped: ship pool near capacity");
        return None;
    }
    let id = match registry.create_formation(archetype, now_secs) {
        Ok(id) => id,
        Err(err) => {
            tracing::debug!(%err, ?archetype, "formation dropped");
            return None;
        }
    };

    let members = match archetype {
        FormationArchetype::VFormation => spawn_v_formation(registry, rng, id),
        FormationArchetype::Pincer => spawn_pincer(registry, rng, id),
        FormationArchetype::BomberEscort => spawn_bomber_escort(registry, rng, id),
        FormationArchetype::OrbitStrafe => spawn_orbit_strafe(registry, rng, id),
    };

    if members == 0 {
        registry.discard_if_empty(id);
        return None;
    }

    tracing::info!(formation = id.0, ?archetype, members, "formation spawned");
    registry.emit(SimEvent::FormationSpawned {
        formation: id,
        archetype,
        members,
    });
    Some(id)
}

/// Add one member if the reserve allows it.
fn add_member(
    registry: &mut Registry,
    formation: FormationId,
    role: FormationRole,
    ship_type: ShipType,
    position: Vec3,
    speed: f32,
    behavior: Behavior,
) -> bool {
    if !registry.formation_has_room() {
        return false;
    }
    let spawn = ShipSpawn {
        ship_type,
        position,
        speed,
        behavior,
        membership: Some(FormationMember { formation, role }),
    };
    match registry.spawn_ship(spawn) {
        Ok(_) => true,
        Err(err) => {
            tracing::debug!(%err, formation = formation.0, ?role, "formation member dropped");
            false
        }
    }
}

fn spawn_v_formation(registry: &mut Registry, rng: &mut ChaCha8Rng, id: FormationId) -> u32 {
    let leader = random_sphere_point(rng, SPAWN_RADIUS);
    let Some(basis) = FormationBasis::toward_origin(leader) else {
        return 0;
    };
    let behavior = Behavior::VFormation {
        heading: basis.forward,
    };

    let mut added = 0;
    for (role, offset) in v_formation_slots() {
        let ship_type = match role {
            FormationRole::FarWing => ShipType::Interceptor,
            _ => ShipType::Fighter,
        };
        let position = leader + basis.to_world(offset);
        if add_member(registry, id, role, ship_type, position, V_FORMATION_SPEED, behavior) {
            added += 1;
        }
    }
    added
}

fn spawn_pincer(registry: &mut Registry, rng: &mut ChaCha8Rng, id: FormationId) -> u32 {
    let axis = random_sphere_point(rng, SPAWN_RADIUS);
    let behavior = Behavior::Pincer {
        phase: PincerPhase::Approach,
        phase_elapsed_secs: 0.0,
    };

    let mut added = 0;
    for (group, center) in [(0u8, axis), (1u8, -axis)] {
        let Some(basis) = FormationBasis::toward_origin(center) else {
            continue;
        };
        for offset in pincer_group_offsets(PINCER_GROUP_SIZE) {
            let ship_type = if rng.gen_bool(0.5) {
                ShipType::Fighter
            } else {
                ShipType::Interceptor
            };
            let position = center + basis.to_world(offset);
            let role = FormationRole::PincerGroup(group);
            if add_member(registry, id, role, ship_type, position, PINCER_SPEED, behavior) {
                added += 1;
            }
        }
    }
    added
}

fn spawn_bomber_escort(registry: &mut Registry, rng: &mut ChaCha8Rng, id: FormationId) -> u32 {
    let anchor = random_sphere_point(rng, SPAWN_RADIUS);
    let speed = roll_speed(rng, ShipType::Bomber) * ESCORTED_BOMBER_SPEED_FACTOR;
    if !add_member(
        registry,
        id,
        FormationRole::Bomber,
        ShipType::Bomber,
        anchor,
        speed,
        Behavior::EscortedBomber,
    ) {
        return 0;
    }

    let mut added = 1;
    let count = rng.gen_range(ESCORT_MIN..=ESCORT_MAX);
    let offset = rng.gen_range(0.0..TAU);
    for orbit_angle in phased_angles(count, offset) {
        let speed = roll_speed(rng, ShipType::Interceptor);
        let position = escort_orbit_point(anchor, orbit_angle);
        if add_member(
            registry,
            id,
            FormationRole::Escort,
            ShipType::Interceptor,
            position,
            speed,
            Behavior::EscortProtect { orbit_angle },
        ) {
            added += 1;
        }
    }
    added
}

fn spawn_orbit_strafe(registry: &mut Registry, rng: &mut ChaCha8Rng, id: FormationId) -> u32 {
    let base = random_sphere_point(rng, SPAWN_RADIUS);
    // Flatten toward the orbit plane so the group never bunches at a pole.
    let height = base.y * 0.5;
    let ring = (SPAWN_RADIUS * SPAWN_RADIUS - height * height).sqrt();
    let count = rng.gen_range(ORBIT_GROUP_MIN..=ORBIT_GROUP_MAX);
    let offset = base.z.atan2(base.x);
    let behavior = Behavior::OrbitStrafe {
        phase: OrbitPhase::Approach,
        angle: 0.0,
        radius: 0.0,
        height: 0.0,
    };

    let mut added = 0;
    for azimuth in phased_angles(count, offset) {
        let position = Vec3::new(ring * azimuth.cos(), height, ring * azimuth.sin());
        if add_member(
            registry,
            id,
            FormationRole::Orbiter,
            ShipType::Fighter,
            position,
            ORBIT_APPROACH_SPEED,
            behavior,
        ) {
            added += 1;
        }
    }
    added
}
