//! Collision and damage resolver.
//!
//! The only stage that touches the ledger. Runs four passes in a fixed
//! order: ships ramming the defender, missiles against ships, the
//! hit-scan beam, then enemy projectiles against the defender. Anything
//! destroyed here is gone before the next pass looks at the world.

use glam::Vec3;
use hecs::Entity;

use siege_core::components::{Missile, Projectile, Ship};
use siege_core::constants::*;
use siege_core::enums::{DamageSource, ExplosionSize, WeaponKind};
use siege_core::events::SimEvent;
use siege_core::types::{ShipId, Transform};

use siege_ai::profiles::{get_profile, get_weapon};

use crate::ledger::Ledger;
use crate::registry::{handle_of, Registry};
use crate::systems::weapons::Defender;

#[derive(Debug, Clone, Copy)]
struct ShipHull {
    id: ShipId,
    entity: Entity,
    position: Vec3,
    radius: f32,
}

pub fn run(registry: &mut Registry, ledger: &mut Ledger, defender: &Defender, dt: f32) {
    resolve_ramming(registry, ledger);
    resolve_missiles(registry, ledger);
    if let Some(beam) = defender.beam() {
        resolve_beam(registry, ledger, beam.direction, BEAM_DAMAGE_PER_SEC * dt);
    }
    resolve_projectiles(registry, ledger);
}

/// Whether a point at `offset` from the defender lies strictly inside the
/// beam cone and within beam range.
pub fn in_beam_cone(direction: Vec3, offset: Vec3) -> bool {
    let distance = offset.length();
    if distance <= 0.0 || distance > BEAM_RANGE {
        return false;
    }
    (offset / distance).dot(direction) > BEAM_CONE_COS
}

fn live_hulls(registry: &Registry) -> Vec<ShipHull> {
    let mut hulls: Vec<ShipHull> = registry
        .world()
        .query::<(&Ship, &Transform)>()
        .iter()
        .map(|(entity, (ship, transform))| ShipHull {
            id: ship.id,
            entity,
            position: transform.position,
            radius: get_profile(ship.ship_type).radius,
        })
        .collect();
    hulls.sort_by_key(|hull| hull.id);
    hulls
}

fn spawn_explosion(registry: &mut Registry, size: ExplosionSize, position: Vec3) {
    if let Err(err) = registry.spawn_explosion(size, position) {
        tracing::debug!(%err, ?size, "explosion dropped");
    }
}

fn resolve_ramming(registry: &mut Registry, ledger: &mut Ledger) {
    for hull in live_hulls(registry) {
        if hull.position.length() >= DEFENDER_RADIUS + hull.radius {
            continue;
        }
        let damage = ledger.record_collision();
        registry.emit(SimEvent::DefenderHit {
            damage,
            source: DamageSource::Collision,
        });
        spawn_explosion(registry, ExplosionSize::Large, hull.position);
        let _ = registry.despawn(hull.entity);
    }
}

/// Apply weapon damage to a ship. A kill scores the ship and leaves a large
/// explosion; a surviving ship flashes, and leaves a spark if `spark` is set.
/// Returns whether the ship was destroyed.
fn damage_ship(
    registry: &mut Registry,
    ledger: &mut Ledger,
    entity: Entity,
    damage: f32,
    spark: bool,
) -> bool {
    let (ship_type, position, health) = {
        let Ok((ship, transform)) = registry
            .world_mut()
            .query_one_mut::<(&mut Ship, &Transform)>(entity)
        else {
            return false;
        };
        ship.health = (ship.health - damage).max(0.0);
        if ship.health > 0.0 {
            ship.hit_flash_secs = HIT_FLASH_SECS;
        }
        (ship.ship_type, transform.position, ship.health)
    };

    if health > 0.0 {
        if spark {
            spawn_explosion(registry, ExplosionSize::Spark, position);
        }
        return false;
    }

    let reward = ledger.award_kill(ship_type);
    registry.emit(SimEvent::ShipDestroyed {
        handle: handle_of(entity),
        ship_type,
        reward,
    });
    spawn_explosion(registry, ExplosionSize::Large, position);
    let _ = registry.despawn(entity);
    true
}

fn resolve_missiles(registry: &mut Registry, ledger: &mut Ledger) {
    let mut missiles: Vec<(Entity, Vec3, f32)> = registry
        .world()
        .query::<(&Missile, &Transform)>()
        .iter()
        .map(|(entity, (missile, transform))| (entity, transform.position, missile.damage))
        .collect();
    missiles.sort_by_key(|(entity, ..)| handle_of(*entity));
    let hulls = live_hulls(registry);

    for (missile, position, damage) in missiles {
        let target = hulls
            .iter()
            .filter(|hull| registry.world().contains(hull.entity))
            .map(|hull| (hull, hull.position.distance(position)))
            .filter(|(hull, distance)| *distance < MISSILE_RADIUS + hull.radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(hull, _)| hull.entity);

        if let Some(ship) = target {
            damage_ship(registry, ledger, ship, damage, true);
            let _ = registry.despawn(missile);
        }
    }
}

fn resolve_beam(registry: &mut Registry, ledger: &mut Ledger, direction: Vec3, damage: f32) {
    for hull in live_hulls(registry) {
        if in_beam_cone(direction, hull.position) {
            damage_ship(registry, ledger, hull.entity, damage, false);
        }
    }
}

fn resolve_projectiles(registry: &mut Registry, ledger: &mut Ledger) {
    let mut projectiles: Vec<(Entity, Vec3, WeaponKind, f32)> = registry
        .world()
        .query::<(&Projectile, &Transform)>()
        .iter()
        .map(|(entity, (projectile, transform))| {
            (entity, transform.position, projectile.weapon, projectile.damage)
        })
        .collect();
    projectiles.sort_by_key(|(entity, ..)| handle_of(*entity));

    for (entity, position, weapon, damage) in projectiles {
        if position.length() >= get_weapon(weapon).defender_hit_radius {
            continue;
        }
        let taken = ledger.damage_defender(damage);
        if taken > 0.0 {
            registry.emit(SimEvent::DefenderHit {
                damage: taken,
                source: DamageSource::Weapon(weapon),
            });
        }
        let size = match weapon {
            WeaponKind::Plasma => ExplosionSize::Large,
            WeaponKind::Standard | WeaponKind::Rapid => ExplosionSize::Small,
        };
        spawn_explosion(registry, size, position);
        let _ = registry.despawn(entity);
    }
}
