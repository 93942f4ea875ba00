//! Cleanup system: expires missiles, projectiles and explosions, removes
//! anything past the despawn radius, and decays hit flashes.

use hecs::Entity;

use siege_core::components::{Explosion, Missile, Projectile, Ship};
use siege_core::constants::DESPAWN_RADIUS;
use siege_core::types::Transform;

use crate::registry::{handle_of, Registry};

/// Uses a caller-owned buffer to avoid per-tick allocation.
pub fn run(registry: &mut Registry, despawn_buffer: &mut Vec<Entity>, dt: f32) {
    despawn_buffer.clear();
    let radius_sq = DESPAWN_RADIUS * DESPAWN_RADIUS;
    let world = registry.world_mut();

    // Ships: out of bounds, plus hit flash decay.
    for (entity, (transform, ship)) in world.query_mut::<(&Transform, &mut Ship)>() {
        ship.hit_flash_secs = (ship.hit_flash_secs - dt).max(0.0);
        if transform.position.length_squared() > radius_sq {
            despawn_buffer.push(entity);
        }
    }

    for (entity, (transform, missile)) in world.query_mut::<(&Transform, &Missile)>() {
        if missile.age_secs >= missile.max_age_secs
            || transform.position.length_squared() > radius_sq
        {
            despawn_buffer.push(entity);
        }
    }

    for (entity, (transform, projectile)) in world.query_mut::<(&Transform, &Projectile)>() {
        if projectile.age_secs >= projectile.ttl_secs
            || transform.position.length_squared() > radius_sq
        {
            despawn_buffer.push(entity);
        }
    }

    for (entity, explosion) in world.query_mut::<&mut Explosion>() {
        explosion.ttl_secs -= dt;
        if explosion.ttl_secs <= 0.0 {
            despawn_buffer.push(entity);
        }
    }

    // Stable removal order keeps the event stream deterministic.
    despawn_buffer.sort_by_key(|entity| handle_of(*entity));
    for entity in despawn_buffer.drain(..) {
        let _ = registry.despawn(entity);
    }
}
