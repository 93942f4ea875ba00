//! Ballistics: integrate missiles and enemy projectiles and age them.
//! Expiry is left to cleanup, after collisions have had their chance.

use siege_core::components::{Missile, Projectile};
use siege_core::types::{Transform, Velocity};

use crate::registry::Registry;

pub fn run(registry: &mut Registry, dt: f32) {
    let world = registry.world_mut();

    for (_entity, (transform, velocity, missile)) in
        world.query_mut::<(&mut Transform, &Velocity, &mut Missile)>()
    {
        transform.position += velocity.0 * dt;
        missile.age_secs += dt;
    }

    for (_entity, (transform, velocity, projectile)) in
        world.query_mut::<(&mut Transform, &Velocity, &mut Projectile)>()
    {
        transform.position += velocity.0 * dt;
        projectile.age_secs += dt;
    }
}
