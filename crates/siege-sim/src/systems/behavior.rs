//! Ship AI system: runs the behavior FSM for every live ship.
//!
//! Calls the pure FSM from siege-ai, then writes position, velocity,
//! facing and phase back into the world.

use hecs::Entity;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use siege_core::components::{Behavior, FormationMember, Ship};
use siege_core::types::{ShipId, Transform, Velocity};

use siege_ai::fsm::{evaluate, ShipContext, ShipUpdate};

use crate::registry::Registry;

/// Evaluate every ship in ship-id order, so RNG draws are stable.
pub fn run(registry: &mut Registry, rng: &mut ChaCha8Rng, dt: f32) {
    let mut ships: Vec<(ShipId, Entity, ShipContext, Option<FormationMember>)> = registry
        .world()
        .query::<(&Ship, &Transform, &Velocity, Option<&Behavior>, Option<&FormationMember>)>()
        .iter()
        .map(|(entity, (ship, transform, velocity, behavior, member))| {
            let ctx = ShipContext {
                // A ship without a behavior tag falls back to Default.
                behavior: behavior.copied().unwrap_or_default(),
                position: transform.position,
                velocity: velocity.0,
                speed: ship.speed,
                dt,
                escort_anchor: None,
                roll: 0.0,
            };
            (ship.id, entity, ctx, member.copied())
        })
        .collect();
    ships.sort_by_key(|(id, ..)| *id);

    let mut updates: Vec<(Entity, ShipUpdate)> = Vec::with_capacity(ships.len());
    for (_, entity, mut ctx, member) in ships {
        if ctx.behavior.is_escort() {
            ctx.escort_anchor = member.and_then(|m| registry.bomber_position(m.formation));
        }
        ctx.roll = rng.gen::<f32>();
        updates.push((entity, evaluate(&ctx)));
    }

    let world = registry.world_mut();
    for (entity, update) in updates {
        if let Ok((ship, transform, velocity)) =
            world.query_one_mut::<(&mut Ship, &mut Transform, &mut Velocity)>(entity)
        {
            ship.speed = update.speed;
            *transform = Transform::new(update.position, update.facing);
            velocity.0 = update.velocity;
        }
        if update.phase_changed {
            tracing::trace!(entity = entity.id(), behavior = ?update.behavior, "phase change");
        }
        let tagged = world
            .get::<&mut Behavior>(entity)
            .map(|mut behavior| *behavior = update.behavior)
            .is_ok();
        if !tagged {
            let _ = world.insert_one(entity, update.behavior);
        }
    }
}
