//! Spawner: solo ships and formations on independent timers.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use siege_core::components::Behavior;
use siege_core::constants::SPAWN_RADIUS;
use siege_core::enums::FormationArchetype;

use siege_ai::geometry::random_sphere_point;
use siege_ai::profiles::{random_ship_type, roll_speed};

use crate::registry::{Registry, ShipSpawn};
use crate::systems::formations;

/// Repeating spawn timers. Each accumulates tick time and fires once per
/// full interval.
#[derive(Debug, Clone)]
pub struct SpawnTimers {
    pub solo_interval_secs: f32,
    pub formation_interval_secs: f32,
    solo_elapsed_secs: f32,
    formation_elapsed_secs: f32,
}

impl SpawnTimers {
    pub fn new(solo_interval_secs: f32, formation_interval_secs: f32) -> Self {
        Self {
            solo_interval_secs,
            formation_interval_secs,
            solo_elapsed_secs: 0.0,
            formation_elapsed_secs: 0.0,
        }
    }

    pub fn restart(&mut self) {
        self.solo_elapsed_secs = 0.0;
        self.formation_elapsed_secs = 0.0;
    }
}

pub fn run(
    registry: &mut Registry,
    rng: &mut ChaCha8Rng,
    timers: &mut SpawnTimers,
    now_secs: f64,
    dt: f32,
) {
    timers.solo_elapsed_secs += dt;
    if timers.solo_elapsed_secs >= timers.solo_interval_secs {
        timers.solo_elapsed_secs -= timers.solo_interval_secs;
        spawn_solo(registry, rng);
    }

    timers.formation_elapsed_secs += dt;
    if timers.formation_elapsed_secs >= timers.formation_interval_secs {
        timers.formation_elapsed_secs -= timers.formation_interval_secs;
        let archetype = FormationArchetype::ALL[rng.gen_range(0..FormationArchetype::ALL.len())];
        formations::spawn_formation(registry, rng, archetype, now_secs);
    }
}

/// One ship of a random type on the spawn sphere, heading for the defender.
pub fn spawn_solo(registry: &mut Registry, rng: &mut ChaCha8Rng) {
    let ship_type = random_ship_type(rng);
    let spawn = ShipSpawn {
        ship_type,
        position: random_sphere_point(rng, SPAWN_RADIUS),
        speed: roll_speed(rng, ship_type),
        behavior: Behavior::Default,
        membership: None,
    };
    if let Err(err) = registry.spawn_ship(spawn) {
        tracing::debug!(%err, ?ship_type, "solo spawn dropped");
    }
}
