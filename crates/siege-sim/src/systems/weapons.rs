//! Weapon system: enemy fire, deferred burst/plasma shots, and the
//! defender's missiles and beam.
//!
//! Enemy weapons are chosen by ship type and gated by range and cooldown.
//! Multi-stage shots (rapid bursts, plasma charge) go through the
//! scheduled-action queue instead of wall-clock timers.

use std::f32::consts::TAU;

use glam::Vec3;
use hecs::Entity;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use siege_core::components::{Behavior, Ship};
use siege_core::constants::*;
use siege_core::enums::{Doctrine, MissileSpread, WeaponKind};
use siege_core::error::{Result, SimError};
use siege_core::state::BeamView;
use siege_core::types::{ShipId, SimTime, Transform, Velocity};

use siege_ai::geometry::FormationBasis;
use siege_ai::profiles::{get_profile, get_weapon};

use crate::registry::Registry;
use crate::schedule::{ActionQueue, ScheduledAction};

/// The defender's beam while it is firing. Direction is a unit vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveBeam {
    pub direction: Vec3,
    pub remaining_secs: f32,
}

/// Defender armament state: cooldowns and the active beam.
#[derive(Debug, Clone, Default)]
pub struct Defender {
    last_missile_secs: Option<f64>,
    last_beam_secs: Option<f64>,
    beam: Option<ActiveBeam>,
}

impl Defender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn beam(&self) -> Option<ActiveBeam> {
        self.beam
    }

    pub fn beam_view(&self) -> Option<BeamView> {
        self.beam.map(|beam| BeamView {
            direction: beam.direction,
            range: BEAM_RANGE,
            remaining_secs: beam.remaining_secs,
        })
    }

    pub fn missiles_ready(&self, now_secs: f64) -> bool {
        cooldown_elapsed(self.last_missile_secs, MISSILE_COOLDOWN_SECS, now_secs)
    }

    pub fn beam_ready(&self, now_secs: f64) -> bool {
        self.beam.is_none() && cooldown_elapsed(self.last_beam_secs, BEAM_COOLDOWN_SECS, now_secs)
    }
}

fn cooldown_elapsed(last: Option<f64>, cooldown_secs: f32, now_secs: f64) -> bool {
    last.map_or(true, |last| now_secs - last >= cooldown_secs as f64)
}

/// Cooldown multiplier for a ship's current behavior.
pub fn cooldown_factor(behavior: Option<&Behavior>) -> f32 {
    match behavior {
        Some(b) if b.is_strafing() => STRAFE_COOLDOWN_FACTOR,
        Some(b) if b.is_escort() => ESCORT_COOLDOWN_FACTOR,
        _ => 1.0,
    }
}

/// Launch defender missiles along `direction`. Returns how many left the
/// rails; zero when the launcher is still cooling down.
pub fn fire_missiles(
    registry: &mut Registry,
    defender: &mut Defender,
    rng: &mut ChaCha8Rng,
    direction: Vec3,
    spread: MissileSpread,
    now_secs: f64,
) -> Result<u32> {
    let dir = direction
        .try_normalize()
        .ok_or(SimError::DegenerateDirection)?;
    if !defender.missiles_ready(now_secs) {
        return Ok(0);
    }
    defender.last_missile_secs = Some(now_secs);

    let headings = match spread {
        MissileSpread::Single => vec![dir],
        MissileSpread::Cluster => cluster_headings(dir, rng.gen_range(0.0..TAU)),
    };

    let mut launched = 0;
    for heading in headings {
        match registry.spawn_missile(heading * DEFENDER_RADIUS, heading * MISSILE_SPEED) {
            Ok(_) => launched += 1,
            Err(err) => {
                tracing::debug!(%err, "missile dropped");
                break;
            }
        }
    }
    Ok(launched)
}

/// One missile along `dir`, the rest fanned evenly around it at
/// `CLUSTER_SPREAD_RADIANS`, starting from `phase`.
fn cluster_headings(dir: Vec3, phase: f32) -> Vec<Vec3> {
    let Some(basis) = FormationBasis::toward_origin(-dir) else {
        return vec![dir];
    };
    let ring = CLUSTER_MISSILE_COUNT.saturating_sub(1);
    let (sin_s, cos_s) = CLUSTER_SPREAD_RADIANS.sin_cos();
    let mut headings = Vec::with_capacity(CLUSTER_MISSILE_COUNT);
    headings.push(dir);
    for i in 0..ring {
        let theta = phase + TAU * i as f32 / ring as f32;
        let side = basis.right * theta.cos() + basis.up * theta.sin();
        headings.push((dir * cos_s + side * sin_s).normalize_or_zero());
    }
    headings
}

/// Switch the beam on along `direction`. Returns false on cooldown.
pub fn fire_beam(defender: &mut Defender, direction: Vec3, now_secs: f64) -> Result<bool> {
    let direction = direction
        .try_normalize()
        .ok_or(SimError::DegenerateDirection)?;
    if !defender.beam_ready(now_secs) {
        return Ok(false);
    }
    defender.last_beam_secs = Some(now_secs);
    defender.beam = Some(ActiveBeam {
        direction,
        remaining_secs: BEAM_DURATION_SECS,
    });
    Ok(true)
}

/// Run the weapon stage for one tick.
pub fn run(
    registry: &mut Registry,
    defender: &mut Defender,
    actions: &mut ActionQueue,
    rng: &mut ChaCha8Rng,
    doctrine: Doctrine,
    time: &SimTime,
) {
    release_scheduled(registry, actions, time.tick);
    enemy_fire(registry, actions, time);
    tick_beam(defender, time.dt());
    if doctrine == Doctrine::Auto {
        auto_fire(registry, defender, rng, time.elapsed_secs);
    }
}

/// Fire every deferred shot that is due. Shots whose shooter died since
/// scheduling are discarded.
fn release_scheduled(registry: &mut Registry, actions: &mut ActionQueue, tick: u64) {
    for action in actions.drain_due(tick) {
        let shooter = action.shooter();
        let position = match registry.world().get::<&Transform>(shooter) {
            Ok(transform) => transform.position,
            Err(_) => continue,
        };
        let weapon = match action {
            ScheduledAction::BurstShot { .. } => WeaponKind::Rapid,
            ScheduledAction::PlasmaRelease { .. } => WeaponKind::Plasma,
        };
        launch_projectile(registry, weapon, position);
    }
}

fn enemy_fire(registry: &mut Registry, actions: &mut ActionQueue, time: &SimTime) {
    let now = time.elapsed_secs;
    let mut orders: Vec<(ShipId, Entity, WeaponKind, Vec3)> = Vec::new();

    for (entity, (ship, transform, behavior)) in registry
        .world_mut()
        .query_mut::<(&mut Ship, &Transform, Option<&Behavior>)>()
    {
        let kind = get_profile(ship.ship_type).weapon;
        let weapon = get_weapon(kind);
        if transform.range() > weapon.range {
            continue;
        }
        let cooldown = weapon.cooldown_secs * cooldown_factor(behavior);
        if !cooldown_elapsed(ship.last_fire_secs, cooldown, now) {
            continue;
        }
        // The trigger pull spends the cooldown even if the shot is dropped.
        ship.last_fire_secs = Some(now);
        orders.push((ship.id, entity, kind, transform.position));
    }
    orders.sort_by_key(|(id, ..)| *id);

    for (_, shooter, kind, position) in orders {
        let weapon = get_weapon(kind);
        match kind {
            WeaponKind::Standard => launch_projectile(registry, kind, position),
            WeaponKind::Rapid => {
                launch_projectile(registry, kind, position);
                for shot in 1..weapon.burst_count {
                    let delay = weapon.burst_delay_secs * shot as f32;
                    actions.schedule(
                        time.tick + SimTime::ticks_for(delay),
                        ScheduledAction::BurstShot { shooter },
                    );
                }
            }
            WeaponKind::Plasma => actions.schedule(
                time.tick + SimTime::ticks_for(weapon.charge_secs),
                ScheduledAction::PlasmaRelease { shooter },
            ),
        }
    }
}

/// Spawn one enemy projectile aimed at the defender.
fn launch_projectile(registry: &mut Registry, kind: WeaponKind, position: Vec3) {
    let Some(dir) = (-position).try_normalize() else {
        tracing::debug!(?kind, "shot skipped: shooter at the defender");
        return;
    };
    let weapon = get_weapon(kind);
    if let Err(err) = registry.spawn_projectile(
        kind,
        weapon.damage,
        weapon.ttl_secs(),
        position,
        dir * weapon.projectile_speed,
    ) {
        tracing::debug!(%err, ?kind, "shot dropped");
    }
}

fn tick_beam(defender: &mut Defender, dt: f32) {
    if let Some(beam) = defender.beam.as_mut() {
        beam.remaining_secs -= dt;
        if beam.remaining_secs <= 0.0 {
            defender.beam = None;
        }
    }
}

/// Nearest live ship as (position, velocity), ties broken by ship id.
fn nearest_ship(registry: &Registry) -> Option<(Vec3, Vec3)> {
    registry
        .world()
        .query::<(&Ship, &Transform, &Velocity)>()
        .iter()
        .map(|(_, (ship, transform, velocity))| (transform.range(), ship.id, transform.position, velocity.0))
        .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
        .map(|(_, _, position, velocity)| (position, velocity))
}

/// Doctrine `Auto`: missiles lead the nearest ship; the beam tracks it
/// while it is inside beam range.
fn auto_fire(registry: &mut Registry, defender: &mut Defender, rng: &mut ChaCha8Rng, now_secs: f64) {
    let Some((position, velocity)) = nearest_ship(registry) else {
        return;
    };
    let range = position.length();

    if defender.missiles_ready(now_secs) && range <= MISSILE_SPEED * MISSILE_TTL_SECS {
        let lead = position + velocity * (range / MISSILE_SPEED);
        if let Err(err) =
            fire_missiles(registry, defender, rng, lead, MissileSpread::Single, now_secs)
        {
            tracing::debug!(%err, "auto missile skipped");
        }
    }

    if range <= BEAM_RANGE {
        if let Some(dir) = position.try_normalize() {
            match defender.beam.as_mut() {
                Some(beam) => beam.direction = dir,
                None => {
                    let _ = fire_beam(defender, dir, now_secs);
                }
            }
        }
    }
}
