//! Simulation constants and tuning parameters.
//!
//! Distances are in world units (the defender sits at the origin), times in
//! seconds, speeds in units per second.

/// Nominal seconds per tick (16 ms frame).
pub const DT: f32 = 0.016;

/// Nominal tick duration in microseconds, for the host frame loop.
pub const TICK_MICROS: u64 = 16_000;

// --- Pool capacities ---

/// Hard cap on live ships.
pub const MAX_SHIPS: usize = 40;

/// Hard cap on live defender missiles.
pub const MAX_MISSILES: usize = 64;

/// Hard cap on live enemy beams / plasma projectiles.
pub const MAX_BEAMS: usize = 96;

/// Hard cap on live explosions.
pub const MAX_EXPLOSIONS: usize = 48;

/// Hard cap on concurrently tracked formations.
pub const MAX_FORMATIONS: usize = 8;

/// Ship slots a formation constructor leaves free for solo spawns.
pub const FORMATION_RESERVED_SLOTS: usize = 4;

// --- World geometry ---

/// Radius of the sphere on which ships spawn.
pub const SPAWN_RADIUS: f32 = 60.0;

/// Ships and projectiles beyond this distance from the defender are removed.
pub const DESPAWN_RADIUS: f32 = 95.0;

/// Defender hit radius for ship collisions and standard beams.
pub const DEFENDER_RADIUS: f32 = 6.0;

/// Extra defender hit radius applied to plasma projectiles.
pub const PLASMA_DEFENDER_RADIUS_BONUS: f32 = 2.0;

/// Default defender health.
pub const DEFENDER_MAX_HEALTH: f32 = 100.0;

// --- Spawning ---

/// Seconds between solo ship spawns.
pub const SOLO_SPAWN_INTERVAL_SECS: f32 = 2.0;

/// Seconds between formation spawns.
pub const FORMATION_SPAWN_INTERVAL_SECS: f32 = 12.0;

// --- Ship profiles ---

pub const FIGHTER_SPEED_MIN: f32 = 6.0;
pub const FIGHTER_SPEED_MAX: f32 = 9.0;
pub const FIGHTER_HEALTH: f32 = 2.0;
pub const FIGHTER_RADIUS: f32 = 0.8;

pub const INTERCEPTOR_SPEED_MIN: f32 = 8.0;
pub const INTERCEPTOR_SPEED_MAX: f32 = 12.0;
pub const INTERCEPTOR_HEALTH: f32 = 1.0;
pub const INTERCEPTOR_RADIUS: f32 = 0.6;

pub const BOMBER_SPEED_MIN: f32 = 3.0;
pub const BOMBER_SPEED_MAX: f32 = 4.5;
pub const BOMBER_HEALTH: f32 = 5.0;
pub const BOMBER_RADIUS: f32 = 1.4;

// --- Scoring & damage ledger ---

pub const FIGHTER_REWARD: u32 = 100;
pub const INTERCEPTOR_REWARD: u32 = 200;
pub const BOMBER_REWARD: u32 = 300;

/// Score lost when a ship rams the defender.
pub const COLLISION_SCORE_PENALTY: u32 = 50;

/// Defender health lost when a ship rams the defender.
pub const COLLISION_DAMAGE: f32 = 5.0;

/// Seconds a ship flashes after a non-lethal hit.
pub const HIT_FLASH_SECS: f32 = 0.15;

// --- V-formation ---

pub const V_FORMATION_SPEED: f32 = 4.0;
/// Lateral spacing between adjacent V slots.
pub const V_FORMATION_SPACING: f32 = 2.5;

// --- Pincer ---

pub const PINCER_GROUP_SIZE: usize = 3;
pub const PINCER_SPEED: f32 = 8.0;
/// Lateral spacing between ships within a pincer group.
pub const PINCER_GROUP_SPACING: f32 = 3.0;
/// Distance to the defender at which approach turns into strafe.
pub const PINCER_STRAFE_DISTANCE: f32 = 25.0;
pub const PINCER_STRAFE_SECS: f32 = 2.5;
/// Distance to the defender at which retreat turns back into approach.
pub const PINCER_RETREAT_DISTANCE: f32 = 45.0;

// --- Bomber escort ---

pub const ESCORT_MIN: usize = 2;
pub const ESCORT_MAX: usize = 4;
/// Bomber speed multiplier while escorted.
pub const ESCORTED_BOMBER_SPEED_FACTOR: f32 = 0.8;
pub const ESCORT_ORBIT_RADIUS: f32 = 4.0;
/// Orbit angular rate of escorts around their bomber (rad/s).
pub const ESCORT_ORBIT_RATE: f32 = 1.5;
/// Exponential smoothing rate toward the orbit point (1/s).
pub const ESCORT_SMOOTHING: f32 = 5.0;
/// Speed multiplier applied to escorts released after their bomber dies.
pub const ESCORT_RELEASE_SPEED_BOOST: f32 = 1.5;

// --- Orbit-strafe ---

pub const ORBIT_GROUP_MIN: usize = 3;
pub const ORBIT_GROUP_MAX: usize = 4;
pub const ORBIT_APPROACH_SPEED: f32 = 9.0;
pub const ORBIT_RADIUS: f32 = 30.0;
/// Maximum orbit altitude above or below the defender's equator.
pub const ORBIT_MAX_HEIGHT: f32 = 8.0;
/// Angular rate while orbiting (rad/s).
pub const ORBIT_ANGULAR_RATE: f32 = 0.4;
/// Per-tick probability that an orbiting ship starts a strafe run.
pub const ORBIT_STRAFE_CHANCE: f32 = 0.004;
pub const STRAFE_INNER_RADIUS: f32 = 14.0;
pub const STRAFE_ANGULAR_FACTOR: f32 = 2.0;
/// Radial speed while spiralling in or out (units/s).
pub const STRAFE_RADIAL_SPEED: f32 = 6.0;
pub const ORBIT_SMOOTHING: f32 = 4.0;

// --- Enemy weapons ---

pub const STANDARD_COOLDOWN_SECS: f32 = 2.0;
pub const STANDARD_DAMAGE: f32 = 2.0;
pub const STANDARD_RANGE: f32 = 40.0;
pub const STANDARD_SPEED: f32 = 30.0;

pub const RAPID_COOLDOWN_SECS: f32 = 1.2;
pub const RAPID_DAMAGE: f32 = 1.0;
pub const RAPID_RANGE: f32 = 35.0;
pub const RAPID_SPEED: f32 = 36.0;
pub const RAPID_BURST_COUNT: u32 = 3;
pub const RAPID_BURST_DELAY_SECS: f32 = 0.12;

pub const PLASMA_COOLDOWN_SECS: f32 = 5.0;
pub const PLASMA_DAMAGE: f32 = 8.0;
/// Slightly extended compared to the standard beam.
pub const PLASMA_RANGE: f32 = 48.0;
pub const PLASMA_SPEED: f32 = 18.0;
pub const PLASMA_CHARGE_SECS: f32 = 0.6;

/// Projectile lifetime as a multiple of range / speed.
pub const PROJECTILE_TTL_FACTOR: f32 = 1.2;

/// Cooldown multiplier for ships in an active strafe phase.
pub const STRAFE_COOLDOWN_FACTOR: f32 = 0.6;

/// Cooldown multiplier for bomber escorts.
pub const ESCORT_COOLDOWN_FACTOR: f32 = 0.85;

// --- Defender weapons ---

pub const MISSILE_SPEED: f32 = 40.0;
pub const MISSILE_TTL_SECS: f32 = 3.0;
pub const MISSILE_RADIUS: f32 = 0.5;
pub const MISSILE_DAMAGE: f32 = 1.0;
pub const MISSILE_COOLDOWN_SECS: f32 = 0.25;
pub const CLUSTER_MISSILE_COUNT: usize = 5;
/// Half-angle of the cluster fan (radians).
pub const CLUSTER_SPREAD_RADIANS: f32 = 0.14;

pub const BEAM_RANGE: f32 = 70.0;
/// Cosine of the beam's forward-cone half-angle (~23 degrees).
pub const BEAM_CONE_COS: f32 = 0.92;
/// Continuous beam damage per second.
pub const BEAM_DAMAGE_PER_SEC: f32 = 3.0;
pub const BEAM_DURATION_SECS: f32 = 1.5;
pub const BEAM_COOLDOWN_SECS: f32 = 3.0;

// --- Explosions ---

pub const SPARK_TTL_SECS: f32 = 0.25;
pub const SPARK_SIZE: f32 = 0.6;
pub const SMALL_EXPLOSION_TTL_SECS: f32 = 0.5;
pub const SMALL_EXPLOSION_SIZE: f32 = 1.5;
pub const LARGE_EXPLOSION_TTL_SECS: f32 = 1.0;
pub const LARGE_EXPLOSION_SIZE: f32 = 4.0;
