//! Ship-type and weapon profiles.
//!
//! Consolidates per-type parameters so the FSM, spawner, weapon system and
//! damage resolver agree on one table.

use rand::Rng;

use siege_core::constants::*;
use siege_core::enums::{ShipType, WeaponKind};

/// Behavioral and combat profile for a ship type.
#[derive(Debug, Clone, Copy)]
pub struct ShipProfile {
    pub speed_min: f32,
    pub speed_max: f32,
    pub health: f32,
    /// Collision radius.
    pub radius: f32,
    pub weapon: WeaponKind,
    /// Score awarded for a kill.
    pub reward: u32,
}

/// Parameters for one enemy weapon family.
#[derive(Debug, Clone, Copy)]
pub struct WeaponProfile {
    pub cooldown_secs: f32,
    pub damage: f32,
    pub range: f32,
    pub projectile_speed: f32,
    /// Shots per trigger pull.
    pub burst_count: u32,
    pub burst_delay_secs: f32,
    /// Delay between trigger pull and release.
    pub charge_secs: f32,
    /// Defender hit radius used for this weapon's projectiles.
    pub defender_hit_radius: f32,
}

impl WeaponProfile {
    /// Projectile lifetime: long enough to cover the full range.
    pub fn ttl_secs(&self) -> f32 {
        self.range / self.projectile_speed * PROJECTILE_TTL_FACTOR
    }
}

/// Get the profile for a ship type.
pub fn get_profile(ship_type: ShipType) -> ShipProfile {
    match ship_type {
        ShipType::Fighter => ShipProfile {
            speed_min: FIGHTER_SPEED_MIN,
            speed_max: FIGHTER_SPEED_MAX,
            health: FIGHTER_HEALTH,
            radius: FIGHTER_RADIUS,
            weapon: WeaponKind::Standard,
            reward: FIGHTER_REWARD,
        },
        ShipType::Interceptor => ShipProfile {
            speed_min: INTERCEPTOR_SPEED_MIN,
            speed_max: INTERCEPTOR_SPEED_MAX,
            health: INTERCEPTOR_HEALTH,
            radius: INTERCEPTOR_RADIUS,
            weapon: WeaponKind::Rapid,
            reward: INTERCEPTOR_REWARD,
        },
        ShipType::Bomber => ShipProfile {
            speed_min: BOMBER_SPEED_MIN,
            speed_max: BOMBER_SPEED_MAX,
            health: BOMBER_HEALTH,
            radius: BOMBER_RADIUS,
            weapon: WeaponKind::Plasma,
            reward: BOMBER_REWARD,
        },
    }
}

/// Get the profile for a weapon family.
pub fn get_weapon(weapon: WeaponKind) -> WeaponProfile {
    match weapon {
        WeaponKind::Standard => WeaponProfile {
            cooldown_secs: STANDARD_COOLDOWN_SECS,
            damage: STANDARD_DAMAGE,
            range: STANDARD_RANGE,
            projectile_speed: STANDARD_SPEED,
            burst_count: 1,
            burst_delay_secs: 0.0,
            charge_secs: 0.0,
            defender_hit_radius: DEFENDER_RADIUS,
        },
        WeaponKind::Rapid => WeaponProfile {
            cooldown_secs: RAPID_COOLDOWN_SECS,
            damage: RAPID_DAMAGE,
            range: RAPID_RANGE,
            projectile_speed: RAPID_SPEED,
            burst_count: RAPID_BURST_COUNT,
            burst_delay_secs: RAPID_BURST_DELAY_SECS,
            charge_secs: 0.0,
            defender_hit_radius: DEFENDER_RADIUS,
        },
        WeaponKind::Plasma => WeaponProfile {
            cooldown_secs: PLASMA_COOLDOWN_SECS,
            damage: PLASMA_DAMAGE,
            range: PLASMA_RANGE,
            projectile_speed: PLASMA_SPEED,
            burst_count: 1,
            burst_delay_secs: 0.0,
            charge_secs: PLASMA_CHARGE_SECS,
            defender_hit_radius: DEFENDER_RADIUS + PLASMA_DEFENDER_RADIUS_BONUS,
        },
    }
}

/// Draw a cruise speed from the type's speed range.
pub fn roll_speed<R: Rng + ?Sized>(rng: &mut R, ship_type: ShipType) -> f32 {
    let profile = get_profile(ship_type);
    rng.gen_range(profile.speed_min..=profile.speed_max)
}

/// Uniformly random ship type.
pub fn random_ship_type<R: Rng + ?Sized>(rng: &mut R) -> ShipType {
    ShipType::ALL[rng.gen_range(0..ShipType::ALL.len())]
}
