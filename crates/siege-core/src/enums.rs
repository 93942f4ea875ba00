//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Hostile ship class. Determines speed, toughness, weapon and reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipType {
    Fighter,
    Bomber,
    Interceptor,
}

impl ShipType {
    pub const ALL: [ShipType; 3] = [ShipType::Fighter, ShipType::Bomber, ShipType::Interceptor];
}

/// Enemy weapon family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Single beam on a medium cooldown (fighters).
    Standard,
    /// Three-shot burst with reduced per-hit damage (interceptors).
    Rapid,
    /// Charged high-damage projectile with a larger hit radius (bombers).
    Plasma,
}

/// Coordinated attack pattern shared by the ships of one formation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormationArchetype {
    VFormation,
    Pincer,
    BomberEscort,
    OrbitStrafe,
}

impl FormationArchetype {
    pub const ALL: [FormationArchetype; 4] = [
        FormationArchetype::VFormation,
        FormationArchetype::Pincer,
        FormationArchetype::BomberEscort,
        FormationArchetype::OrbitStrafe,
    ];
}

/// Position of a ship within its formation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormationRole {
    Leader,
    NearWing,
    FarWing,
    /// Member of one of the two pincer groups (0 or 1).
    PincerGroup(u8),
    Bomber,
    Escort,
    Orbiter,
}

/// Pincer sub-state. Cycles Approach -> Strafe -> Retreat -> Approach.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PincerPhase {
    #[default]
    Approach,
    Strafe,
    Retreat,
}

/// Orbit-strafe sub-state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrbitPhase {
    #[default]
    Approach,
    Orbit,
    /// Spiralling inward at an increased angular rate.
    Strafe,
    /// Spiralling back out to the orbit radius.
    Retreat,
}

/// Kind of a simulated entity, as reported to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EntityKind {
    Ship { ship_type: ShipType },
    Missile,
    Projectile { weapon: WeaponKind },
    Explosion { size: ExplosionSize },
}

/// Visual size class of an explosion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExplosionSize {
    /// Non-lethal hit on a ship.
    Spark,
    /// Projectile impact on the defender.
    Small,
    /// Ship kill, ramming impact or plasma impact.
    Large,
}

/// Which entity pool a spawn request targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pool {
    Ships,
    Missiles,
    Beams,
    Explosions,
    Formations,
}

impl std::fmt::Display for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Pool::Ships => "ships",
            Pool::Missiles => "missiles",
            Pool::Beams => "beams",
            Pool::Explosions => "explosions",
            Pool::Formations => "formations",
        };
        f.write_str(name)
    }
}

/// What damaged the defender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageSource {
    Collision,
    Weapon(WeaponKind),
}

/// Top-level simulation phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    /// Nothing spawns until `Start`.
    #[default]
    Idle,
    Running,
    Paused,
    /// Defender health reached zero.
    Defeated,
}

/// Defender fire doctrine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Doctrine {
    /// Defender only fires on player commands.
    Manual,
    /// Defender picks its own targets (hero-animation mode).
    #[default]
    Auto,
}

/// Render quality hint from the host. Scales effective pool caps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    Low,
    Medium,
    #[default]
    High,
}

/// Missile volley shape for a player fire request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissileSpread {
    #[default]
    Single,
    Cluster,
}
