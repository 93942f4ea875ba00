//! Score and defender-health ledger.
//!
//! Stored in `SimulationEngine`, NOT as ECS state. Only the collision
//! resolver mutates it during a tick; everyone else reads `view()`.

use siege_core::constants::*;
use siege_core::enums::ShipType;
use siege_core::state::LedgerView;

use siege_ai::profiles::get_profile;

#[derive(Debug, Clone)]
pub struct Ledger {
    score: u32,
    health: f32,
    max_health: f32,
    kills: u32,
    collisions: u32,
}

impl Ledger {
    pub fn new(max_health: f32) -> Self {
        Self {
            score: 0,
            health: max_health,
            max_health,
            kills: 0,
            collisions: 0,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    pub fn collisions(&self) -> u32 {
        self.collisions
    }

    pub fn is_defeated(&self) -> bool {
        self.health <= 0.0
    }

    /// Credit a destroyed ship. Returns the reward added.
    pub(crate) fn award_kill(&mut self, ship_type: ShipType) -> u32 {
        let reward = get_profile(ship_type).reward;
        self.score = self.score.saturating_add(reward);
        self.kills += 1;
        reward
    }

    /// A ship rammed the defender: score penalty plus hull damage.
    pub(crate) fn record_collision(&mut self) -> f32 {
        self.score = self.score.saturating_sub(COLLISION_SCORE_PENALTY);
        self.collisions += 1;
        self.damage_defender(COLLISION_DAMAGE)
    }

    /// Apply damage to the defender, clamped to the valid range.
    /// Returns the damage actually taken.
    pub(crate) fn damage_defender(&mut self, amount: f32) -> f32 {
        if amount.is_nan() || amount <= 0.0 {
            return 0.0;
        }
        let before = self.health;
        self.health = (self.health - amount).clamp(0.0, self.max_health);
        before - self.health
    }

    pub fn view(&self) -> LedgerView {
        LedgerView {
            score: self.score,
            health: self.health,
            max_health: self.max_health,
        }
    }
}
