//! Presentation collaborators: whatever consumes the per-tick snapshot.
//!
//! The simulation never waits on a presenter; the game loop calls
//! `on_snapshot` after each tick and moves on.

use serde::Serialize;

use siege_core::enums::SimPhase;
use siege_core::events::SimEvent;
use siege_core::state::{GameStateSnapshot, LedgerView};

pub trait Presenter {
    fn on_snapshot(&mut self, snapshot: &GameStateSnapshot);

    /// Called once when the loop stops.
    fn on_stop(&mut self) {}
}

/// Fan a snapshot out to two presenters.
impl<A: Presenter, B: Presenter> Presenter for (A, B) {
    fn on_snapshot(&mut self, snapshot: &GameStateSnapshot) {
        self.0.on_snapshot(snapshot);
        self.1.on_snapshot(snapshot);
    }

    fn on_stop(&mut self) {
        self.0.on_stop();
        self.1.on_stop();
    }
}

/// Writes gameplay events and a periodic status line through `tracing`.
#[derive(Debug, Clone)]
pub struct LogPresenter {
    every_ticks: u64,
}

impl LogPresenter {
    pub fn new(every_ticks: u64) -> Self {
        Self {
            every_ticks: every_ticks.max(1),
        }
    }
}

impl Presenter for LogPresenter {
    fn on_snapshot(&mut self, snapshot: &GameStateSnapshot) {
        for event in &snapshot.events {
            match event {
                SimEvent::FormationSpawned {
                    formation,
                    archetype,
                    members,
                } => tracing::info!(formation = formation.0, ?archetype, members, "formation inbound"),
                SimEvent::EscortsReleased { formation, count } => {
                    tracing::info!(formation = formation.0, count, "escorts broke formation")
                }
                SimEvent::ShipDestroyed {
                    ship_type, reward, ..
                } => tracing::debug!(?ship_type, reward, "ship destroyed"),
                SimEvent::DefenderHit { damage, source } => {
                    tracing::debug!(damage, ?source, "defender hit")
                }
                SimEvent::DefenderDown => tracing::warn!(
                    tick = snapshot.time.tick,
                    score = snapshot.ledger.score,
                    "defender down"
                ),
                SimEvent::Spawned { .. } | SimEvent::Removed { .. } => {}
            }
        }

        let tick = snapshot.time.tick;
        if tick > 0 && tick % self.every_ticks == 0 && snapshot.phase == SimPhase::Running {
            tracing::info!(
                tick,
                score = snapshot.ledger.score,
                health = snapshot.ledger.health,
                ships = snapshot.ship_count,
                missiles = snapshot.missile_count,
                projectiles = snapshot.projectile_count,
                "status"
            );
        }
    }

    fn on_stop(&mut self) {
        tracing::info!("presenter stopped");
    }
}

/// Accumulates run statistics; serialised as the host's final report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsPresenter {
    pub snapshots: u64,
    pub final_tick: u64,
    pub final_phase: SimPhase,
    pub ledger: LedgerView,
    pub spawned: u64,
    pub removed: u64,
    pub kills: u64,
    pub formations: u64,
    pub defender_hits: u64,
    pub peak_ships: u32,
    pub peak_missiles: u32,
    pub peak_projectiles: u32,
    pub peak_explosions: u32,
}

impl StatsPresenter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Presenter for StatsPresenter {
    fn on_snapshot(&mut self, snapshot: &GameStateSnapshot) {
        self.snapshots += 1;
        self.final_tick = snapshot.time.tick;
        self.final_phase = snapshot.phase;
        self.ledger = snapshot.ledger;
        self.peak_ships = self.peak_ships.max(snapshot.ship_count);
        self.peak_missiles = self.peak_missiles.max(snapshot.missile_count);
        self.peak_projectiles = self.peak_projectiles.max(snapshot.projectile_count);
        self.peak_explosions = self.peak_explosions.max(snapshot.explosion_count);

        for event in &snapshot.events {
            match event {
                SimEvent::Spawned { .. } => self.spawned += 1,
                SimEvent::Removed { .. } => self.removed += 1,
                SimEvent::ShipDestroyed { .. } => self.kills += 1,
                SimEvent::FormationSpawned { .. } => self.formations += 1,
                SimEvent::DefenderHit { .. } => self.defender_hits += 1,
                SimEvent::EscortsReleased { .. } | SimEvent::DefenderDown => {}
            }
        }
    }
}
