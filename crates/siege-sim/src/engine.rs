//! Simulation engine: the single owner of all siege state.
//!
//! `SimulationEngine` owns the entity registry, ledger, timers, RNG and
//! defender, processes queued commands at the tick boundary, runs the
//! system pipeline and produces one `GameStateSnapshot` per tick.
//! Headless and deterministic for a given seed and command stream.

use std::collections::VecDeque;

use hecs::Entity;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use siege_core::commands::PlayerCommand;
use siege_core::constants::*;
use siege_core::enums::{Doctrine, Quality, SimPhase};
use siege_core::error::{Result, SimError};
use siege_core::events::SimEvent;
use siege_core::state::GameStateSnapshot;
use siege_core::types::SimTime;

use crate::ledger::Ledger;
use crate::registry::Registry;
use crate::schedule::ActionQueue;
use crate::systems;
use crate::systems::snapshot::SnapshotInput;
use crate::systems::spawner::SpawnTimers;
use crate::systems::weapons::Defender;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    pub doctrine: Doctrine,
    pub quality: Quality,
    pub solo_spawn_interval_secs: f32,
    pub formation_spawn_interval_secs: f32,
    pub defender_max_health: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            doctrine: Doctrine::default(),
            quality: Quality::default(),
            solo_spawn_interval_secs: SOLO_SPAWN_INTERVAL_SECS,
            formation_spawn_interval_secs: FORMATION_SPAWN_INTERVAL_SECS,
            defender_max_health: DEFENDER_MAX_HEALTH,
        }
    }
}

impl SimConfig {
    /// Reject intervals and health values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("solo_spawn_interval_secs", self.solo_spawn_interval_secs),
            ("formation_spawn_interval_secs", self.formation_spawn_interval_secs),
            ("defender_max_health", self.defender_max_health),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    config: SimConfig,
    registry: Registry,
    ledger: Ledger,
    defender: Defender,
    actions: ActionQueue,
    timers: SpawnTimers,
    time: SimTime,
    phase: SimPhase,
    doctrine: Doctrine,
    quality: Quality,
    rng: ChaCha8Rng,
    command_queue: VecDeque<PlayerCommand>,
    despawn_buffer: Vec<Entity>,
}

impl SimulationEngine {
    /// Create a new simulation engine with the given config.
    pub fn new(config: SimConfig) -> Self {
        Self {
            registry: Registry::new(config.quality),
            ledger: Ledger::new(config.defender_max_health),
            defender: Defender::new(),
            actions: ActionQueue::new(),
            timers: SpawnTimers::new(
                config.solo_spawn_interval_secs,
                config.formation_spawn_interval_secs,
            ),
            time: SimTime::default(),
            phase: SimPhase::default(),
            doctrine: config.doctrine,
            quality: config.quality,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            config,
        }
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> GameStateSnapshot {
        self.process_commands();

        match self.phase {
            SimPhase::Running => {
                self.run_systems();
                self.time.advance();
            }
            SimPhase::Defeated => {
                self.run_aftermath();
                self.time.advance();
            }
            SimPhase::Idle | SimPhase::Paused => {}
        }

        let events = self.registry.take_events();
        systems::snapshot::build_snapshot(
            SnapshotInput {
                registry: &self.registry,
                ledger: &self.ledger,
                defender: &self.defender,
                time: self.time,
                phase: self.phase,
                doctrine: self.doctrine,
                quality: self.quality,
            },
            events,
        )
    }

    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn doctrine(&self) -> Doctrine {
        self.doctrine
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Read-only view of the registry and its world.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn defender(&self) -> &Defender {
        &self.defender
    }

    /// Mutable registry access for tests that stage a scene by hand.
    #[cfg(test)]
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Spawn a single ship at `position` with a fixed behavior (for testing).
    #[cfg(test)]
    pub fn spawn_test_ship(
        &mut self,
        ship_type: siege_core::enums::ShipType,
        position: glam::Vec3,
        behavior: siege_core::components::Behavior,
    ) -> Result<Entity> {
        let speed = siege_ai::profiles::get_profile(ship_type).speed_min;
        self.registry.spawn_ship(crate::registry::ShipSpawn {
            ship_type,
            position,
            speed,
            behavior,
            membership: None,
        })
    }

    /// Spawn one formation immediately (for testing).
    #[cfg(test)]
    pub fn spawn_test_formation(
        &mut self,
        archetype: siege_core::enums::FormationArchetype,
    ) -> Option<siege_core::types::FormationId> {
        systems::formations::spawn_formation(
            &mut self.registry,
            &mut self.rng,
            archetype,
            self.time.elapsed_secs,
        )
    }

    #[cfg(test)]
    pub fn pending_actions(&self) -> usize {
        self.actions.len()
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: PlayerCommand) {
        // A downed defender only accepts a reset.
        if self.phase == SimPhase::Defeated && !matches!(command, PlayerCommand::Reset) {
            tracing::debug!(?command, "command ignored: defender is down");
            return;
        }

        match command {
            PlayerCommand::Start => {
                if self.phase == SimPhase::Idle {
                    tracing::info!(seed = self.config.seed, "siege started");
                    self.phase = SimPhase::Running;
                }
            }
            PlayerCommand::Pause => {
                if self.phase == SimPhase::Running {
                    self.phase = SimPhase::Paused;
                }
            }
            PlayerCommand::Resume => {
                if self.phase == SimPhase::Paused {
                    self.phase = SimPhase::Running;
                }
            }
            PlayerCommand::Reset => self.reset(),
            PlayerCommand::FireMissiles { direction, spread } => {
                if self.phase != SimPhase::Running {
                    return;
                }
                match systems::weapons::fire_missiles(
                    &mut self.registry,
                    &mut self.defender,
                    &mut self.rng,
                    direction,
                    spread,
                    self.time.elapsed_secs,
                ) {
                    Ok(0) => tracing::debug!("missile launch on cooldown"),
                    Ok(launched) => tracing::trace!(launched, "missiles launched"),
                    Err(err) => tracing::debug!(%err, "missile launch rejected"),
                }
            }
            PlayerCommand::FireBeam { direction } => {
                if self.phase != SimPhase::Running {
                    return;
                }
                match systems::weapons::fire_beam(
                    &mut self.defender,
                    direction,
                    self.time.elapsed_secs,
                ) {
                    Ok(true) => tracing::trace!("beam on"),
                    Ok(false) => tracing::debug!("beam on cooldown"),
                    Err(err) => tracing::debug!(%err, "beam rejected"),
                }
            }
            PlayerCommand::SetDoctrine { doctrine } => {
                self.doctrine = doctrine;
            }
            PlayerCommand::SetQuality { quality } => {
                if quality != self.quality {
                    tracing::info!(?quality, "quality changed");
                    self.quality = quality;
                    self.registry.set_quality(quality);
                }
            }
        }
    }

    /// Full teardown back to `Idle`. Settings survive; the RNG is reseeded
    /// so a restarted siege replays the same way.
    fn reset(&mut self) {
        tracing::info!(
            tick = self.time.tick,
            score = self.ledger.score(),
            "siege reset"
        );
        self.registry.clear();
        self.ledger = Ledger::new(self.config.defender_max_health);
        self.defender = Defender::new();
        self.actions.clear();
        self.timers.restart();
        self.time = SimTime::default();
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.phase = SimPhase::Idle;
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let dt = self.time.dt();

        // 1. Solo and formation spawns
        systems::spawner::run(
            &mut self.registry,
            &mut self.rng,
            &mut self.timers,
            self.time.elapsed_secs,
            dt,
        );

        // 2. Ship AI
        systems::behavior::run(&mut self.registry, &mut self.rng, dt);

        // 3. Weapons (scheduled shots, enemy fire, defender)
        systems::weapons::run(
            &mut self.registry,
            &mut self.defender,
            &mut self.actions,
            &mut self.rng,
            self.doctrine,
            &self.time,
        );

        // 4. Missile and projectile integration
        systems::ballistics::run(&mut self.registry, dt);

        // 5. Collisions and damage
        systems::collision::run(&mut self.registry, &mut self.ledger, &self.defender, dt);

        // 6. Expiry, bounds, hit flash
        systems::cleanup::run(&mut self.registry, &mut self.despawn_buffer, dt);

        if self.ledger.is_defeated() {
            tracing::info!(
                tick = self.time.tick,
                score = self.ledger.score(),
                "defender down"
            );
            self.phase = SimPhase::Defeated;
            self.defender = Defender::new();
            self.actions.clear();
            self.registry.emit(SimEvent::DefenderDown);
        }

        let counts = self.registry.counts();
        tracing::trace!(
            tick = self.time.tick,
            ships = counts.ships,
            missiles = counts.missiles,
            projectiles = counts.beams,
            explosions = counts.explosions,
            "tick"
        );
    }

    /// After defeat: in-flight shots and explosions play out, nothing new
    /// spawns and ships hold still.
    fn run_aftermath(&mut self) {
        let dt = self.time.dt();
        systems::ballistics::run(&mut self.registry, dt);
        systems::collision::run(&mut self.registry, &mut self.ledger, &self.defender, dt);
        systems::cleanup::run(&mut self.registry, &mut self.despawn_buffer, dt);
    }
}
